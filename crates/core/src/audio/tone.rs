use std::f32::consts::TAU;

use super::AudioSource;
use crate::{analysis::AnalyserHandle, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveshape {
    Sine,
    Square,
    Silence,
}

/// Periodic test signal that pushes blocks into connected analysers.
#[derive(Debug)]
pub struct ToneSource {
    shape: Waveshape,
    frequency: f32,
    amplitude: f32,
    sample_rate: f32,
    phase: f32,
    block: Vec<f32>,
    outputs: Vec<AnalyserHandle>,
}

impl ToneSource {
    pub fn new(shape: Waveshape, frequency: f32, sample_rate: f32) -> Self {
        Self {
            shape,
            frequency,
            amplitude: 1.0,
            sample_rate,
            phase: 0.0,
            block: Vec::new(),
            outputs: Vec::new(),
        }
    }

    pub fn with_amplitude(mut self, amplitude: f32) -> Self {
        self.amplitude = amplitude;
        self
    }

    pub fn set_frequency(&mut self, frequency: f32) {
        self.frequency = frequency;
    }

    pub fn output_count(&self) -> usize {
        self.outputs.len()
    }

    /// Renders `frames` samples and pushes them to every connected output.
    pub fn pump(&mut self, frames: usize) -> Result<()> {
        let increment = if self.sample_rate > 0.0 {
            self.frequency / self.sample_rate
        } else {
            0.0
        };

        self.block.clear();
        for _ in 0..frames {
            let value = match self.shape {
                Waveshape::Sine => (self.phase * TAU).sin(),
                Waveshape::Square if self.phase < 0.5 => 1.0,
                Waveshape::Square => -1.0,
                Waveshape::Silence => 0.0,
            };
            self.block.push(value * self.amplitude);
            self.phase = (self.phase + increment).fract();
        }

        for output in &self.outputs {
            output.push_samples(&self.block)?;
        }
        Ok(())
    }
}

impl AudioSource<AnalyserHandle> for ToneSource {
    fn connect(&mut self, node: AnalyserHandle) {
        self.outputs.push(node);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalysisConfig;

    #[test]
    fn sine_lands_in_expected_bin() {
        let config = AnalysisConfig::new(1024, 0.0).unwrap();
        let analyser = AnalyserHandle::new(config);
        // Bin width is 48000 / 1024 = 46.875 Hz.
        let mut tone = ToneSource::new(Waveshape::Sine, 46.875 * 20.0, 48_000.0);
        tone.connect(analyser.clone());
        tone.pump(1024).unwrap();

        let mut freq = vec![0u8; analyser.bin_count()];
        analyser.frequency_bytes(&mut freq).unwrap();
        assert!(freq[20] > 200);
        assert!(freq[200] < freq[20]);
    }

    #[test]
    fn feeds_every_output() {
        let config = AnalysisConfig::new(32, 0.0).unwrap();
        let left = AnalyserHandle::new(config);
        let right = AnalyserHandle::new(config);
        let mut tone = ToneSource::new(Waveshape::Square, 100.0, 1_000.0);
        tone.connect(left.clone());
        tone.connect(right.clone());
        tone.pump(32).unwrap();

        let mut a = vec![0u8; 16];
        let mut b = vec![0u8; 16];
        left.time_domain_bytes(&mut a).unwrap();
        right.time_domain_bytes(&mut b).unwrap();
        assert_eq!(a, b);
        assert_eq!(a[0], 255);
    }
}
