use std::{
    f32::consts::PI,
    fmt,
    sync::{Arc, Mutex, MutexGuard},
};

use realfft::{num_complex::Complex32, RealFftPlanner, RealToComplex};

use crate::{config::AnalysisConfig, Result, VisualizerError};

const BLACKMAN_ALPHA: f32 = 0.16;
const SILENCE_BYTE: u8 = 128;

/// Receives the samples an [`Analyser`] passes through.
pub trait AudioSink: Send {
    fn write(&mut self, samples: &[f32]);
}

impl<F> AudioSink for F
where
    F: FnMut(&[f32]) + Send,
{
    fn write(&mut self, samples: &[f32]) {
        self(samples)
    }
}

/// Analysis stage that turns a stream of samples into byte-scaled
/// time-domain and frequency-domain snapshots.
///
/// Incoming samples are kept in a ring of `fft_size` values. Snapshots are
/// computed on demand from the most recent window, so reading them never
/// allocates.
pub struct Analyser {
    config: AnalysisConfig,
    history: Vec<f32>,
    write_pos: usize,
    window: Vec<f32>,
    smoothed: Vec<f32>,
    fft: FftResources,
    downstream: Vec<Box<dyn AudioSink>>,
}

impl Analyser {
    pub fn new(config: AnalysisConfig) -> Self {
        let size = config.fft_size();
        let mut planner = RealFftPlanner::<f32>::new();
        let plan = planner.plan_fft_forward(size);
        let fft = FftResources {
            scratch: plan.make_scratch_vec(),
            spectrum: plan.make_output_vec(),
            input: plan.make_input_vec(),
            plan,
        };

        Self {
            history: vec![0.0; size],
            write_pos: 0,
            window: (0..size).map(|index| blackman_value(index, size)).collect(),
            smoothed: vec![0.0; config.buffer_len()],
            fft,
            downstream: Vec::new(),
            config,
        }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Number of frequency bins, also the length of both snapshots.
    pub fn bin_count(&self) -> usize {
        self.config.buffer_len()
    }

    /// Appends samples to the analysis window and forwards them downstream.
    pub fn push_samples(&mut self, samples: &[f32]) {
        let size = self.history.len();
        for &sample in samples {
            self.history[self.write_pos] = sample;
            self.write_pos = (self.write_pos + 1) % size;
        }

        for sink in &mut self.downstream {
            sink.write(samples);
        }
    }

    pub fn connect_sink(&mut self, sink: Box<dyn AudioSink>) {
        self.downstream.push(sink);
    }

    pub fn downstream_count(&self) -> usize {
        self.downstream.len()
    }

    /// Detaches every downstream sink. Calling it again is a no-op.
    pub fn disconnect(&mut self) {
        self.downstream.clear();
    }

    /// Writes the oldest `out.len()` samples of the current window as bytes
    /// centred on 128.
    pub fn time_domain_bytes(&self, out: &mut [u8]) {
        let size = self.history.len();
        for (offset, slot) in out.iter_mut().take(size).enumerate() {
            let sample = self.history[(self.write_pos + offset) % size];
            *slot = time_domain_byte(sample);
        }
    }

    /// Computes the smoothed magnitude spectrum and writes it as bytes
    /// scaled between the configured decibel bounds.
    pub fn frequency_bytes(&mut self, out: &mut [u8]) -> Result<()> {
        let size = self.history.len();
        for index in 0..size {
            let sample = self.history[(self.write_pos + index) % size];
            self.fft.input[index] = sample * self.window[index];
        }

        self.fft.plan.process_with_scratch(
            &mut self.fft.input,
            &mut self.fft.spectrum,
            &mut self.fft.scratch,
        )?;

        let smoothing = self.config.smoothing();
        let scale = 1.0 / size as f32;
        for (previous, bin) in self.smoothed.iter_mut().zip(&self.fft.spectrum) {
            let magnitude = bin.norm() * scale;
            let next = smoothing * *previous + (1.0 - smoothing) * magnitude;
            *previous = if next.is_finite() { next } else { 0.0 };
        }

        let min_db = self.config.min_decibels();
        let range = self.config.max_decibels() - min_db;
        for (slot, magnitude) in out.iter_mut().zip(&self.smoothed) {
            *slot = frequency_byte(*magnitude, min_db, range);
        }

        Ok(())
    }
}

impl fmt::Debug for Analyser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Analyser")
            .field("config", &self.config)
            .field("write_pos", &self.write_pos)
            .field("downstream", &self.downstream.len())
            .finish()
    }
}

struct FftResources {
    plan: Arc<dyn RealToComplex<f32>>,
    scratch: Vec<Complex32>,
    spectrum: Vec<Complex32>,
    input: Vec<f32>,
}

/// Shared, thread-safe handle over an [`Analyser`].
#[derive(Clone)]
pub struct AnalyserHandle {
    shared: Arc<Mutex<Analyser>>,
    bin_count: usize,
}

impl AnalyserHandle {
    pub fn new(config: AnalysisConfig) -> Self {
        let bin_count = config.buffer_len();
        Self {
            shared: Arc::new(Mutex::new(Analyser::new(config))),
            bin_count,
        }
    }

    pub fn bin_count(&self) -> usize {
        self.bin_count
    }

    pub fn push_samples(&self, samples: &[f32]) -> Result<()> {
        self.lock()?.push_samples(samples);
        Ok(())
    }

    pub fn connect_sink(&self, sink: Box<dyn AudioSink>) -> Result<()> {
        self.lock()?.connect_sink(sink);
        Ok(())
    }

    pub fn downstream_count(&self) -> Result<usize> {
        Ok(self.lock()?.downstream_count())
    }

    pub fn disconnect(&self) -> Result<()> {
        self.lock()?.disconnect();
        Ok(())
    }

    pub fn time_domain_bytes(&self, out: &mut [u8]) -> Result<()> {
        self.lock()?.time_domain_bytes(out);
        Ok(())
    }

    pub fn frequency_bytes(&self, out: &mut [u8]) -> Result<()> {
        self.lock()?.frequency_bytes(out)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Analyser>> {
        self.shared
            .lock()
            .map_err(|_| VisualizerError::Poisoned("analyser"))
    }
}

impl fmt::Debug for AnalyserHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalyserHandle")
            .field("bin_count", &self.bin_count)
            .finish()
    }
}

fn time_domain_byte(sample: f32) -> u8 {
    let scaled = (f32::from(SILENCE_BYTE) * (1.0 + sample)).floor();
    if scaled.is_nan() {
        SILENCE_BYTE
    } else {
        scaled.clamp(0.0, 255.0) as u8
    }
}

fn frequency_byte(magnitude: f32, min_db: f32, range: f32) -> u8 {
    let db = 20.0 * magnitude.log10();
    let scaled = (255.0 / range * (db - min_db)).floor();
    if scaled.is_finite() {
        scaled.clamp(0.0, 255.0) as u8
    } else {
        0
    }
}

fn blackman_value(index: usize, len: usize) -> f32 {
    let a0 = 0.5 * (1.0 - BLACKMAN_ALPHA);
    let a1 = 0.5;
    let a2 = 0.5 * BLACKMAN_ALPHA;
    let x = index as f32 / len as f32;

    a0 - a1 * (2.0 * PI * x).cos() + a2 * (4.0 * PI * x).cos()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyser(fft_size: usize) -> Analyser {
        Analyser::new(AnalysisConfig::new(fft_size, 0.0).unwrap())
    }

    #[test]
    fn bin_count_is_half_the_transform() {
        for size in [32, 64, 512, 2048, 32768] {
            assert_eq!(analyser(size).bin_count(), size / 2);
        }
    }

    #[test]
    fn silence_reads_as_midpoint_and_zero_magnitude() {
        let mut engine = analyser(64);
        let mut time = vec![0u8; engine.bin_count()];
        let mut freq = vec![7u8; engine.bin_count()];

        engine.time_domain_bytes(&mut time);
        engine.frequency_bytes(&mut freq).unwrap();

        assert!(time.iter().all(|&value| value == 128));
        assert!(freq.iter().all(|&value| value == 0));
    }

    #[test]
    fn time_domain_maps_full_scale() {
        assert_eq!(time_domain_byte(0.0), 128);
        assert_eq!(time_domain_byte(-1.0), 0);
        assert_eq!(time_domain_byte(1.0), 255);
        assert_eq!(time_domain_byte(4.0), 255);
        assert_eq!(time_domain_byte(f32::NAN), 128);
    }

    #[test]
    fn time_domain_reads_oldest_half_of_window() {
        let mut engine = analyser(32);
        let ramp: Vec<f32> = (0..32).map(|i| i as f32 / 32.0).collect();
        engine.push_samples(&ramp);

        let mut time = vec![0u8; 16];
        engine.time_domain_bytes(&mut time);
        assert_eq!(time[0], 128);
        assert_eq!(time[15], time_domain_byte(15.0 / 32.0));
    }

    #[test]
    fn tone_peaks_at_its_bin() {
        let size = 1024;
        let mut engine = analyser(size);
        let bin = 64;
        let tone: Vec<f32> = (0..size)
            .map(|i| (2.0 * PI * bin as f32 * i as f32 / size as f32).sin())
            .collect();
        engine.push_samples(&tone);

        let mut freq = vec![0u8; engine.bin_count()];
        engine.frequency_bytes(&mut freq).unwrap();

        let (peak, _) = freq
            .iter()
            .enumerate()
            .max_by_key(|(_, value)| **value)
            .unwrap();
        assert!((peak as isize - bin as isize).abs() <= 1);
        assert!(freq[bin] > 200);
        assert!(freq[bin * 4] < freq[bin]);
    }

    #[test]
    fn smoothing_decays_towards_silence() {
        let size = 256;
        let mut engine = Analyser::new(AnalysisConfig::new(size, 0.8).unwrap());
        let tone: Vec<f32> = (0..size)
            .map(|i| 0.01 * (2.0 * PI * 8.0 * i as f32 / size as f32).sin())
            .collect();
        engine.push_samples(&tone);

        let mut freq = vec![0u8; engine.bin_count()];
        engine.frequency_bytes(&mut freq).unwrap();
        let loud = freq[8];

        engine.push_samples(&vec![0.0; size]);
        engine.frequency_bytes(&mut freq).unwrap();
        let fading = freq[8];

        assert!(loud > 0);
        assert!(fading > 0, "smoothing keeps part of the previous magnitude");
        assert!(fading < loud);
    }

    #[test]
    fn forwards_samples_and_disconnects_downstream() {
        let mut engine = analyser(32);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink_seen = seen.clone();
        engine.connect_sink(Box::new(move |samples: &[f32]| {
            sink_seen.lock().unwrap().extend_from_slice(samples);
        }));

        engine.push_samples(&[0.25, -0.25]);
        assert_eq!(*seen.lock().unwrap(), vec![0.25, -0.25]);

        engine.disconnect();
        engine.disconnect();
        assert_eq!(engine.downstream_count(), 0);

        engine.push_samples(&[0.5]);
        assert_eq!(seen.lock().unwrap().len(), 2);
    }
}
