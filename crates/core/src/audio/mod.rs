use crate::{analysis::AnalyserHandle, Result};

mod snapshot;
mod tone;

pub use snapshot::SnapshotNode;
pub use tone::{ToneSource, Waveshape};

/// Stage that exposes byte snapshots of the audio flowing through it.
pub trait AnalysisNode: Clone + Send + 'static {
    /// Length of both snapshots.
    fn bin_count(&self) -> usize;
    fn read_time_domain(&self, out: &mut [u8]) -> Result<()>;
    fn read_frequency(&self, out: &mut [u8]) -> Result<()>;
    /// Detaches the node from everything downstream. Idempotent.
    fn disconnect(&self) -> Result<()>;
}

impl AnalysisNode for AnalyserHandle {
    fn bin_count(&self) -> usize {
        AnalyserHandle::bin_count(self)
    }

    fn read_time_domain(&self, out: &mut [u8]) -> Result<()> {
        self.time_domain_bytes(out)
    }

    fn read_frequency(&self, out: &mut [u8]) -> Result<()> {
        self.frequency_bytes(out)
    }

    fn disconnect(&self) -> Result<()> {
        AnalyserHandle::disconnect(self)
    }
}

/// Producer of audio that can feed an analysis node.
pub trait AudioSource<N> {
    /// Starts feeding `node`. Existing connections stay in place.
    fn connect(&mut self, node: N);
}

/// Fixed-size byte buffers refreshed from an [`AnalysisNode`].
///
/// Both buffers are allocated once with the node's bin count and
/// overwritten in place on every read.
#[derive(Debug)]
pub struct SampleBuffers<N> {
    node: N,
    time_domain: Vec<u8>,
    frequency: Vec<u8>,
}

impl<N: AnalysisNode> SampleBuffers<N> {
    pub fn new(node: N) -> Self {
        let len = node.bin_count();
        Self {
            node,
            time_domain: vec![128; len],
            frequency: vec![0; len],
        }
    }

    pub fn node(&self) -> &N {
        &self.node
    }

    pub fn len(&self) -> usize {
        self.time_domain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time_domain.is_empty()
    }

    /// Attaches `source` upstream of the node and returns the node so the
    /// caller can chain it further.
    pub fn connect<Src>(&self, source: &mut Src) -> N
    where
        Src: AudioSource<N> + ?Sized,
    {
        source.connect(self.node.clone());
        self.node.clone()
    }

    pub fn disconnect(&self) -> Result<()> {
        self.node.disconnect()
    }

    pub fn time_domain_samples(&mut self) -> Result<&[u8]> {
        self.node.read_time_domain(&mut self.time_domain)?;
        Ok(&self.time_domain)
    }

    pub fn frequency_samples(&mut self) -> Result<&[u8]> {
        self.node.read_frequency(&mut self.frequency)?;
        Ok(&self.frequency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalysisConfig;

    #[test]
    fn buffers_match_bin_count_and_start_silent() {
        let node = AnalyserHandle::new(AnalysisConfig::new(64, 0.8).unwrap());
        let mut buffers = SampleBuffers::new(node);

        assert_eq!(buffers.len(), 32);
        assert!(buffers.time_domain_samples().unwrap().iter().all(|&v| v == 128));
        assert!(buffers.frequency_samples().unwrap().iter().all(|&v| v == 0));
    }

    #[test]
    fn reads_do_not_reallocate() {
        let node = AnalyserHandle::new(AnalysisConfig::new(128, 0.0).unwrap());
        let mut buffers = SampleBuffers::new(node);

        let first = buffers.frequency_samples().unwrap().as_ptr();
        let second = buffers.frequency_samples().unwrap().as_ptr();
        assert_eq!(first, second);
        let first = buffers.time_domain_samples().unwrap().as_ptr();
        let second = buffers.time_domain_samples().unwrap().as_ptr();
        assert_eq!(first, second);
        assert_eq!(buffers.len(), 64);
    }

    #[test]
    fn connect_feeds_node_and_returns_it() {
        let node = AnalyserHandle::new(AnalysisConfig::new(64, 0.0).unwrap());
        let mut buffers = SampleBuffers::new(node);
        let mut first = ToneSource::new(Waveshape::Square, 1_000.0, 48_000.0).with_amplitude(0.5);
        let mut second = ToneSource::new(Waveshape::Silence, 1_000.0, 48_000.0);

        let returned = buffers.connect(&mut first);
        buffers.connect(&mut second);
        assert_eq!(returned.bin_count(), 32);
        assert_eq!(first.output_count(), 1);
        assert_eq!(second.output_count(), 1);

        first.pump(64).unwrap();
        let time = buffers.time_domain_samples().unwrap();
        assert!(time.iter().any(|&v| v != 128));
    }

    #[test]
    fn disconnect_is_idempotent() {
        let node = AnalyserHandle::new(AnalysisConfig::new(32, 0.0).unwrap());
        node.connect_sink(Box::new(|_: &[f32]| {})).unwrap();
        let buffers = SampleBuffers::new(node.clone());

        buffers.disconnect().unwrap();
        buffers.disconnect().unwrap();
        assert_eq!(node.downstream_count().unwrap(), 0);
    }
}
