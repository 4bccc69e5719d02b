use std::sync::{Arc, Mutex, MutexGuard};

use super::AnalysisNode;
use crate::{Result, VisualizerError};

#[derive(Debug, Default)]
struct Snapshot {
    time_domain: Vec<u8>,
    frequency: Vec<u8>,
    disconnects: usize,
}

/// Analysis node that replays byte snapshots supplied by the host, for
/// precomputed analysis data.
///
/// Snapshots shorter than the bin count leave the remaining bytes at their
/// silent values.
#[derive(Debug, Clone)]
pub struct SnapshotNode {
    bin_count: usize,
    shared: Arc<Mutex<Snapshot>>,
}

impl SnapshotNode {
    pub fn new(bin_count: usize) -> Self {
        Self {
            bin_count,
            shared: Arc::new(Mutex::new(Snapshot {
                time_domain: vec![128; bin_count],
                frequency: vec![0; bin_count],
                disconnects: 0,
            })),
        }
    }

    pub fn set_time_domain(&self, samples: &[u8]) -> Result<()> {
        let mut snapshot = self.lock()?;
        snapshot.time_domain.fill(128);
        copy_prefix(&mut snapshot.time_domain, samples);
        Ok(())
    }

    pub fn set_frequency(&self, samples: &[u8]) -> Result<()> {
        let mut snapshot = self.lock()?;
        snapshot.frequency.fill(0);
        copy_prefix(&mut snapshot.frequency, samples);
        Ok(())
    }

    /// Number of times `disconnect` has been called on any clone.
    pub fn disconnect_count(&self) -> Result<usize> {
        Ok(self.lock()?.disconnects)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Snapshot>> {
        self.shared
            .lock()
            .map_err(|_| VisualizerError::Poisoned("snapshot node"))
    }
}

impl AnalysisNode for SnapshotNode {
    fn bin_count(&self) -> usize {
        self.bin_count
    }

    fn read_time_domain(&self, out: &mut [u8]) -> Result<()> {
        copy_prefix(out, &self.lock()?.time_domain);
        Ok(())
    }

    fn read_frequency(&self, out: &mut [u8]) -> Result<()> {
        copy_prefix(out, &self.lock()?.frequency);
        Ok(())
    }

    fn disconnect(&self) -> Result<()> {
        self.lock()?.disconnects += 1;
        Ok(())
    }
}

fn copy_prefix(out: &mut [u8], source: &[u8]) {
    let len = out.len().min(source.len());
    out[..len].copy_from_slice(&source[..len]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::SampleBuffers;

    #[test]
    fn replays_and_pads_snapshots() {
        let node = SnapshotNode::new(4);
        node.set_frequency(&[9, 8]).unwrap();
        node.set_time_domain(&[1, 2, 3, 4, 5, 6]).unwrap();

        let mut buffers = SampleBuffers::new(node);
        assert_eq!(buffers.frequency_samples().unwrap(), &[9, 8, 0, 0]);
        assert_eq!(buffers.time_domain_samples().unwrap(), &[1, 2, 3, 4]);
    }
}
