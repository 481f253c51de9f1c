//! Output samples and sinks
//!
//! A [`Sample`] is a signed 16-bit stereo pair. Finished samples are pushed
//! in batches ([`Chunk`]) to a [`SampleSink`].

mod mixer;
#[cfg(feature = "export-wav")]
mod wav;

pub use mixer::{MatrixMixer, ThreeChannelsMixer, DEFAULT_MATRIX};
#[cfg(feature = "export-wav")]
pub use wav::WavSink;

use parking_lot::Mutex;
use std::sync::Arc;

/// Signed amplitude of one output channel
pub type SampleType = i16;

/// Silence
pub const SAMPLE_MID: SampleType = 0;
/// Largest amplitude
pub const SAMPLE_MAX: SampleType = SampleType::MAX;

/// Stereo output sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Sample {
    /// Left channel
    pub left: SampleType,
    /// Right channel
    pub right: SampleType,
}

impl Sample {
    /// Create a sample from both channels
    #[inline]
    pub const fn new(left: SampleType, right: SampleType) -> Self {
        Self { left, right }
    }

    /// Same value on both channels
    #[inline]
    pub const fn mono(value: SampleType) -> Self {
        Self::new(value, value)
    }

    /// Channel-wise saturating addition
    #[inline]
    pub fn saturating_add(self, other: Sample) -> Sample {
        Sample::new(
            self.left.saturating_add(other.left),
            self.right.saturating_add(other.right),
        )
    }

    /// Half amplitude on both channels
    #[inline]
    pub fn halved(self) -> Sample {
        Sample::new(self.left >> 1, self.right >> 1)
    }
}

/// Batch of samples handed to a sink in one call
pub type Chunk = Vec<Sample>;

/// Receiver of rendered audio
///
/// The chip calls `apply_data` at most once per flush with every sample
/// rendered since the previous flush, then calls `flush`.
pub trait SampleSink {
    /// Accept a batch of samples
    fn apply_data(&mut self, chunk: Chunk);

    /// End of a flush cycle
    fn flush(&mut self) {}
}

impl SampleSink for Vec<Sample> {
    fn apply_data(&mut self, mut chunk: Chunk) {
        self.append(&mut chunk);
    }
}

impl<S: SampleSink> SampleSink for Arc<Mutex<S>> {
    fn apply_data(&mut self, chunk: Chunk) {
        self.lock().apply_data(chunk);
    }

    fn flush(&mut self) {
        self.lock().flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_saturating_add_clamps() {
        let a = Sample::new(30_000, -30_000);
        let b = Sample::new(10_000, -10_000);
        assert_eq!(a.saturating_add(b), Sample::new(SAMPLE_MAX, SampleType::MIN));
    }

    #[test]
    fn test_halved() {
        assert_eq!(Sample::new(32_767, 100).halved(), Sample::new(16_383, 50));
        assert_eq!(Sample::mono(SAMPLE_MID).halved(), Sample::default());
    }

    #[test]
    fn test_shared_sink_forwards() {
        let shared = Arc::new(Mutex::new(Vec::<Sample>::new()));
        let mut handle = Arc::clone(&shared);
        handle.apply_data(vec![Sample::mono(1), Sample::mono(2)]);
        handle.flush();
        assert_eq!(shared.lock().len(), 2);
    }
}
