//! Three channel to stereo mixing
//!
//! The mixer is only consulted while the volume table is being rebuilt, so
//! it can afford plain integer arithmetic per call.

use super::{Sample, SampleType};

/// Maps three channel amplitudes to one stereo sample
pub trait ThreeChannelsMixer {
    /// Mix `[left input, center input, right input]`
    fn apply_data(&self, input: [SampleType; 3]) -> Sample;
}

/// Left/right gains in percent for inputs A, B and C
pub const DEFAULT_MATRIX: [[u32; 2]; 3] = [[100, 10], [66, 66], [10, 100]];

/// Gain matrix mixer
///
/// Output is normalized by the larger of the left and right column sums,
/// so three full-scale inputs never exceed the sample range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatrixMixer {
    matrix: [[u32; 2]; 3],
    divisor: i64,
}

impl MatrixMixer {
    /// Create a mixer from per-input `[left, right]` gains
    pub fn new(matrix: [[u32; 2]; 3]) -> Self {
        let left: u32 = matrix.iter().map(|gains| gains[0]).sum();
        let right: u32 = matrix.iter().map(|gains| gains[1]).sum();
        Self {
            matrix,
            divisor: i64::from(left.max(right).max(1)),
        }
    }

    /// Equal gains everywhere
    pub fn mono() -> Self {
        Self::new([[100, 100]; 3])
    }

    /// Gain matrix
    pub fn matrix(&self) -> [[u32; 2]; 3] {
        self.matrix
    }
}

impl Default for MatrixMixer {
    fn default() -> Self {
        Self::new(DEFAULT_MATRIX)
    }
}

impl ThreeChannelsMixer for MatrixMixer {
    fn apply_data(&self, input: [SampleType; 3]) -> Sample {
        let mut left = 0i64;
        let mut right = 0i64;
        for (value, gains) in input.iter().zip(self.matrix.iter()) {
            left += i64::from(*value) * i64::from(gains[0]);
            right += i64::from(*value) * i64::from(gains[1]);
        }
        Sample::new(clamp(left / self.divisor), clamp(right / self.divisor))
    }
}

#[inline]
fn clamp(value: i64) -> SampleType {
    value.clamp(i64::from(SampleType::MIN), i64::from(SampleType::MAX)) as SampleType
}
