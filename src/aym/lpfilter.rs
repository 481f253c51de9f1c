//! Second order low-pass filter used by the HQ renderer
//!
//! Butterworth response via the bilinear transform, run at the chip tick
//! rate on both stereo channels.

use crate::sound::{Sample, SampleType};
use std::f64::consts::{PI, SQRT_2};

#[derive(Debug, Clone, Copy, Default)]
struct Coefficients {
    b0: f32,
    b1: f32,
    b2: f32,
    a1: f32,
    a2: f32,
}

#[derive(Debug, Clone, Copy, Default)]
struct History {
    x1: f32,
    x2: f32,
    y1: f32,
    y2: f32,
}

impl History {
    #[inline]
    fn feed(&mut self, c: &Coefficients, x: f32) -> f32 {
        let y = c.b0 * x + c.b1 * self.x1 + c.b2 * self.x2 - c.a1 * self.y1 - c.a2 * self.y2;
        self.x2 = self.x1;
        self.x1 = x;
        self.y2 = self.y1;
        self.y1 = y;
        y
    }
}

/// Stereo biquad low-pass
#[derive(Debug, Clone, Default)]
pub struct LowPassFilter {
    coefficients: Coefficients,
    left: History,
    right: History,
}

impl LowPassFilter {
    /// Create a pass-through filter; call [`LowPassFilter::set_parameters`]
    pub fn new() -> Self {
        Self {
            coefficients: Coefficients {
                b0: 1.0,
                ..Coefficients::default()
            },
            left: History::default(),
            right: History::default(),
        }
    }

    /// Configure for input rate `rate` and cutoff `cutoff` (both Hz)
    ///
    /// The cutoff is clamped below Nyquist.
    pub fn set_parameters(&mut self, rate: u64, cutoff: u64) {
        let rate = rate.max(1) as f64;
        let cutoff = (cutoff as f64).clamp(1.0, rate * 0.49);
        let k = (PI * cutoff / rate).tan();
        let norm = 1.0 / (1.0 + SQRT_2 * k + k * k);
        let b0 = k * k * norm;
        self.coefficients = Coefficients {
            b0: b0 as f32,
            b1: (2.0 * b0) as f32,
            b2: b0 as f32,
            a1: (2.0 * (k * k - 1.0) * norm) as f32,
            a2: ((1.0 - SQRT_2 * k + k * k) * norm) as f32,
        };
    }

    /// Push one input sample
    #[inline]
    pub fn feed(&mut self, input: Sample) {
        self.left.feed(&self.coefficients, f32::from(input.left));
        self.right.feed(&self.coefficients, f32::from(input.right));
    }

    /// Latest output
    #[inline]
    pub fn output(&self) -> Sample {
        Sample::new(to_sample(self.left.y1), to_sample(self.right.y1))
    }

    /// Clear the filter history
    pub fn reset(&mut self) {
        self.left = History::default();
        self.right = History::default();
    }
}

#[inline]
fn to_sample(value: f32) -> SampleType {
    if !value.is_finite() {
        return 0;
    }
    value
        .round()
        .clamp(f32::from(SampleType::MIN), f32::from(SampleType::MAX)) as SampleType
}
