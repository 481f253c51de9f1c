//! Channel state snapshots for visualization
//!
//! Maps generator periods to note bands so a UI can draw a spectrum-like
//! view without touching the render path.

use super::tables::{FREQ_MULTIPLIER, FREQ_TABLE};

/// Snapshot of one sounding source
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelState {
    /// 'A', 'B', 'C', 'N' (noise) or 'E' (envelope)
    pub name: char,
    /// Note index (0 = C1, 107 = B9)
    pub band: usize,
    /// Normalized level (0.0-1.0)
    pub level: f32,
}

impl ChannelState {
    /// Create a silent state
    pub fn new(name: char, band: usize) -> Self {
        Self {
            name,
            band,
            level: 0.0,
        }
    }
}

/// Period to note band conversion for a given chip clock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisMap {
    clock_freq: u64,
}

impl AnalysisMap {
    /// Create a map for `clock_freq` (chip input clock in Hz)
    pub fn new(clock_freq: u64) -> Self {
        Self { clock_freq }
    }

    /// Change the clock, returning `true` if it differs
    pub fn set_clock_rate(&mut self, clock_freq: u64) -> bool {
        let changed = self.clock_freq != clock_freq;
        self.clock_freq = clock_freq;
        changed
    }

    /// Band of a square wave with the given tone period
    ///
    /// Picks the first note at or above the frequency, clamped to the top band.
    pub fn band_by_period(&self, period: u32) -> usize {
        let divisor = 16 * u64::from(period.max(1));
        let freq = self.clock_freq * FREQ_MULTIPLIER / divisor;
        let band = FREQ_TABLE.partition_point(|note| u64::from(*note) < freq);
        band.min(FREQ_TABLE.len() - 1)
    }
}
