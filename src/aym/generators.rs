//! Sound generators for the AY/YM PSG
//!
//! This module contains the individual generator components:
//! - Tone generators (3 channels)
//! - Noise generator (shared, table driven LFSR)
//! - Envelope generator
//!
//! All three count elapsed ticks instead of flipping state once per
//! period, so a single `tick(n)` call can cover any number of ticks.

use super::tables::{
    shape_in, ENV_PERIODIC, ENV_REVERSE, ENV_STOP_HIGH, ENV_STOP_LOW, ENV_WRAP,
};
use crate::config::{MAX_DUTY_CYCLE, NO_DUTY_CYCLE};
use std::sync::OnceLock;

/// Number of tone channels
pub const NUM_CHANNELS: usize = 3;

/// Output level of a silent generator
pub const LOW_LEVEL: u32 = 0;
/// Output level of a sounding generator (all bits set, used as an AND mask)
pub const HIGH_LEVEL: u32 = !LOW_LEVEL;

/// Highest envelope level
pub const MAX_ENVELOPE_LEVEL: u32 = 31;

/// Envelope steps after which every repeating shape is back where it started
const ENVELOPE_CYCLE: u64 = 2 * (MAX_ENVELOPE_LEVEL as u64 + 1);

/// Entries in the noise table (one full run of the 17-bit LFSR)
pub const NOISE_TABLE_SIZE: usize = 1 << 17;
const NOISE_TABLE_MASK: u32 = NOISE_TABLE_SIZE as u32 - 1;

static NOISE_TABLE: OnceLock<Box<[u32]>> = OnceLock::new();

/// Precomputed noise output, shared by every generator in the process
pub fn noise_table() -> &'static [u32] {
    NOISE_TABLE.get_or_init(|| {
        log::debug!("Building {} entry noise table", NOISE_TABLE_SIZE);
        let mut seed: u32 = 0xFFFF;
        (0..NOISE_TABLE_SIZE)
            .map(|_| {
                let high = seed & 0x10000 != 0;
                let feedback = ((seed >> 16) ^ (seed >> 13)) & 1;
                seed = ((seed << 1) | feedback) & 0x1FFFF;
                if high {
                    HIGH_LEVEL
                } else {
                    LOW_LEVEL
                }
            })
            .collect()
    })
}

/// Tick counter over one doubled period, split by the duty cycle
///
/// Positions `[0, middle)` are the low half, `[middle, double_period)` the
/// high half.
#[derive(Clone, Debug)]
struct PeriodCounter {
    counter: u32,
    double_period: u32,
    middle_period: u32,
    duty_cycle: u32,
}

impl PeriodCounter {
    fn new() -> Self {
        let mut counter = Self {
            counter: 0,
            double_period: 2,
            middle_period: 1,
            duty_cycle: NO_DUTY_CYCLE,
        };
        counter.update_middle();
        counter
    }

    /// Effective (half) period
    #[inline]
    fn period(&self) -> u32 {
        self.double_period / 2
    }

    /// Reprogram, keeping the relative position inside the period
    fn set_period(&mut self, period: u32) {
        let double_period = period.max(1).saturating_mul(2);
        if double_period == self.double_period {
            return;
        }
        let remapped = u64::from(self.counter) * u64::from(double_period)
            / u64::from(self.double_period);
        self.counter = remapped as u32;
        self.double_period = double_period;
        self.update_middle();
    }

    fn set_duty_cycle(&mut self, duty_cycle: u32) {
        self.duty_cycle = duty_cycle.clamp(1, MAX_DUTY_CYCLE - 1);
        self.update_middle();
    }

    fn update_middle(&mut self) {
        let high_part = u64::from(self.double_period) * u64::from(self.duty_cycle)
            / u64::from(MAX_DUTY_CYCLE);
        let middle = u64::from(self.double_period) - high_part;
        self.middle_period = (middle as u32).clamp(1, self.double_period - 1);
    }

    #[inline]
    fn reset_counter(&mut self) {
        self.counter = 0;
    }

    #[inline]
    fn is_high(&self) -> bool {
        self.counter >= self.middle_period
    }

    /// Advance by `ticks`, returning the number of half-period edges crossed
    #[inline]
    fn tick(&mut self, ticks: u32) -> u64 {
        let before = u64::from(self.is_high());
        let total = u64::from(self.counter) + u64::from(ticks);
        let full = self.wrap(total);
        let after = u64::from(self.is_high());
        (2 * full + after).saturating_sub(before)
    }

    /// Store `total` modulo the double period, returning the whole periods removed
    #[inline]
    fn wrap(&mut self, total: u64) -> u64 {
        let double_period = u64::from(self.double_period);
        if self.double_period.is_power_of_two() {
            self.counter = (total & (double_period - 1)) as u32;
            total >> self.double_period.trailing_zeros()
        } else {
            let mut rest = total;
            let mut full = 0;
            while rest >= double_period {
                rest -= double_period;
                full += 1;
            }
            self.counter = rest as u32;
            full
        }
    }
}

/// Tone generator for a single channel
///
/// Square wave with a period of `2 * max(1, period)` ticks.
#[derive(Clone, Debug)]
pub struct ToneGenerator {
    counter: PeriodCounter,
    /// Disabled in the mixer
    masked: bool,
}

impl ToneGenerator {
    /// Create a new tone generator
    pub fn new() -> Self {
        Self {
            counter: PeriodCounter::new(),
            masked: true,
        }
    }

    /// Set the period from register values (0 behaves as 1)
    #[inline]
    pub fn set_period(&mut self, period: u32) {
        self.counter.set_period(period);
    }

    /// Effective period in ticks
    #[inline]
    pub fn period(&self) -> u32 {
        self.counter.period()
    }

    /// Percentage of the period spent high
    #[inline]
    pub fn set_duty_cycle(&mut self, duty_cycle: u32) {
        self.counter.set_duty_cycle(duty_cycle);
    }

    /// Enable or disable the output (a masked tone is always high)
    #[inline]
    pub fn set_masked(&mut self, masked: bool) {
        self.masked = masked;
    }

    /// Advance by `ticks`
    #[inline]
    pub fn tick(&mut self, ticks: u32) {
        self.counter.tick(ticks);
    }

    /// Current output as an AND mask
    #[inline]
    pub fn level(&self) -> u32 {
        if self.masked || self.counter.is_high() {
            HIGH_LEVEL
        } else {
            LOW_LEVEL
        }
    }

    /// Reset to initial state
    pub fn reset(&mut self) {
        self.counter.reset_counter();
        self.counter.set_period(1);
        self.masked = true;
    }
}

impl Default for ToneGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Noise generator
///
/// Walks the shared [`noise_table`], one entry per half period.
#[derive(Clone, Debug)]
pub struct NoiseGenerator {
    counter: PeriodCounter,
    index: u32,
    masked: bool,
    table: &'static [u32],
}

impl NoiseGenerator {
    /// Create a new noise generator
    pub fn new() -> Self {
        Self {
            counter: PeriodCounter::new(),
            index: 0,
            masked: true,
            table: noise_table(),
        }
    }

    /// Ticks per LFSR step (0 behaves as 1)
    #[inline]
    pub fn set_period(&mut self, period: u32) {
        self.counter.set_period(period);
    }

    /// Effective ticks per LFSR step
    #[inline]
    pub fn period(&self) -> u32 {
        self.counter.period()
    }

    /// Uneven split of each step pair
    #[inline]
    pub fn set_duty_cycle(&mut self, duty_cycle: u32) {
        self.counter.set_duty_cycle(duty_cycle);
    }

    /// Disable the output (a masked generator is always high)
    #[inline]
    pub fn set_masked(&mut self, masked: bool) {
        self.masked = masked;
    }

    /// Advance by `ticks`
    #[inline]
    pub fn tick(&mut self, ticks: u32) {
        let steps = self.counter.tick(ticks) % NOISE_TABLE_SIZE as u64;
        self.index = (self.index + steps as u32) & NOISE_TABLE_MASK;
    }

    /// Current output as an AND mask
    #[inline]
    pub fn level(&self) -> u32 {
        if self.masked {
            HIGH_LEVEL
        } else {
            self.table[self.index as usize]
        }
    }

    /// Reset to initial state
    pub fn reset(&mut self) {
        self.counter.reset_counter();
        self.counter.set_period(1);
        self.index = 0;
        self.masked = true;
    }
}

impl Default for NoiseGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Envelope generator with the 16 hardware shapes
///
/// A 5-bit level moves by `decay` (+1, -1 or 0 once finished) every period.
#[derive(Clone, Debug)]
pub struct EnvelopeGenerator {
    counter: PeriodCounter,
    shape: u8,
    level: i32,
    decay: i32,
}

impl EnvelopeGenerator {
    /// Create a new envelope generator
    pub fn new() -> Self {
        Self {
            counter: PeriodCounter::new(),
            shape: 0,
            level: 0,
            decay: 0,
        }
    }

    /// Set the period from R11/R12 (0 behaves as 1)
    #[inline]
    pub fn set_period(&mut self, period: u32) {
        self.counter.set_period(period);
    }

    /// Effective ticks per level step
    #[inline]
    pub fn period(&self) -> u32 {
        self.counter.period()
    }

    /// Uneven split of each step pair
    #[inline]
    pub fn set_duty_cycle(&mut self, duty_cycle: u32) {
        self.counter.set_duty_cycle(duty_cycle);
    }

    /// Restart with a new shape (R13 write)
    ///
    /// Bit 2 (attack) selects a rising start from 0, otherwise the level
    /// falls from 31.
    pub fn set_shape(&mut self, shape: u8) {
        self.counter.reset_counter();
        self.shape = shape & 0x0F;
        if self.shape & 0x04 != 0 {
            self.level = 0;
            self.decay = 1;
        } else {
            self.level = MAX_ENVELOPE_LEVEL as i32;
            self.decay = -1;
        }
    }

    /// Current shape
    #[inline]
    pub fn shape(&self) -> u8 {
        self.shape
    }

    /// Advance by `ticks`
    #[inline]
    pub fn tick(&mut self, ticks: u32) {
        let mut steps = self.counter.tick(ticks);
        if shape_in(ENV_PERIODIC, self.shape) {
            // triangles repeat every 64 steps, sawtooths every 32
            steps %= ENVELOPE_CYCLE;
        }
        for _ in 0..steps {
            if self.decay == 0 {
                break;
            }
            self.step();
        }
    }

    fn step(&mut self) {
        self.level += self.decay;
        if (0..=MAX_ENVELOPE_LEVEL as i32).contains(&self.level) {
            return;
        }
        if shape_in(ENV_STOP_LOW, self.shape) {
            self.level = 0;
            self.decay = 0;
        } else if shape_in(ENV_WRAP, self.shape) {
            self.level &= MAX_ENVELOPE_LEVEL as i32;
        } else if shape_in(ENV_REVERSE, self.shape) {
            self.decay = -self.decay;
            self.level += self.decay;
        } else {
            debug_assert!(shape_in(ENV_STOP_HIGH, self.shape));
            self.level = MAX_ENVELOPE_LEVEL as i32;
            self.decay = 0;
        }
    }

    /// Current level (0-31)
    #[inline]
    pub fn level(&self) -> u32 {
        self.level as u32
    }

    /// Reset to initial state
    pub fn reset(&mut self) {
        self.counter.reset_counter();
        self.counter.set_period(1);
        self.shape = 0;
        self.level = 0;
        self.decay = 0;
    }
}

impl Default for EnvelopeGenerator {
    fn default() -> Self {
        Self::new()
    }
}
