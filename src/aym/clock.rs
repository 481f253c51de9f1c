//! Clock bridge between chip ticks and output samples
//!
//! The chip advances in ticks of `clock / 8`; the host wants samples at
//! `sound_freq`. Both are derived from absolute positions since the last
//! frequency change, so rounding never accumulates.

use std::time::Duration;

/// Chip input clock cycles per generator tick
pub const CLOCK_DIVISOR: u64 = 8;

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Absolute time since power-on, in nanoseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Stamp(u64);

impl Stamp {
    /// Power-on
    pub const ZERO: Stamp = Stamp(0);

    /// From nanoseconds
    pub const fn from_nanos(nanos: u64) -> Self {
        Stamp(nanos)
    }

    /// From microseconds
    pub const fn from_micros(micros: u64) -> Self {
        Stamp(micros * 1_000)
    }

    /// From milliseconds
    pub const fn from_millis(millis: u64) -> Self {
        Stamp(millis * 1_000_000)
    }

    /// Nanoseconds since power-on
    pub const fn nanos(self) -> u64 {
        self.0
    }
}

impl From<Duration> for Stamp {
    fn from(duration: Duration) -> Self {
        Stamp(u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX))
    }
}

impl std::ops::Add<Duration> for Stamp {
    type Output = Stamp;

    fn add(self, rhs: Duration) -> Stamp {
        Stamp(self.0.saturating_add(Stamp::from(rhs).0))
    }
}

/// Chip tick and sample oscillators on one time axis
#[derive(Debug, Clone)]
pub struct ClockSource {
    /// Generator ticks per second
    psg_freq: u64,
    /// Samples per second
    sound_freq: u64,
    /// Tick and time of the last frequency change
    origin_tick: u64,
    origin_time: u64,
    current_tick: u64,
    /// Samples emitted since the last frequency change
    samples: u64,
    next_sample_tick: u64,
}

impl ClockSource {
    /// Create a clock bridge for the given chip clock and sample rate
    ///
    /// # Panics
    ///
    /// Panics if either frequency is zero or the clock is below 8 Hz.
    pub fn new(clock_freq: u64, sound_freq: u32) -> Self {
        let mut clock = Self {
            psg_freq: 0,
            sound_freq: 0,
            origin_tick: 0,
            origin_time: 0,
            current_tick: 0,
            samples: 0,
            next_sample_tick: 0,
        };
        clock.set_frequency(clock_freq, sound_freq);
        clock
    }

    /// Back to power-on, keeping the frequencies
    pub fn reset(&mut self) {
        self.origin_tick = 0;
        self.origin_time = 0;
        self.current_tick = 0;
        self.samples = 0;
        self.update_next_sample();
    }

    /// Change frequencies, rebasing at the current position
    ///
    /// Returns `true` if anything changed.
    ///
    /// # Panics
    ///
    /// Panics if either frequency is zero or the clock is below 8 Hz.
    pub fn set_frequency(&mut self, clock_freq: u64, sound_freq: u32) -> bool {
        let psg_freq = clock_freq / CLOCK_DIVISOR;
        assert!(psg_freq != 0, "chip clock {} Hz is too low", clock_freq);
        assert!(sound_freq != 0, "sound frequency must be nonzero");
        let sound_freq = u64::from(sound_freq);
        if psg_freq == self.psg_freq && sound_freq == self.sound_freq {
            return false;
        }
        if self.psg_freq != 0 {
            self.origin_time = self.current_time().nanos();
        }
        self.origin_tick = self.current_tick;
        self.samples = 0;
        self.psg_freq = psg_freq;
        self.sound_freq = sound_freq;
        self.update_next_sample();
        true
    }

    /// Generator ticks per second
    pub fn psg_freq(&self) -> u64 {
        self.psg_freq
    }

    /// Ticks rendered since power-on
    #[inline]
    pub fn current_tick(&self) -> u64 {
        self.current_tick
    }

    /// Time of the current tick
    pub fn current_time(&self) -> Stamp {
        let ticks = u128::from(self.current_tick - self.origin_tick);
        let nanos = ticks * NANOS_PER_SEC / u128::from(self.psg_freq);
        Stamp(self.origin_time.saturating_add(u64::try_from(nanos).unwrap_or(u64::MAX)))
    }

    /// Tick reached at `stamp` (stamps before the last rebase map to it)
    pub fn tick_at(&self, stamp: Stamp) -> u64 {
        let elapsed = u128::from(stamp.nanos().saturating_sub(self.origin_time));
        let ticks = elapsed * u128::from(self.psg_freq) / NANOS_PER_SEC;
        self.origin_tick
            .saturating_add(u64::try_from(ticks).unwrap_or(u64::MAX))
    }

    /// Ticks left until `stamp`
    #[inline]
    pub fn ticks_to(&self, stamp: Stamp) -> u64 {
        self.tick_at(stamp).saturating_sub(self.current_tick)
    }

    /// Ticks left until the next sample is due
    #[inline]
    pub fn ticks_to_sample(&self) -> u64 {
        self.next_sample_tick.saturating_sub(self.current_tick)
    }

    /// Move the tick cursor forward
    #[inline]
    pub fn advance(&mut self, ticks: u64) {
        self.current_tick += ticks;
    }

    /// Account for one emitted sample
    #[inline]
    pub fn next_sample(&mut self) {
        self.samples += 1;
        self.update_next_sample();
    }

    /// Upper estimate of samples due before `stamp`
    pub fn samples_till(&self, stamp: Stamp) -> usize {
        let ticks = u128::from(self.ticks_to(stamp));
        let samples = ticks * u128::from(self.sound_freq) / u128::from(self.psg_freq) + 1;
        usize::try_from(samples).unwrap_or(usize::MAX)
    }

    fn update_next_sample(&mut self) {
        let scaled = u128::from(self.samples + 1) * u128::from(self.psg_freq);
        let sound = u128::from(self.sound_freq);
        let offset = (scaled + sound - 1) / sound;
        self.next_sample_tick = self
            .origin_tick
            .saturating_add(u64::try_from(offset).unwrap_or(u64::MAX));
    }
}
