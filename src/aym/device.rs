//! PSG device: generators plus per-channel level mixing

use super::generators::{
    EnvelopeGenerator, NoiseGenerator, ToneGenerator, HIGH_LEVEL, LOW_LEVEL, NUM_CHANNELS,
};
use super::registers::{MixerFlags, ENVELOPE_ENABLE, VOLUME_MASK};
use crate::config::{DutyCycleMask, NO_DUTY_CYCLE};

/// Bits per channel in a packed level index
pub const LEVEL_BITS: u32 = 5;
/// Mask of one channel in a packed level index
pub const LEVEL_MASK: u32 = (1 << LEVEL_BITS) - 1;

/// Raw 5-bit DAC index for a 4-bit fixed volume
#[inline]
pub fn fixed_level(volume: u8) -> u32 {
    (u32::from(volume & VOLUME_MASK) << 1) | 1
}

/// Three tone generators, noise and envelope mixed into raw channel levels
#[derive(Clone, Debug)]
pub struct PsgDevice {
    tones: [ToneGenerator; NUM_CHANNELS],
    noise: NoiseGenerator,
    envelope: EnvelopeGenerator,
    /// Fixed level per channel, `LOW_LEVEL` when the envelope drives it
    levels: [u32; NUM_CHANNELS],
    /// `HIGH_LEVEL` for channels taking the envelope
    envelope_masks: [u32; NUM_CHANNELS],
    /// `HIGH_LEVEL` for channels with noise disabled
    noise_masks: [u32; NUM_CHANNELS],
}

impl PsgDevice {
    /// Create a device in power-on state
    pub fn new() -> Self {
        let mut device = Self {
            tones: [ToneGenerator::new(), ToneGenerator::new(), ToneGenerator::new()],
            noise: NoiseGenerator::new(),
            envelope: EnvelopeGenerator::new(),
            levels: [LOW_LEVEL; NUM_CHANNELS],
            envelope_masks: [LOW_LEVEL; NUM_CHANNELS],
            noise_masks: [HIGH_LEVEL; NUM_CHANNELS],
        };
        device.reset();
        device
    }

    /// Apply the duty cycle to the generators selected by `mask`
    pub fn set_duty_cycle(&mut self, value: u32, mask: DutyCycleMask) {
        let pick = |flag: DutyCycleMask| {
            if mask.contains(flag) {
                value
            } else {
                NO_DUTY_CYCLE
            }
        };
        self.tones[0].set_duty_cycle(pick(DutyCycleMask::A));
        self.tones[1].set_duty_cycle(pick(DutyCycleMask::B));
        self.tones[2].set_duty_cycle(pick(DutyCycleMask::C));
        self.noise.set_duty_cycle(pick(DutyCycleMask::N));
        self.envelope.set_duty_cycle(pick(DutyCycleMask::E));
    }

    /// Decode R7 into per-channel masks
    pub fn set_mixer(&mut self, mixer: MixerFlags) {
        for (channel, tone) in self.tones.iter_mut().enumerate() {
            tone.set_masked(!mixer.is_tone_enabled(channel));
            self.noise_masks[channel] = if mixer.is_noise_enabled(channel) {
                LOW_LEVEL
            } else {
                HIGH_LEVEL
            };
        }
        self.noise.set_masked(mixer.is_noise_unused());
    }

    /// Set a channel's tone period
    #[inline]
    pub fn set_tone_period(&mut self, channel: usize, period: u32) {
        self.tones[channel].set_period(period);
    }

    /// Set the noise period in ticks
    #[inline]
    pub fn set_noise_period(&mut self, period: u32) {
        self.noise.set_period(period);
    }

    /// Set the envelope period
    #[inline]
    pub fn set_envelope_period(&mut self, period: u32) {
        self.envelope.set_period(period);
    }

    /// Restart the envelope with a new shape
    #[inline]
    pub fn set_envelope_shape(&mut self, shape: u8) {
        self.envelope.set_shape(shape);
    }

    /// Decode a volume register (fixed level or envelope select)
    pub fn set_volume(&mut self, channel: usize, volume: u8) {
        if volume & ENVELOPE_ENABLE != 0 {
            self.levels[channel] = LOW_LEVEL;
            self.envelope_masks[channel] = HIGH_LEVEL;
        } else {
            self.levels[channel] = fixed_level(volume);
            self.envelope_masks[channel] = LOW_LEVEL;
        }
    }

    /// Advance every generator by `ticks`
    #[inline]
    pub fn tick(&mut self, ticks: u32) {
        for tone in &mut self.tones {
            tone.tick(ticks);
        }
        self.noise.tick(ticks);
        self.envelope.tick(ticks);
    }

    /// Raw channel levels packed 5 bits each (A lowest)
    #[inline]
    pub fn levels(&self) -> u32 {
        let envelope = self.envelope.level();
        let noise = self.noise.level();
        let mut packed = 0;
        for channel in 0..NUM_CHANNELS {
            let level = ((self.envelope_masks[channel] & envelope) | self.levels[channel])
                & self.tones[channel].level()
                & (noise | self.noise_masks[channel]);
            packed |= (level & LEVEL_MASK) << (LEVEL_BITS * channel as u32);
        }
        packed
    }

    /// Current envelope shape
    pub fn envelope_shape(&self) -> u8 {
        self.envelope.shape()
    }

    /// Power-on state: every source disabled, all levels zero
    pub fn reset(&mut self) {
        for tone in &mut self.tones {
            tone.reset();
        }
        self.noise.reset();
        self.envelope.reset();
        self.levels = [LOW_LEVEL; NUM_CHANNELS];
        self.envelope_masks = [LOW_LEVEL; NUM_CHANNELS];
        self.set_mixer(MixerFlags::all());
    }
}

impl Default for PsgDevice {
    fn default() -> Self {
        Self::new()
    }
}

/// Level of `channel` in a packed index
#[inline]
pub fn channel_level(packed: u32, channel: usize) -> u32 {
    (packed >> (LEVEL_BITS * channel as u32)) & LEVEL_MASK
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_power_on_is_silent() {
        let device = PsgDevice::new();
        assert_eq!(device.levels(), 0);
    }

    #[test]
    fn test_fixed_level_with_everything_masked() {
        let mut device = PsgDevice::new();
        for volume in 0..16u8 {
            device.set_volume(1, volume);
            device.tick(7);
            assert_eq!(channel_level(device.levels(), 1), u32::from(volume) * 2 + 1);
        }
    }

    #[test]
    fn test_fixed_level_ignores_upper_bits() {
        assert_eq!(fixed_level(0xEF), 31);
        assert_eq!(fixed_level(0x00), 1);
    }

    #[test]
    fn test_tone_gates_level() {
        let mut device = PsgDevice::new();
        device.set_mixer(MixerFlags::from_register(0x3E)); // tone A only
        device.set_tone_period(0, 2);
        device.set_volume(0, 0x0F);
        assert_eq!(channel_level(device.levels(), 0), 0);
        device.tick(2);
        assert_eq!(channel_level(device.levels(), 0), 31);
        device.tick(2);
        assert_eq!(channel_level(device.levels(), 0), 0);
    }

    #[test]
    fn test_envelope_drives_channel() {
        let mut device = PsgDevice::new();
        device.set_volume(2, ENVELOPE_ENABLE);
        device.set_envelope_period(1);
        device.set_envelope_shape(0x0D);
        assert_eq!(channel_level(device.levels(), 2), 0);
        device.tick(5);
        assert_eq!(channel_level(device.levels(), 2), 5);
        assert_eq!(channel_level(device.levels(), 0), 0);
    }

    #[test]
    fn test_noise_only_for_enabled_channel() {
        let mut device = PsgDevice::new();
        device.set_mixer(MixerFlags::from_register(0x37)); // noise A only
        device.set_noise_period(1);
        device.set_volume(0, 0x0F);
        device.set_volume(1, 0x0F);
        // table starts low, so channel A is gated while B stays at its fixed level
        assert_eq!(channel_level(device.levels(), 0), 0);
        assert_eq!(channel_level(device.levels(), 1), 31);
        device.tick(1);
        assert_eq!(channel_level(device.levels(), 0), 31);
    }

    fn high_ticks(device: &mut PsgDevice, channel: usize, ticks: u32) -> u32 {
        let mut high = 0;
        for _ in 0..ticks {
            device.tick(1);
            if channel_level(device.levels(), channel) > 0 {
                high += 1;
            }
        }
        high
    }

    #[test]
    fn test_duty_cycle_mask_selects_tones() {
        let mut device = PsgDevice::new();
        device.set_mixer(MixerFlags::from_register(0x38)); // all tones, no noise
        for channel in 0..NUM_CHANNELS {
            device.set_tone_period(channel, 4);
            device.set_volume(channel, 0x0F);
        }
        device.set_duty_cycle(25, DutyCycleMask::A | DutyCycleMask::N);

        let mut a = device.clone();
        let mut b = device.clone();
        let mut c = device;
        assert_eq!(high_ticks(&mut a, 0, 8), 2);
        assert_eq!(high_ticks(&mut b, 1, 8), 4);
        assert_eq!(high_ticks(&mut c, 2, 8), 4);
    }

    #[test]
    fn test_duty_cycle_mask_selects_noise() {
        // noise table reads 0, then 17 ones, then zeros
        let first_rise_and_fall = |mask: DutyCycleMask| {
            let mut device = PsgDevice::new();
            device.set_mixer(MixerFlags::from_register(0x37)); // noise A only
            device.set_noise_period(4);
            device.set_volume(0, 0x0F);
            device.set_duty_cycle(25, mask);
            let mut rise = None;
            for tick in 1..=100u32 {
                device.tick(1);
                let high = channel_level(device.levels(), 0) > 0;
                match (rise, high) {
                    (None, true) => rise = Some(tick),
                    (Some(rise), false) => return (rise, tick),
                    _ => {}
                }
            }
            panic!("noise never fell back");
        };

        // uneven edges inside each period, same number of steps per period
        assert_eq!(first_rise_and_fall(DutyCycleMask::N), (6, 72));
        assert_eq!(first_rise_and_fall(DutyCycleMask::A), (4, 72));
        assert_eq!(first_rise_and_fall(DutyCycleMask::empty()), (4, 72));
    }

    #[test]
    fn test_reset_restores_power_on() {
        let mut device = PsgDevice::new();
        device.set_mixer(MixerFlags::empty());
        device.set_volume(0, 0x0F);
        device.reset();
        assert_eq!(device.levels(), 0);
    }
}
