//! Register bank of a single PSG
//!
//! Holds the latched register values and reprograms the device only for
//! registers that were actually written, so untouched generators keep their
//! phase.

use super::analysis::{AnalysisMap, ChannelState};
use super::backend::PsgBackend;
use super::device::{fixed_level, PsgDevice, LEVEL_BITS};
use super::generators::NUM_CHANNELS;
use super::registers::{
    MixerFlags, Register, RegisterMask, Registers, ENVELOPE_ENABLE, REGISTER_COUNT, VOLUME_MASK,
};
use super::tables::{shape_in, ENV_PERIODIC};
use super::volume_table::VolumeTable;
use crate::config::DutyCycleMask;
use crate::sound::Sample;

const TONE_LO: [Register; NUM_CHANNELS] = [Register::ToneALo, Register::ToneBLo, Register::ToneCLo];
const TONE_HI: [Register; NUM_CHANNELS] = [Register::ToneAHi, Register::ToneBHi, Register::ToneCHi];
const TONE_MASKS: [RegisterMask; NUM_CHANNELS] =
    [RegisterMask::TONE_A, RegisterMask::TONE_B, RegisterMask::TONE_C];
const VOLUMES: [Register; NUM_CHANNELS] = [Register::VolumeA, Register::VolumeB, Register::VolumeC];

/// One AY/YM chip: register bank plus device
#[derive(Clone, Debug)]
pub struct Psg {
    registers: [u8; REGISTER_COUNT],
    device: PsgDevice,
    /// Raw level forced onto all channels by the beeper register
    beeper: Option<u32>,
}

impl Psg {
    /// Create a chip in power-on state
    pub fn new() -> Self {
        let mut psg = Self {
            registers: [0; REGISTER_COUNT],
            device: PsgDevice::new(),
            beeper: None,
        };
        psg.reset();
        psg
    }

    /// Latched value of a register
    #[inline]
    pub fn register(&self, reg: Register) -> u8 {
        self.registers[reg.index()]
    }

    /// Tone period of `channel` (12 bits)
    pub fn tone_period(&self, channel: usize) -> u32 {
        u32::from(self.register(TONE_LO[channel])) | u32::from(self.register(TONE_HI[channel])) << 8
    }

    /// Noise period in ticks (twice R6)
    pub fn noise_period(&self) -> u32 {
        2 * u32::from(self.register(Register::Noise))
    }

    /// Envelope period (R11/R12)
    pub fn envelope_period(&self) -> u32 {
        u32::from(self.register(Register::EnvelopeLo))
            | u32::from(self.register(Register::EnvelopeHi)) << 8
    }

    /// Mixer control (R7)
    pub fn mixer(&self) -> MixerFlags {
        MixerFlags::from_register(self.register(Register::Mixer))
    }

    /// Raw channel levels packed 5 bits each
    #[inline]
    pub fn levels(&self) -> u32 {
        match self.beeper {
            Some(level) => level | level << LEVEL_BITS | level << (2 * LEVEL_BITS),
            None => self.device.levels(),
        }
    }
}

impl Default for Psg {
    fn default() -> Self {
        Self::new()
    }
}

impl PsgBackend for Psg {
    type Data = Registers;

    fn set_new_data(&mut self, data: &Registers) {
        let changed = data.mask();
        if changed.is_empty() {
            return;
        }
        for (reg, value) in data.iter() {
            self.registers[reg.index()] = value & reg.width_mask();
        }

        if changed.contains(RegisterMask::MIXER) {
            self.device.set_mixer(self.mixer());
        }
        for channel in 0..NUM_CHANNELS {
            if changed.intersects(TONE_MASKS[channel]) {
                self.device.set_tone_period(channel, self.tone_period(channel));
            }
        }
        if changed.contains(RegisterMask::NOISE) {
            self.device.set_noise_period(self.noise_period());
        }
        if changed.intersects(RegisterMask::ENVELOPE_PERIOD) {
            self.device.set_envelope_period(self.envelope_period());
        }
        if changed.contains(RegisterMask::ENVELOPE_SHAPE) {
            self.device
                .set_envelope_shape(self.register(Register::EnvelopeShape));
        }
        for (channel, reg) in VOLUMES.iter().enumerate() {
            if changed.contains(reg.mask()) {
                self.device.set_volume(channel, self.register(*reg));
            }
        }
        if changed.contains(RegisterMask::BEEPER) {
            let value = self.register(Register::Beeper);
            self.beeper = (value != 0).then(|| fixed_level(value));
        }
    }

    fn set_duty_cycle(&mut self, value: u32, mask: DutyCycleMask) {
        self.device.set_duty_cycle(value, mask);
    }

    #[inline]
    fn tick(&mut self, ticks: u32) {
        self.device.tick(ticks);
    }

    #[inline]
    fn get_levels(&self, table: &VolumeTable) -> Sample {
        table.get(self.levels())
    }

    fn reset(&mut self) {
        self.registers = [0; REGISTER_COUNT];
        self.registers[Register::Mixer.index()] = 0xFF;
        self.device.reset();
        self.beeper = None;
    }

    fn get_state(&self, analyser: &AnalysisMap) -> Vec<ChannelState> {
        let share = 1.0 / NUM_CHANNELS as f32;
        let mixer = self.mixer();
        let mut noise = ChannelState::new('N', analyser.band_by_period(self.noise_period()));
        let mut envelope =
            ChannelState::new('E', analyser.band_by_period(16 * self.envelope_period()));
        let mut states = Vec::with_capacity(NUM_CHANNELS + 2);
        for (channel, reg) in VOLUMES.iter().enumerate() {
            let volume = self.register(*reg);
            if mixer.is_noise_enabled(channel) {
                noise.level += share;
            }
            if volume & ENVELOPE_ENABLE != 0 {
                envelope.level += share;
            }
            if mixer.is_tone_enabled(channel) {
                states.push(ChannelState {
                    name: char::from(b'A' + channel as u8),
                    band: analyser.band_by_period(self.tone_period(channel)),
                    level: f32::from(volume & VOLUME_MASK) / 15.0,
                });
            }
        }
        if noise.level > 0.0 {
            states.push(noise);
        }
        if envelope.level > 0.0 && shape_in(ENV_PERIODIC, self.register(Register::EnvelopeShape)) {
            states.push(envelope);
        }
        states
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aym::device::channel_level;
    use approx::assert_relative_eq;

    fn write(psg: &mut Psg, writes: &[(Register, u8)]) {
        let mut regs = Registers::new();
        for (reg, value) in writes {
            regs.set(*reg, *value);
        }
        psg.set_new_data(&regs);
    }

    #[test]
    fn test_values_are_masked_to_width() {
        let mut psg = Psg::new();
        write(
            &mut psg,
            &[
                (Register::ToneAHi, 0xFF),
                (Register::Noise, 0xFF),
                (Register::VolumeB, 0xFF),
                (Register::EnvelopeShape, 0xFE),
                (Register::EnvelopeHi, 0xFF),
            ],
        );
        assert_eq!(psg.register(Register::ToneAHi), 0x0F);
        assert_eq!(psg.register(Register::Noise), 0x1F);
        assert_eq!(psg.register(Register::VolumeB), 0x1F);
        assert_eq!(psg.register(Register::EnvelopeShape), 0x0E);
        assert_eq!(psg.register(Register::EnvelopeHi), 0xFF);
    }

    #[test]
    fn test_unwritten_registers_keep_value() {
        let mut psg = Psg::new();
        write(&mut psg, &[(Register::ToneALo, 0x34), (Register::ToneAHi, 0x02)]);
        write(&mut psg, &[(Register::ToneAHi, 0x01)]);
        assert_eq!(psg.tone_period(0), 0x134);
        assert_eq!(psg.register(Register::Mixer), 0xFF);
    }

    #[test]
    fn test_zero_tone_period_plays_as_one() {
        let mut psg = Psg::new();
        write(
            &mut psg,
            &[
                (Register::ToneALo, 0),
                (Register::ToneAHi, 0),
                (Register::Mixer, 0x3E),
                (Register::VolumeA, 0x0F),
            ],
        );
        let mut levels = Vec::new();
        for _ in 0..4 {
            psg.tick(1);
            levels.push(channel_level(psg.levels(), 0));
        }
        assert_eq!(levels, vec![31, 0, 31, 0]);
    }

    #[test]
    fn test_untouched_tone_keeps_phase() {
        let mut psg = Psg::new();
        write(
            &mut psg,
            &[(Register::ToneBLo, 10), (Register::Mixer, 0x3D), (Register::VolumeB, 0x0F)],
        );
        psg.tick(15);
        assert_eq!(channel_level(psg.levels(), 1), 31);
        write(&mut psg, &[(Register::ToneALo, 99), (Register::VolumeA, 3)]);
        assert_eq!(channel_level(psg.levels(), 1), 31);
    }

    #[test]
    fn test_beeper_overrides_output() {
        let mut psg = Psg::new();
        write(&mut psg, &[(Register::Beeper, 0xF7)]);
        for channel in 0..3 {
            assert_eq!(channel_level(psg.levels(), channel), 15);
        }
        write(&mut psg, &[(Register::Beeper, 0)]);
        assert_eq!(psg.levels(), 0);
    }

    #[test]
    fn test_state_reports_enabled_sources() {
        let mut psg = Psg::new();
        let analyser = AnalysisMap::new(1_773_400);
        assert!(psg.get_state(&analyser).is_empty());

        write(
            &mut psg,
            &[
                (Register::ToneALo, 252),
                (Register::Mixer, 0b0011_0110), // tone A, noise A
                (Register::VolumeA, 0x0A),
                (Register::VolumeB, 0x10),
                (Register::VolumeC, 0x10),
                (Register::EnvelopeShape, 0x0E),
            ],
        );
        let state = psg.get_state(&analyser);
        assert_eq!(state.len(), 3);
        assert_eq!(state[0].name, 'A');
        assert_eq!(state[0].band, 45);
        assert_relative_eq!(state[0].level, 10.0 / 15.0);
        assert_eq!(state[1].name, 'N');
        assert_relative_eq!(state[1].level, 1.0 / 3.0);
        assert_eq!(state[2].name, 'E');
        assert_relative_eq!(state[2].level, 2.0 / 3.0);
    }

    #[test]
    fn test_one_shot_envelope_not_reported() {
        let mut psg = Psg::new();
        write(&mut psg, &[(Register::VolumeA, 0x10), (Register::EnvelopeShape, 0x09)]);
        assert!(psg.get_state(&AnalysisMap::new(1_773_400)).is_empty());
    }

    #[test]
    fn test_reset() {
        let mut psg = Psg::new();
        write(&mut psg, &[(Register::Mixer, 0), (Register::VolumeA, 0x0F), (Register::Beeper, 1)]);
        psg.reset();
        assert_eq!(psg.levels(), 0);
        assert_eq!(psg.register(Register::VolumeA), 0);
        assert_eq!(psg.mixer(), MixerFlags::all());
    }
}
