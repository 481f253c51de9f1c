//! PSG register definitions
//!
//! The 14 sound registers (R0-R13) plus the legacy beeper register, the
//! mixer (R7) decoding, and the timestamped register batches fed to a chip.

use super::clock::Stamp;
use bitflags::bitflags;
use std::fmt;

/// Number of registers carried by [`Registers`] (R0-R13 and the beeper)
pub const REGISTER_COUNT: usize = 15;

/// Volume register bits holding the fixed level
pub const VOLUME_MASK: u8 = 0x0F;
/// Volume register bit selecting the envelope as level source
pub const ENVELOPE_ENABLE: u8 = 0x10;

/// PSG register address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Register {
    /// Channel A period, low byte - R0
    ToneALo = 0x00,
    /// Channel A period, high nibble - R1
    ToneAHi = 0x01,
    /// Channel B period, low byte - R2
    ToneBLo = 0x02,
    /// Channel B period, high nibble - R3
    ToneBHi = 0x03,
    /// Channel C period, low byte - R4
    ToneCLo = 0x04,
    /// Channel C period, high nibble - R5
    ToneCHi = 0x05,
    /// Noise period - R6
    Noise = 0x06,
    /// Mixer control - R7
    Mixer = 0x07,
    /// Channel A volume / envelope select - R8
    VolumeA = 0x08,
    /// Channel B volume / envelope select - R9
    VolumeB = 0x09,
    /// Channel C volume / envelope select - R10
    VolumeC = 0x0A,
    /// Envelope period, low byte - R11
    EnvelopeLo = 0x0B,
    /// Envelope period, high byte - R12
    EnvelopeHi = 0x0C,
    /// Envelope shape - R13
    EnvelopeShape = 0x0D,
    /// Beeper level (not a chip register)
    Beeper = 0x0E,
}

impl Register {
    /// All registers in address order
    pub const ALL: [Register; REGISTER_COUNT] = [
        Register::ToneALo,
        Register::ToneAHi,
        Register::ToneBLo,
        Register::ToneBHi,
        Register::ToneCLo,
        Register::ToneCHi,
        Register::Noise,
        Register::Mixer,
        Register::VolumeA,
        Register::VolumeB,
        Register::VolumeC,
        Register::EnvelopeLo,
        Register::EnvelopeHi,
        Register::EnvelopeShape,
        Register::Beeper,
    ];

    /// Convert a raw register number (0-14) to Register enum
    pub fn from_addr(addr: u8) -> Option<Self> {
        Self::ALL.get(usize::from(addr)).copied()
    }

    /// Get the register address value
    #[inline]
    pub fn addr(self) -> u8 {
        self as u8
    }

    /// Index into register arrays
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Bits the hardware actually latches for this register
    #[inline]
    pub fn width_mask(self) -> u8 {
        match self {
            Register::ToneAHi
            | Register::ToneBHi
            | Register::ToneCHi
            | Register::EnvelopeShape
            | Register::Beeper => 0x0F,
            Register::Noise | Register::VolumeA | Register::VolumeB | Register::VolumeC => 0x1F,
            _ => 0xFF,
        }
    }

    /// Bit of this register in a [`RegisterMask`]
    #[inline]
    pub fn mask(self) -> RegisterMask {
        RegisterMask::from_bits_truncate(1 << self.addr())
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Register::ToneALo => write!(f, "R0 (Channel A Period Low)"),
            Register::ToneAHi => write!(f, "R1 (Channel A Period High)"),
            Register::ToneBLo => write!(f, "R2 (Channel B Period Low)"),
            Register::ToneBHi => write!(f, "R3 (Channel B Period High)"),
            Register::ToneCLo => write!(f, "R4 (Channel C Period Low)"),
            Register::ToneCHi => write!(f, "R5 (Channel C Period High)"),
            Register::Noise => write!(f, "R6 (Noise Period)"),
            Register::Mixer => write!(f, "R7 (Mixer Control)"),
            Register::VolumeA => write!(f, "R8 (Channel A Volume)"),
            Register::VolumeB => write!(f, "R9 (Channel B Volume)"),
            Register::VolumeC => write!(f, "R10 (Channel C Volume)"),
            Register::EnvelopeLo => write!(f, "R11 (Envelope Period Low)"),
            Register::EnvelopeHi => write!(f, "R12 (Envelope Period High)"),
            Register::EnvelopeShape => write!(f, "R13 (Envelope Shape)"),
            Register::Beeper => write!(f, "Beeper"),
        }
    }
}

bitflags! {
    /// Set of registers, one bit per address
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct RegisterMask: u16 {
        /// R0
        const TONE_A_LO = 1 << 0;
        /// R1
        const TONE_A_HI = 1 << 1;
        /// R2
        const TONE_B_LO = 1 << 2;
        /// R3
        const TONE_B_HI = 1 << 3;
        /// R4
        const TONE_C_LO = 1 << 4;
        /// R5
        const TONE_C_HI = 1 << 5;
        /// R6
        const NOISE = 1 << 6;
        /// R7
        const MIXER = 1 << 7;
        /// R8
        const VOLUME_A = 1 << 8;
        /// R9
        const VOLUME_B = 1 << 9;
        /// R10
        const VOLUME_C = 1 << 10;
        /// R11
        const ENVELOPE_LO = 1 << 11;
        /// R12
        const ENVELOPE_HI = 1 << 12;
        /// R13
        const ENVELOPE_SHAPE = 1 << 13;
        /// Beeper
        const BEEPER = 1 << 14;

        /// Both channel A period bytes
        const TONE_A = Self::TONE_A_LO.bits() | Self::TONE_A_HI.bits();
        /// Both channel B period bytes
        const TONE_B = Self::TONE_B_LO.bits() | Self::TONE_B_HI.bits();
        /// Both channel C period bytes
        const TONE_C = Self::TONE_C_LO.bits() | Self::TONE_C_HI.bits();
        /// All volume registers
        const VOLUMES = Self::VOLUME_A.bits() | Self::VOLUME_B.bits() | Self::VOLUME_C.bits();
        /// Both envelope period bytes
        const ENVELOPE_PERIOD = Self::ENVELOPE_LO.bits() | Self::ENVELOPE_HI.bits();
        /// The 14 chip registers
        const PSG = (1 << 14) - 1;
    }
}

bitflags! {
    /// Mixer Control Register (R7) bitflags
    ///
    /// A set bit disables the source for that channel.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct MixerFlags: u8 {
        /// Channel A tone disable
        const TONE_A = 0x01;
        /// Channel B tone disable
        const TONE_B = 0x02;
        /// Channel C tone disable
        const TONE_C = 0x04;
        /// Channel A noise disable
        const NOISE_A = 0x08;
        /// Channel B noise disable
        const NOISE_B = 0x10;
        /// Channel C noise disable
        const NOISE_C = 0x20;
    }
}

impl MixerFlags {
    /// Create mixer flags from raw register value
    pub fn from_register(value: u8) -> Self {
        MixerFlags::from_bits_truncate(value)
    }

    /// Check if the tone of `channel` (0-2) reaches the output
    #[inline]
    pub fn is_tone_enabled(self, channel: usize) -> bool {
        self.bits() & (MixerFlags::TONE_A.bits() << channel) == 0
    }

    /// Check if noise reaches the output of `channel` (0-2)
    #[inline]
    pub fn is_noise_enabled(self, channel: usize) -> bool {
        self.bits() & (MixerFlags::NOISE_A.bits() << channel) == 0
    }

    /// Check if no channel takes noise
    #[inline]
    pub fn is_noise_unused(self) -> bool {
        self.contains(MixerFlags::NOISE_A | MixerFlags::NOISE_B | MixerFlags::NOISE_C)
    }
}

/// Register values written in one batch
///
/// Only registers explicitly set are applied by the chip; the others keep
/// their previous value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Registers {
    data: [u8; REGISTER_COUNT],
    mask: RegisterMask,
}

impl Registers {
    /// Empty batch
    pub fn new() -> Self {
        Self::default()
    }

    /// Batch writing all 14 chip registers
    pub fn from_array(values: &[u8; 14]) -> Self {
        let mut regs = Self::new();
        for (reg, value) in Register::ALL.iter().zip(values.iter()) {
            regs.set(*reg, *value);
        }
        regs
    }

    /// Record a write; the raw value is kept, masking happens on apply
    #[inline]
    pub fn set(&mut self, reg: Register, value: u8) {
        self.data[reg.index()] = value;
        self.mask |= reg.mask();
    }

    /// Raw value of a register
    #[inline]
    pub fn get(&self, reg: Register) -> u8 {
        self.data[reg.index()]
    }

    /// Was this register written
    #[inline]
    pub fn has(&self, reg: Register) -> bool {
        self.mask.intersects(reg.mask())
    }

    /// Written registers
    #[inline]
    pub fn mask(&self) -> RegisterMask {
        self.mask
    }

    /// Nothing written
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.mask.is_empty()
    }

    /// Written registers with their raw values
    pub fn iter(&self) -> impl Iterator<Item = (Register, u8)> + '_ {
        Register::ALL
            .iter()
            .filter(move |reg| self.has(**reg))
            .map(move |reg| (*reg, self.get(*reg)))
    }
}

/// Register batch to apply at a given time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DataChunk<D = Registers> {
    /// When the writes take effect
    pub stamp: Stamp,
    /// Writes for one chip ([`Registers`]) or a pair for TurboSound
    pub data: D,
}

impl<D> DataChunk<D> {
    /// Create a chunk
    pub fn new(stamp: Stamp, data: D) -> Self {
        Self { stamp, data }
    }
}
