//! AY-3-8910 / YM2149 PSG emulator
//!
//! Turns a stream of timestamped register writes into a stereo sample stream.
//! The emulation covers the three tone channels, the shared noise LFSR, the
//! 32-step envelope generator and the nonlinear DAC of both chip variants,
//! and bridges the chip tick clock (`clock / 8`) to the host output rate.
//!
//! # Features
//! - AY and YM volume tables, six stereo layouts plus mono
//! - Three output qualities (nearest tick, box averaging, low-pass filtered)
//! - Duty-cycle control for tone, noise and envelope counters
//! - TurboSound (two chips ticked in lockstep)
//! - Per-channel state snapshots for visualization
//!
//! # Crate feature flags
//! - `export-wav` (default): [`sound::WavSink`], a WAV file sink built on `hound`
//! - `register-dump` (default): [`dump`], a CSV register dump reader
//!
//! # Quick start
//! ```
//! use aym::aym::{create_chip, DataChunk, Register, Registers, Stamp};
//! use aym::config::ChipConfig;
//! use aym::sound::{MatrixMixer, Sample};
//!
//! let mut chip = create_chip(ChipConfig::default(), MatrixMixer::default(), Vec::<Sample>::new());
//!
//! let mut regs = Registers::new();
//! regs.set(Register::ToneALo, 0x1C);
//! regs.set(Register::ToneAHi, 0x01);
//! regs.set(Register::Mixer, 0x3E); // tone A only
//! regs.set(Register::VolumeA, 0x0F);
//! chip.render_data(DataChunk::new(Stamp::ZERO, regs));
//! chip.render_data(DataChunk::new(Stamp::from_millis(20), Registers::new()));
//! chip.flush();
//!
//! // 20 ms at 44.1 kHz, the sample on the segment boundary is still pending
//! assert_eq!(chip.target().len(), 881);
//! ```

#![warn(missing_docs)]

pub mod aym; // PSG emulation core
pub mod config; // Chip parameters
pub mod sound; // Samples, mixers and sinks

#[cfg(feature = "register-dump")]
pub mod dump; // CSV register dump input

/// Error types for the emulator's configuration and I/O edges
///
/// The render path itself cannot fail: out-of-range register values are
/// masked, never rejected.
#[derive(thiserror::Error, Debug)]
pub enum AymError {
    /// IO error from filesystem
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// Malformed register dump
    #[error("Register dump error: {0}")]
    DumpError(String),

    /// Audio file output error
    #[error("Audio file error: {0}")]
    AudioFileError(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<String> for AymError {
    /// Converts a String into `AymError::Other`.
    ///
    /// Prefer the specific variants (`ConfigError`, `DumpError`, ...) where
    /// the caller needs to tell errors apart.
    fn from(msg: String) -> Self {
        AymError::Other(msg)
    }
}

impl From<&str> for AymError {
    fn from(msg: &str) -> Self {
        AymError::Other(msg.to_string())
    }
}

impl From<serde_json::Error> for AymError {
    fn from(err: serde_json::Error) -> Self {
        AymError::ConfigError(err.to_string())
    }
}

/// Result type for emulator operations
pub type Result<T> = std::result::Result<T, AymError>;

pub use aym::{
    create_chip, create_turbo_sound_chip, AymChip, Chip, ChannelState, DataChunk, Psg,
    PsgBackend, Register, Registers, Stamp, TurboSound, TurboSoundChip,
};
pub use config::{
    ChipConfig, ChipParameters, ChipType, DutyCycleMask, Interpolation, LayoutType,
    SharedParameters,
};
pub use sound::{Chunk, MatrixMixer, Sample, SampleSink, ThreeChannelsMixer};
