//! AY-3-8910 / YM2149 PSG emulation
//!
//! Tone, noise and envelope generators, the register bank, the nonlinear DAC
//! and the clock bridge to the host sample rate.
//!
//! Layers, bottom-up:
//! - `generators` / `device` - period counters and level composition
//! - `psg` / `turbosound` - register decoding for one or two chips
//! - `volume_table` - DAC plus stereo mixing, precomputed per level triple
//! - `clock` / `renderer` - tick-to-sample bridge and output quality
//! - `chip` - buffering, parameter sync and flushing to a sink

// Internal modules
pub mod analysis;
pub mod backend;
pub mod chip;
pub mod clock;
pub mod device;
pub mod generators;
pub mod lpfilter;
pub mod psg;
pub mod registers;
pub mod renderer;
pub mod tables;
pub mod turbosound;
pub mod volume_table;

// Re-export public API
pub use analysis::{AnalysisMap, ChannelState};
pub use backend::PsgBackend;
pub use chip::{create_chip, create_turbo_sound_chip, AymChip, Chip, TurboSoundChip};
pub use clock::{ClockSource, Stamp};
pub use generators::noise_table;
pub use psg::Psg;
pub use registers::{DataChunk, MixerFlags, Register, RegisterMask, Registers};
pub use renderer::Renderer;
pub use turbosound::{mix_turbo, TurboSound};
pub use volume_table::VolumeTable;
