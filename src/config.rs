//! Chip configuration
//!
//! The emulator polls its configuration through the [`ChipParameters`]
//! trait. [`ChipConfig`] is the plain value form (serde friendly), and
//! [`SharedParameters`] wraps one behind a lock so another thread can retune
//! a running chip.

use crate::{AymError, Result};
use bitflags::bitflags;
use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// ZX Spectrum 128 PSG clock
pub const DEFAULT_CLOCK_FREQ: u64 = 1_773_400;
/// Default host output rate
pub const DEFAULT_SOUND_FREQ: u32 = 44_100;
/// Duty cycle value meaning "symmetric square wave"
pub const NO_DUTY_CYCLE: u32 = 50;
/// Upper (exclusive) bound of a duty cycle value
pub const MAX_DUTY_CYCLE: u32 = 100;

/// Chip variant, selecting the DAC curve
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, FromPrimitive,
)]
#[serde(rename_all = "lowercase")]
pub enum ChipType {
    /// General Instrument AY-3-8910 (16 distinct volume steps)
    #[default]
    Ay = 0,
    /// Yamaha YM2149 (32 volume steps)
    Ym = 1,
}

/// Stereo channel layout
///
/// The three letters name which PSG channel feeds the left, center and
/// right mixer inputs.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, FromPrimitive,
)]
#[serde(rename_all = "lowercase")]
pub enum LayoutType {
    /// A left, B center, C right
    #[default]
    Abc = 0,
    /// A left, C center, B right
    Acb = 1,
    /// B left, A center, C right
    Bac = 2,
    /// B left, C center, A right
    Bca = 3,
    /// C left, B center, A right
    Cba = 4,
    /// C left, A center, B right
    Cab = 5,
    /// All three channels averaged
    Mono = 6,
}

impl LayoutType {
    /// PSG channel feeding each mixer input, or `None` for mono
    pub fn channel_order(self) -> Option<[usize; 3]> {
        match self {
            LayoutType::Abc => Some([0, 1, 2]),
            LayoutType::Acb => Some([0, 2, 1]),
            LayoutType::Bac => Some([1, 0, 2]),
            LayoutType::Bca => Some([1, 2, 0]),
            LayoutType::Cba => Some([2, 1, 0]),
            LayoutType::Cab => Some([2, 0, 1]),
            LayoutType::Mono => None,
        }
    }
}

/// Output quality
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, FromPrimitive,
)]
#[serde(rename_all = "lowercase")]
pub enum Interpolation {
    /// Nearest tick sampling (LQ renderer)
    #[default]
    None = 0,
    /// Box averaging over the ticks of each sample (MQ renderer)
    Low = 1,
    /// Low-pass filtered at tick rate (HQ renderer)
    High = 2,
}

macro_rules! impl_try_from_code {
    ($ty:ty, $what:literal) => {
        impl TryFrom<i64> for $ty {
            type Error = AymError;

            fn try_from(code: i64) -> Result<Self> {
                <$ty>::from_i64(code)
                    .ok_or_else(|| AymError::ConfigError(format!("unknown {} {}", $what, code)))
            }
        }
    };
}

impl_try_from_code!(ChipType, "chip type");
impl_try_from_code!(LayoutType, "layout");
impl_try_from_code!(Interpolation, "interpolation");

bitflags! {
    /// Generators affected by the duty cycle setting
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct DutyCycleMask: u8 {
        /// Tone A
        const A = 0x01;
        /// Tone B
        const B = 0x02;
        /// Tone C
        const C = 0x04;
        /// Noise
        const N = 0x08;
        /// Envelope
        const E = 0x10;
    }
}

/// Polled chip configuration
///
/// `version()` must change whenever any other getter would return a
/// different value; the chip only recomputes derived state (clock bridge,
/// renderer, duty cycle) after it observes a new version.
pub trait ChipParameters {
    /// Change counter
    fn version(&self) -> u32;
    /// Chip input clock in Hz
    fn clock_freq(&self) -> u64;
    /// Output sample rate in Hz
    fn sound_freq(&self) -> u32;
    /// DAC variant
    fn chip_type(&self) -> ChipType;
    /// Stereo layout
    fn layout(&self) -> LayoutType;
    /// Duty cycle in percent
    fn duty_cycle_value(&self) -> u32;
    /// Generators the duty cycle applies to
    fn duty_cycle_mask(&self) -> DutyCycleMask;
    /// Output quality
    fn interpolation(&self) -> Interpolation;

    /// Capture all values at once
    fn snapshot(&self) -> ChipConfig {
        ChipConfig {
            clock_freq: self.clock_freq(),
            sound_freq: self.sound_freq(),
            chip_type: self.chip_type(),
            layout: self.layout(),
            duty_cycle_value: self.duty_cycle_value(),
            duty_cycle_mask: self.duty_cycle_mask(),
            interpolation: self.interpolation(),
        }
    }
}

/// Plain chip configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChipConfig {
    /// Chip input clock in Hz
    pub clock_freq: u64,
    /// Output sample rate in Hz
    pub sound_freq: u32,
    /// DAC variant
    pub chip_type: ChipType,
    /// Stereo layout
    pub layout: LayoutType,
    /// Duty cycle in percent (1..=99)
    pub duty_cycle_value: u32,
    /// Generators the duty cycle applies to
    pub duty_cycle_mask: DutyCycleMask,
    /// Output quality
    pub interpolation: Interpolation,
}

impl Default for ChipConfig {
    fn default() -> Self {
        Self {
            clock_freq: DEFAULT_CLOCK_FREQ,
            sound_freq: DEFAULT_SOUND_FREQ,
            chip_type: ChipType::Ay,
            layout: LayoutType::Abc,
            duty_cycle_value: NO_DUTY_CYCLE,
            duty_cycle_mask: DutyCycleMask::empty(),
            interpolation: Interpolation::None,
        }
    }
}

impl ChipConfig {
    /// Parse and validate a JSON configuration
    ///
    /// Missing fields take their default value.
    ///
    /// # Example
    ///
    /// ```
    /// use aym::config::{ChipConfig, ChipType};
    ///
    /// let cfg = ChipConfig::from_json(r#"{ "chip_type": "ym", "clock_freq": 2000000 }"#).unwrap();
    /// assert_eq!(cfg.chip_type, ChipType::Ym);
    /// assert_eq!(cfg.sound_freq, 44_100);
    /// ```
    pub fn from_json(text: &str) -> Result<Self> {
        let config: ChipConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check the values the emulator cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.clock_freq < 8 {
            return Err(AymError::ConfigError(format!(
                "clock frequency {} Hz is below one tick per second",
                self.clock_freq
            )));
        }
        if self.sound_freq == 0 {
            return Err(AymError::ConfigError("sound frequency must be nonzero".into()));
        }
        if self.duty_cycle_value == 0 || self.duty_cycle_value >= MAX_DUTY_CYCLE {
            return Err(AymError::ConfigError(format!(
                "duty cycle {} outside 1..={}",
                self.duty_cycle_value,
                MAX_DUTY_CYCLE - 1
            )));
        }
        Ok(())
    }
}

impl ChipParameters for ChipConfig {
    fn version(&self) -> u32 {
        0
    }

    fn clock_freq(&self) -> u64 {
        self.clock_freq
    }

    fn sound_freq(&self) -> u32 {
        self.sound_freq
    }

    fn chip_type(&self) -> ChipType {
        self.chip_type
    }

    fn layout(&self) -> LayoutType {
        self.layout
    }

    fn duty_cycle_value(&self) -> u32 {
        self.duty_cycle_value
    }

    fn duty_cycle_mask(&self) -> DutyCycleMask {
        self.duty_cycle_mask
    }

    fn interpolation(&self) -> Interpolation {
        self.interpolation
    }

    fn snapshot(&self) -> ChipConfig {
        *self
    }
}

#[derive(Debug)]
struct Versioned {
    config: ChipConfig,
    version: u32,
}

/// Chip configuration shared between the render thread and a controller
///
/// Clones share the same underlying configuration.
#[derive(Debug, Clone)]
pub struct SharedParameters {
    inner: Arc<RwLock<Versioned>>,
}

impl SharedParameters {
    /// Wrap a configuration
    pub fn new(config: ChipConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Versioned { config, version: 1 })),
        }
    }

    /// Modify the configuration and bump its version
    pub fn update<F: FnOnce(&mut ChipConfig)>(&self, f: F) {
        let mut guard = self.inner.write();
        f(&mut guard.config);
        guard.version = guard.version.wrapping_add(1);
    }

    /// Current configuration
    pub fn get(&self) -> ChipConfig {
        self.inner.read().config
    }
}

impl Default for SharedParameters {
    fn default() -> Self {
        Self::new(ChipConfig::default())
    }
}

impl ChipParameters for SharedParameters {
    fn version(&self) -> u32 {
        self.inner.read().version
    }

    fn clock_freq(&self) -> u64 {
        self.inner.read().config.clock_freq
    }

    fn sound_freq(&self) -> u32 {
        self.inner.read().config.sound_freq
    }

    fn chip_type(&self) -> ChipType {
        self.inner.read().config.chip_type
    }

    fn layout(&self) -> LayoutType {
        self.inner.read().config.layout
    }

    fn duty_cycle_value(&self) -> u32 {
        self.inner.read().config.duty_cycle_value
    }

    fn duty_cycle_mask(&self) -> DutyCycleMask {
        self.inner.read().config.duty_cycle_mask
    }

    fn interpolation(&self) -> Interpolation {
        self.inner.read().config.interpolation
    }

    fn snapshot(&self) -> ChipConfig {
        self.get()
    }
}
