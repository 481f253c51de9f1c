//! Precomputed level-to-sample lookup
//!
//! One entry per packed 15-bit level index, combining the chip's DAC curve,
//! the channel layout and the stereo mixer. The table is cached and only
//! rebuilt when chip type, layout or the mixer's response changes.

use super::device::{channel_level, LEVEL_BITS};
use super::generators::NUM_CHANNELS;
use super::tables::{AY_VOLUME_TABLE, YM_VOLUME_TABLE};
use crate::config::{ChipType, LayoutType};
use crate::sound::{Sample, SampleType, ThreeChannelsMixer, SAMPLE_MAX, SAMPLE_MID};

/// Entries in the lookup table
pub const TABLE_SIZE: usize = 1 << (LEVEL_BITS as usize * NUM_CHANNELS);

/// DAC output scaled into the sample range
pub fn dac_levels(chip_type: ChipType) -> [SampleType; 32] {
    let raw = match chip_type {
        ChipType::Ay => &AY_VOLUME_TABLE,
        ChipType::Ym => &YM_VOLUME_TABLE,
    };
    raw.map(|value| {
        let scaled = u32::from(value) * SAMPLE_MAX as u32 / u32::from(u16::MAX);
        SAMPLE_MID + scaled as SampleType
    })
}

/// Mixer response to each input alone at full scale
fn mixer_fingerprint(mixer: &(impl ThreeChannelsMixer + ?Sized)) -> [Sample; 3] {
    [
        mixer.apply_data([SAMPLE_MAX, SAMPLE_MID, SAMPLE_MID]),
        mixer.apply_data([SAMPLE_MID, SAMPLE_MAX, SAMPLE_MID]),
        mixer.apply_data([SAMPLE_MID, SAMPLE_MID, SAMPLE_MAX]),
    ]
}

/// Cached level-to-sample table
#[derive(Clone)]
pub struct VolumeTable {
    chip_type: Option<ChipType>,
    layout: Option<LayoutType>,
    fingerprint: [Sample; 3],
    lookup: Box<[Sample]>,
}

impl VolumeTable {
    /// Empty (silent) table; call [`VolumeTable::set_parameters`] before use
    pub fn new() -> Self {
        Self {
            chip_type: None,
            layout: None,
            fingerprint: [Sample::default(); 3],
            lookup: vec![Sample::default(); TABLE_SIZE].into_boxed_slice(),
        }
    }

    /// Rebuild if chip type, layout or mixer response differ from the cache
    ///
    /// Returns `true` if the table was rebuilt.
    pub fn set_parameters<M: ThreeChannelsMixer + ?Sized>(
        &mut self,
        chip_type: ChipType,
        layout: LayoutType,
        mixer: &M,
    ) -> bool {
        let fingerprint = mixer_fingerprint(mixer);
        if self.chip_type == Some(chip_type)
            && self.layout == Some(layout)
            && self.fingerprint == fingerprint
        {
            return false;
        }
        log::debug!("Rebuilding volume table: {:?}, layout {:?}", chip_type, layout);
        self.rebuild(chip_type, layout, mixer);
        self.chip_type = Some(chip_type);
        self.layout = Some(layout);
        self.fingerprint = fingerprint;
        true
    }

    fn rebuild<M: ThreeChannelsMixer + ?Sized>(
        &mut self,
        chip_type: ChipType,
        layout: LayoutType,
        mixer: &M,
    ) {
        let dac = dac_levels(chip_type);
        let order = layout.channel_order();
        for (index, entry) in self.lookup.iter_mut().enumerate() {
            let packed = index as u32;
            let input: [SampleType; 3] =
                std::array::from_fn(|channel| dac[channel_level(packed, channel) as usize]);
            *entry = match order {
                Some(order) => mixer.apply_data(order.map(|channel| input[channel])),
                None => {
                    let sum: i32 = input.iter().map(|value| i32::from(*value)).sum();
                    let average = (sum / NUM_CHANNELS as i32) as SampleType;
                    mixer.apply_data([average; 3])
                }
            };
        }
    }

    /// Sample for a packed level index
    #[inline]
    pub fn get(&self, levels: u32) -> Sample {
        self.lookup[levels as usize & (TABLE_SIZE - 1)]
    }

    /// Chip type the table was built for
    pub fn chip_type(&self) -> Option<ChipType> {
        self.chip_type
    }

    /// Layout the table was built for
    pub fn layout(&self) -> Option<LayoutType> {
        self.layout
    }
}

impl Default for VolumeTable {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for VolumeTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VolumeTable")
            .field("chip_type", &self.chip_type)
            .field("layout", &self.layout)
            .field("fingerprint", &self.fingerprint)
            .finish_non_exhaustive()
    }
}
