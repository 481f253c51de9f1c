//! TurboSound: two PSGs sharing one clock and one output

use super::analysis::{AnalysisMap, ChannelState};
use super::backend::PsgBackend;
use super::psg::Psg;
use super::registers::Registers;
use super::volume_table::VolumeTable;
use crate::config::DutyCycleMask;
use crate::sound::Sample;

/// Number of chips in a TurboSound pair
pub const TURBO_SOUND_CHIPS: usize = 2;

/// Combine the outputs of both chips
///
/// Channel-wise saturating sum, halved.
#[inline]
pub fn mix_turbo(first: Sample, second: Sample) -> Sample {
    first.saturating_add(second).halved()
}

/// Pair of independent PSGs
#[derive(Clone, Debug, Default)]
pub struct TurboSound {
    chips: [Psg; TURBO_SOUND_CHIPS],
}

impl TurboSound {
    /// Create both chips in power-on state
    pub fn new() -> Self {
        Self::default()
    }

    /// Access one of the chips
    pub fn chip(&self, index: usize) -> Option<&Psg> {
        self.chips.get(index)
    }
}

impl PsgBackend for TurboSound {
    type Data = [Registers; TURBO_SOUND_CHIPS];

    fn set_new_data(&mut self, data: &Self::Data) {
        for (chip, regs) in self.chips.iter_mut().zip(data) {
            chip.set_new_data(regs);
        }
    }

    fn set_duty_cycle(&mut self, value: u32, mask: DutyCycleMask) {
        for chip in &mut self.chips {
            chip.set_duty_cycle(value, mask);
        }
    }

    #[inline]
    fn tick(&mut self, ticks: u32) {
        for chip in &mut self.chips {
            chip.tick(ticks);
        }
    }

    #[inline]
    fn get_levels(&self, table: &VolumeTable) -> Sample {
        mix_turbo(self.chips[0].get_levels(table), self.chips[1].get_levels(table))
    }

    fn reset(&mut self) {
        for chip in &mut self.chips {
            chip.reset();
        }
    }

    fn get_state(&self, analyser: &AnalysisMap) -> Vec<ChannelState> {
        self.chips
            .iter()
            .flat_map(|chip| chip.get_state(analyser))
            .collect()
    }
}
