//! Backend trait abstraction for PSG-like sound sources
//!
//! The chip orchestrator is generic over this trait, so a single PSG and a
//! TurboSound pair share the same buffering, clocking and rendering code.

use super::analysis::{AnalysisMap, ChannelState};
use super::volume_table::VolumeTable;
use crate::config::DutyCycleMask;
use crate::sound::Sample;

/// Common interface for PSG backends
///
/// # Example
///
/// ```
/// use aym::aym::{Psg, PsgBackend, Register, Registers, VolumeTable};
/// use aym::config::{ChipType, LayoutType};
/// use aym::sound::MatrixMixer;
///
/// fn render<B: PsgBackend>(psg: &mut B, table: &VolumeTable, ticks: u32) -> Vec<i16> {
///     (0..ticks)
///         .map(|_| {
///             psg.tick(1);
///             psg.get_levels(table).left
///         })
///         .collect()
/// }
///
/// let mut table = VolumeTable::new();
/// table.set_parameters(ChipType::Ay, LayoutType::Abc, &MatrixMixer::default());
///
/// let mut psg = Psg::new();
/// let mut regs = Registers::new();
/// regs.set(Register::VolumeA, 0x0F);
/// psg.set_new_data(&regs);
/// assert!(render(&mut psg, &table, 10).iter().all(|v| *v > 0));
/// ```
pub trait PsgBackend {
    /// Register writes carried by one data chunk
    type Data;

    /// Apply a batch of register writes
    fn set_new_data(&mut self, data: &Self::Data);

    /// Apply the duty cycle to the generators selected by `mask`
    fn set_duty_cycle(&mut self, value: u32, mask: DutyCycleMask);

    /// Advance all generators by `ticks`
    fn tick(&mut self, ticks: u32);

    /// Current output through the volume table
    fn get_levels(&self, table: &VolumeTable) -> Sample;

    /// Power-on state
    fn reset(&mut self);

    /// Snapshot of the sounding sources
    fn get_state(&self, analyser: &AnalysisMap) -> Vec<ChannelState>;
}
