//! Sample renderers
//!
//! All renderers walk the same clock bridge and differ only in how the
//! device output between two sample boundaries becomes one sample:
//! - LQ: the level at the boundary tick
//! - MQ: box average of every tick since the previous sample
//! - HQ: low-pass filtered at tick rate, read at the boundary

use super::backend::PsgBackend;
use super::clock::{ClockSource, Stamp};
use super::lpfilter::LowPassFilter;
use super::volume_table::VolumeTable;
use crate::config::Interpolation;
use crate::sound::{Chunk, Sample, SampleType};

/// Walk the clock up to `till`
///
/// Each step consumes the smaller of "ticks to next sample" and "ticks to
/// `till`"; `step(ticks, sample_due)` is called after every advance.
fn walk<F: FnMut(u32, bool)>(clock: &mut ClockSource, till: Stamp, mut step: F) {
    loop {
        let to_end = clock.ticks_to(till);
        if to_end == 0 {
            break;
        }
        let to_sample = clock.ticks_to_sample();
        let ticks = to_sample.min(to_end).min(u64::from(u32::MAX));
        clock.advance(ticks);
        let sample_due = ticks == to_sample;
        step(ticks as u32, sample_due);
        if sample_due {
            clock.next_sample();
        }
    }
}

/// Nearest tick sampling
#[derive(Debug, Clone, Default)]
pub struct LqRenderer;

impl LqRenderer {
    /// Render up to `till`
    pub fn render<B: PsgBackend>(
        &mut self,
        psg: &mut B,
        clock: &mut ClockSource,
        table: &VolumeTable,
        till: Stamp,
        out: &mut Chunk,
    ) {
        walk(clock, till, |ticks, sample_due| {
            psg.tick(ticks);
            if sample_due {
                out.push(psg.get_levels(table));
            }
        });
    }
}

/// Box averaging over the ticks of each sample
#[derive(Debug, Clone, Default)]
pub struct MqRenderer {
    left: i64,
    right: i64,
    count: i64,
}

impl MqRenderer {
    /// Render up to `till`
    pub fn render<B: PsgBackend>(
        &mut self,
        psg: &mut B,
        clock: &mut ClockSource,
        table: &VolumeTable,
        till: Stamp,
        out: &mut Chunk,
    ) {
        walk(clock, till, |ticks, sample_due| {
            for _ in 0..ticks {
                psg.tick(1);
                let level = psg.get_levels(table);
                self.left += i64::from(level.left);
                self.right += i64::from(level.right);
                self.count += 1;
            }
            if sample_due {
                out.push(self.take(psg, table));
            }
        });
    }

    fn take<B: PsgBackend>(&mut self, psg: &B, table: &VolumeTable) -> Sample {
        if self.count == 0 {
            return psg.get_levels(table);
        }
        let sample = Sample::new(
            (self.left / self.count) as SampleType,
            (self.right / self.count) as SampleType,
        );
        self.reset();
        sample
    }

    /// Drop the partial average
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Low-pass filtered output
#[derive(Debug, Clone)]
pub struct HqRenderer {
    filter: LowPassFilter,
}

impl HqRenderer {
    /// Create a renderer for the given tick and sample rates
    pub fn new(psg_freq: u64, sound_freq: u32) -> Self {
        let mut renderer = Self {
            filter: LowPassFilter::new(),
        };
        renderer.set_frequency(psg_freq, sound_freq);
        renderer
    }

    /// Retune the filter (cutoff at a quarter of the sample rate)
    pub fn set_frequency(&mut self, psg_freq: u64, sound_freq: u32) {
        self.filter
            .set_parameters(psg_freq, u64::from(sound_freq) / 4);
    }

    /// Render up to `till`
    pub fn render<B: PsgBackend>(
        &mut self,
        psg: &mut B,
        clock: &mut ClockSource,
        table: &VolumeTable,
        till: Stamp,
        out: &mut Chunk,
    ) {
        let filter = &mut self.filter;
        walk(clock, till, |ticks, sample_due| {
            for _ in 0..ticks {
                psg.tick(1);
                filter.feed(psg.get_levels(table));
            }
            if sample_due {
                out.push(filter.output());
            }
        });
    }

    /// Clear the filter history
    pub fn reset(&mut self) {
        self.filter.reset();
    }
}

/// Renderer selected by the interpolation setting
#[derive(Debug, Clone)]
pub enum Renderer {
    /// [`Interpolation::None`]
    Lq(LqRenderer),
    /// [`Interpolation::Low`]
    Mq(MqRenderer),
    /// [`Interpolation::High`]
    Hq(HqRenderer),
}

impl Renderer {
    /// Create the renderer for `interpolation`
    pub fn new(interpolation: Interpolation, psg_freq: u64, sound_freq: u32) -> Self {
        match interpolation {
            Interpolation::None => Renderer::Lq(LqRenderer),
            Interpolation::Low => Renderer::Mq(MqRenderer::default()),
            Interpolation::High => Renderer::Hq(HqRenderer::new(psg_freq, sound_freq)),
        }
    }

    /// Interpolation setting this renderer implements
    pub fn interpolation(&self) -> Interpolation {
        match self {
            Renderer::Lq(_) => Interpolation::None,
            Renderer::Mq(_) => Interpolation::Low,
            Renderer::Hq(_) => Interpolation::High,
        }
    }

    /// Follow a clock change
    pub fn set_frequency(&mut self, psg_freq: u64, sound_freq: u32) {
        if let Renderer::Hq(hq) = self {
            hq.set_frequency(psg_freq, sound_freq);
        }
    }

    /// Render up to `till`, appending samples to `out`
    pub fn render<B: PsgBackend>(
        &mut self,
        psg: &mut B,
        clock: &mut ClockSource,
        table: &VolumeTable,
        till: Stamp,
        out: &mut Chunk,
    ) {
        match self {
            Renderer::Lq(lq) => lq.render(psg, clock, table, till, out),
            Renderer::Mq(mq) => mq.render(psg, clock, table, till, out),
            Renderer::Hq(hq) => hq.render(psg, clock, table, till, out),
        }
    }

    /// Drop any partial state
    pub fn reset(&mut self) {
        match self {
            Renderer::Lq(_) => {}
            Renderer::Mq(mq) => mq.reset(),
            Renderer::Hq(hq) => hq.reset(),
        }
    }
}
