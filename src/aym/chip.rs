//! Chip orchestrator
//!
//! Buffers timestamped register writes, keeps derived state in sync with
//! the polled [`ChipParameters`], and renders on [`Chip::flush`].

use super::analysis::{AnalysisMap, ChannelState};
use super::backend::PsgBackend;
use super::clock::ClockSource;
use super::psg::Psg;
use super::registers::{DataChunk, Registers};
use super::renderer::Renderer;
use super::turbosound::TurboSound;
use super::volume_table::VolumeTable;
use crate::config::{ChipConfig, ChipParameters, DEFAULT_CLOCK_FREQ, DEFAULT_SOUND_FREQ};
use crate::sound::{Chunk, SampleSink, ThreeChannelsMixer};

/// Emulated sound chip driving a sample sink
///
/// Generic over the sound source (`B`), the configuration (`P`), the stereo
/// mixer (`M`) and the output (`S`).
pub struct Chip<B, P, M, S>
where
    B: PsgBackend,
{
    params: P,
    /// Last parameter version applied, `None` forces a resync
    params_version: Option<u32>,
    config: ChipConfig,
    mixer: M,
    target: S,
    psg: B,
    clock: ClockSource,
    renderer: Renderer,
    table: VolumeTable,
    analyser: AnalysisMap,
    buffer: Vec<DataChunk<B::Data>>,
}

/// Single AY/YM chip
pub type AymChip<P, M, S> = Chip<Psg, P, M, S>;
/// Two chips in TurboSound configuration
pub type TurboSoundChip<P, M, S> = Chip<TurboSound, P, M, S>;

/// Create a single chip
pub fn create_chip<P, M, S>(params: P, mixer: M, target: S) -> AymChip<P, M, S>
where
    P: ChipParameters,
    M: ThreeChannelsMixer,
    S: SampleSink,
{
    Chip::new(params, mixer, target)
}

/// Create a TurboSound pair
pub fn create_turbo_sound_chip<P, M, S>(params: P, mixer: M, target: S) -> TurboSoundChip<P, M, S>
where
    P: ChipParameters,
    M: ThreeChannelsMixer,
    S: SampleSink,
{
    Chip::new(params, mixer, target)
}

impl<B, P, M, S> Chip<B, P, M, S>
where
    B: PsgBackend + Default,
    P: ChipParameters,
    M: ThreeChannelsMixer,
    S: SampleSink,
{
    /// Create a chip in power-on state
    ///
    /// Parameters are read on the first [`Chip::flush`].
    pub fn new(params: P, mixer: M, target: S) -> Self {
        let config = ChipConfig::default();
        let clock = ClockSource::new(DEFAULT_CLOCK_FREQ, DEFAULT_SOUND_FREQ);
        let renderer = Renderer::new(config.interpolation, clock.psg_freq(), DEFAULT_SOUND_FREQ);
        Self {
            params,
            params_version: None,
            config,
            mixer,
            target,
            psg: B::default(),
            clock,
            renderer,
            table: VolumeTable::new(),
            analyser: AnalysisMap::new(DEFAULT_CLOCK_FREQ),
            buffer: Vec::new(),
        }
    }
}

impl<B, P, M, S> Chip<B, P, M, S>
where
    B: PsgBackend,
    P: ChipParameters,
    M: ThreeChannelsMixer,
    S: SampleSink,
{
    /// Queue register writes; nothing is rendered until [`Chip::flush`]
    ///
    /// Stamps must not decrease across calls.
    pub fn render_data(&mut self, chunk: DataChunk<B::Data>) {
        debug_assert!(
            self.buffer.last().map_or(true, |last| last.stamp <= chunk.stamp),
            "register writes out of order"
        );
        self.buffer.push(chunk);
    }

    /// Queue several register write batches
    pub fn render_batch<I>(&mut self, chunks: I)
    where
        I: IntoIterator<Item = DataChunk<B::Data>>,
    {
        for chunk in chunks {
            self.render_data(chunk);
        }
    }

    /// Render everything queued and hand the samples to the sink
    ///
    /// Renders up to the stamp of the last queued chunk, so a trailing chunk
    /// without writes marks the end of a frame.
    ///
    /// # Panics
    ///
    /// Panics if the parameters report a zero clock or sound frequency.
    pub fn flush(&mut self) {
        self.synchronize_parameters();
        if let Some(till) = self.buffer.last().map(|chunk| chunk.stamp) {
            let mut out = Chunk::with_capacity(self.clock.samples_till(till));
            self.render_chunks(&mut out);
            log::trace!("Rendered {} samples up to {:?}", out.len(), till);
            if !out.is_empty() {
                self.target.apply_data(out);
            }
        }
        self.target.flush();
    }

    /// Back to power-on; queued writes are dropped and parameters re-read
    pub fn reset(&mut self) {
        self.params_version = None;
        self.psg.reset();
        self.clock.reset();
        self.renderer.reset();
        self.buffer.clear();
    }

    /// Snapshot of the sounding sources
    pub fn get_state(&self) -> Vec<ChannelState> {
        self.psg.get_state(&self.analyser)
    }

    /// Output sink
    pub fn target(&self) -> &S {
        &self.target
    }

    /// Output sink, mutably
    pub fn target_mut(&mut self) -> &mut S {
        &mut self.target
    }

    /// Consume the chip, returning the sink
    pub fn into_target(self) -> S {
        self.target
    }

    /// Stereo mixer; changes are picked up on the next flush
    pub fn mixer_mut(&mut self) -> &mut M {
        &mut self.mixer
    }

    /// Parameter source
    pub fn params(&self) -> &P {
        &self.params
    }

    /// Sound source
    pub fn psg(&self) -> &B {
        &self.psg
    }

    /// Pick up a new parameter version and refresh the volume table
    ///
    /// Plain, mono and relaid-out output need no separate path here: the
    /// layout is baked into the table by `VolumeTable::set_parameters`,
    /// which rebuilds only when chip type, layout or mixer changed.
    fn synchronize_parameters(&mut self) {
        let version = self.params.version();
        if self.params_version != Some(version) {
            let config = self.params.snapshot();
            self.psg
                .set_duty_cycle(config.duty_cycle_value, config.duty_cycle_mask);
            if self.clock.set_frequency(config.clock_freq, config.sound_freq) {
                log::debug!(
                    "Clock {} Hz, output {} Hz",
                    config.clock_freq,
                    config.sound_freq
                );
                self.renderer
                    .set_frequency(self.clock.psg_freq(), config.sound_freq);
            }
            if self.renderer.interpolation() != config.interpolation {
                log::debug!("Switching renderer to {:?}", config.interpolation);
                self.renderer = Renderer::new(
                    config.interpolation,
                    self.clock.psg_freq(),
                    config.sound_freq,
                );
            }
            self.analyser.set_clock_rate(config.clock_freq);
            self.config = config;
            self.params_version = Some(version);
        }
        self.table
            .set_parameters(self.config.chip_type, self.config.layout, &self.mixer);
    }

    fn render_chunks(&mut self, out: &mut Chunk) {
        let mut chunks = std::mem::take(&mut self.buffer);
        for chunk in chunks.drain(..) {
            self.renderer
                .render(&mut self.psg, &mut self.clock, &self.table, chunk.stamp, out);
            self.psg.set_new_data(&chunk.data);
        }
        self.buffer = chunks;
    }
}

impl<P, M, S> Chip<Psg, P, M, S>
where
    P: ChipParameters,
    M: ThreeChannelsMixer,
    S: SampleSink,
{
    /// Queue writes given as a plain register batch
    pub fn write(&mut self, stamp: super::clock::Stamp, registers: Registers) {
        self.render_data(DataChunk::new(stamp, registers));
    }
}
