//! WAV file sink

use super::{Chunk, SampleSink};
use crate::{AymError, Result};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Writes rendered audio as 16-bit stereo PCM
///
/// Sinks cannot report errors from `apply_data`, so the first write error is
/// kept and returned by [`WavSink::finalize`]; later chunks are dropped.
pub struct WavSink {
    writer: Option<hound::WavWriter<BufWriter<File>>>,
    error: Option<hound::Error>,
    samples_written: u64,
}

impl WavSink {
    /// Create the output file
    ///
    /// # Arguments
    ///
    /// * `path` - Destination file
    /// * `sample_rate` - Rate the chip renders at
    pub fn create<P: AsRef<Path>>(path: P, sample_rate: u32) -> Result<Self> {
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let writer = hound::WavWriter::create(path.as_ref(), spec).map_err(|e| {
            AymError::AudioFileError(format!("{}: {}", path.as_ref().display(), e))
        })?;
        Ok(Self {
            writer: Some(writer),
            error: None,
            samples_written: 0,
        })
    }

    /// Stereo frames written so far
    pub fn samples_written(&self) -> u64 {
        self.samples_written
    }

    /// Patch the header and close the file
    pub fn finalize(mut self) -> Result<()> {
        if let Some(err) = self.error.take() {
            return Err(AymError::AudioFileError(err.to_string()));
        }
        match self.writer.take() {
            Some(writer) => writer
                .finalize()
                .map_err(|e| AymError::AudioFileError(e.to_string())),
            None => Ok(()),
        }
    }
}

impl SampleSink for WavSink {
    fn apply_data(&mut self, chunk: Chunk) {
        if self.error.is_some() {
            return;
        }
        let Some(writer) = self.writer.as_mut() else {
            return;
        };
        for sample in &chunk {
            let written = writer
                .write_sample(sample.left)
                .and_then(|_| writer.write_sample(sample.right));
            if let Err(err) = written {
                log::warn!("WAV write failed, dropping further output: {}", err);
                self.error = Some(err);
                return;
            }
            self.samples_written += 1;
        }
    }

    fn flush(&mut self) {
        if let Some(writer) = self.writer.as_mut() {
            if let Err(err) = writer.flush() {
                self.error.get_or_insert(err);
            }
        }
    }
}
