//! CSV register dumps
//!
//! One row per batch of writes:
//!
//! ```text
//! time_us,r0,r1,r2,r3,r4,r5,r6,r7,r8,r9,r10,r11,r12,r13,beeper
//! 0,28,1,,,,,,62,15,,,,,,
//! 20000,,,,,,,,,,,,,,,
//! ```
//!
//! Empty cells are registers left untouched by that row. The `beeper`
//! column is optional. Timestamps are microseconds and must not decrease.

use crate::aym::{DataChunk, Register, Registers, Stamp};
use crate::{AymError, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

#[derive(Debug, Default, Deserialize, Serialize)]
struct DumpRow {
    time_us: u64,
    r0: Option<u8>,
    r1: Option<u8>,
    r2: Option<u8>,
    r3: Option<u8>,
    r4: Option<u8>,
    r5: Option<u8>,
    r6: Option<u8>,
    r7: Option<u8>,
    r8: Option<u8>,
    r9: Option<u8>,
    r10: Option<u8>,
    r11: Option<u8>,
    r12: Option<u8>,
    r13: Option<u8>,
    #[serde(default)]
    beeper: Option<u8>,
}

impl DumpRow {
    fn cells(&self) -> [Option<u8>; 15] {
        [
            self.r0, self.r1, self.r2, self.r3, self.r4, self.r5, self.r6, self.r7, self.r8,
            self.r9, self.r10, self.r11, self.r12, self.r13, self.beeper,
        ]
    }

    fn from_chunk(chunk: &DataChunk) -> Self {
        let cell = |reg: Register| chunk.data.has(reg).then(|| chunk.data.get(reg));
        Self {
            time_us: chunk.stamp.nanos() / 1_000,
            r0: cell(Register::ToneALo),
            r1: cell(Register::ToneAHi),
            r2: cell(Register::ToneBLo),
            r3: cell(Register::ToneBHi),
            r4: cell(Register::ToneCLo),
            r5: cell(Register::ToneCHi),
            r6: cell(Register::Noise),
            r7: cell(Register::Mixer),
            r8: cell(Register::VolumeA),
            r9: cell(Register::VolumeB),
            r10: cell(Register::VolumeC),
            r11: cell(Register::EnvelopeLo),
            r12: cell(Register::EnvelopeHi),
            r13: cell(Register::EnvelopeShape),
            beeper: cell(Register::Beeper),
        }
    }

    fn into_chunk(self) -> DataChunk {
        let mut data = Registers::new();
        for (reg, value) in Register::ALL.iter().zip(self.cells()) {
            if let Some(value) = value {
                data.set(*reg, value);
            }
        }
        DataChunk::new(Stamp::from_micros(self.time_us), data)
    }
}

fn dump_error(err: csv::Error) -> AymError {
    AymError::DumpError(err.to_string())
}

/// Parse a register dump
pub fn read_dump<R: Read>(reader: R) -> Result<Vec<DataChunk>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut chunks: Vec<DataChunk> = Vec::new();
    for (line, row) in reader.deserialize::<DumpRow>().enumerate() {
        let chunk = row.map_err(dump_error)?.into_chunk();
        if let Some(last) = chunks.last() {
            if chunk.stamp < last.stamp {
                return Err(AymError::DumpError(format!(
                    "row {}: time {} us goes backwards",
                    line + 1,
                    chunk.stamp.nanos() / 1_000
                )));
            }
        }
        chunks.push(chunk);
    }
    log::debug!("Read {} register rows", chunks.len());
    Ok(chunks)
}

/// Load a register dump from a file
pub fn load_dump<P: AsRef<Path>>(path: P) -> Result<Vec<DataChunk>> {
    read_dump(File::open(path)?)
}

/// Write chunks as a register dump, including the beeper column
///
/// Stamps are truncated to whole microseconds.
pub fn write_dump<W: Write>(writer: W, chunks: &[DataChunk]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    for chunk in chunks {
        writer
            .serialize(DumpRow::from_chunk(chunk))
            .map_err(dump_error)?;
    }
    writer.flush()?;
    Ok(())
}
