//! Console log sources.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::PathBuf;

use anyhow::{Context, Result};

/// Port for reading a console log incrementally.
pub trait LogSource {
    /// Return the bytes available from `offset` onward together with the
    /// offset to resume from. Returned offsets never go backwards; a source
    /// with nothing new returns an empty chunk and the same offset.
    fn read_from(&mut self, offset: u64) -> Result<(Vec<u8>, u64)>;
}

/// Log source backed by a file on disk.
///
/// The file is opened fresh on every read, so a log that is still being
/// appended to is picked up chunk by chunk, and a missing log surfaces as a
/// read failure on the first poll rather than a setup error.
pub struct FileLogSource {
    path: PathBuf,
}

impl FileLogSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl LogSource for FileLogSource {
    fn read_from(&mut self, offset: u64) -> Result<(Vec<u8>, u64)> {
        let mut file = File::open(&self.path)
            .with_context(|| format!("Failed to open log file {}", self.path.display()))?;
        file.seek(SeekFrom::Start(offset))
            .with_context(|| format!("Failed to seek in {}", self.path.display()))?;
        let mut buf = Vec::new();
        file.read_to_end(&mut buf)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        let next = offset + buf.len() as u64;
        Ok((buf, next))
    }
}
