//! Low-level file primitives for record-aligned IO.
//!
//! No handle is kept between calls: each operation opens the file, positions
//! itself, does its IO and releases the handle.

use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::config::{self, RECORD_SIZE};
use crate::error::{WineError, WineResult};
use crate::types::{checked_record_index, RecordId};

/// Handle naming the backing record file.
#[derive(Clone, Debug)]
pub struct RecordFile {
    path: PathBuf,
}

impl RecordFile {
    /// Refer to a record file; nothing is opened until an operation runs.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Return the file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True if the backing file exists.
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    fn open_read(&self) -> WineResult<File> {
        File::open(&self.path).map_err(|e| WineError::io("open_read", e))
    }

    fn open_write(&self) -> WineResult<File> {
        OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(&self.path)
            .map_err(|e| WineError::io("open_write", e))
    }

    /// Return the current file length in bytes; a missing file has length 0.
    pub fn file_len(&self) -> WineResult<u64> {
        match std::fs::metadata(&self.path) {
            Ok(meta) => Ok(meta.len()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(0),
            Err(e) => Err(WineError::io("file_len", e)),
        }
    }

    /// Return the number of records in the file, ensuring alignment.
    pub fn record_count(&self) -> WineResult<u32> {
        let count = config::validate_file_len(self.file_len()?)?;
        Ok(checked_record_index(count)?.as_u32())
    }

    /// Read the whole file. The length is checked against [`RECORD_SIZE`].
    ///
    /// A missing file surfaces as [`WineError::Io`] with kind `NotFound`;
    /// callers decide whether that is tolerable.
    pub fn read_all(&self) -> WineResult<Vec<u8>> {
        let mut file = self.open_read()?;
        let mut buf = Vec::new();
        file.read_to_end(&mut buf)
            .map_err(|e| WineError::io("read_all", e))?;
        config::validate_file_len(buf.len() as u64)?;
        Ok(buf)
    }

    /// Read one record block.
    pub fn read_block(&self, id: RecordId) -> WineResult<[u8; RECORD_SIZE]> {
        let mut file = self.open_read()?;
        file.seek(SeekFrom::Start(id.offset()))
            .map_err(|e| WineError::io("seek_read", e))?;
        let mut out = [0u8; RECORD_SIZE];
        match file.read_exact(&mut out) {
            Ok(()) => Ok(out),
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => Err(WineError::corruption(
                "file.short_read",
                format!("file shorter than expected for record {}", id),
            )),
            Err(e) => Err(WineError::io("read_block", e)),
        }
    }

    /// Write one or more contiguous record blocks starting at `id`.
    ///
    /// The file is created if missing. Writing past the end extends it, so
    /// callers are responsible for bounds checks.
    pub fn write_blocks(&self, id: RecordId, data: &[u8]) -> WineResult<()> {
        if data.len() % RECORD_SIZE != 0 {
            return Err(WineError::corruption(
                "file.write_alignment",
                format!("len={} not aligned to RECORD_SIZE", data.len()),
            ));
        }
        let mut file = self.open_write()?;
        file.seek(SeekFrom::Start(id.offset()))
            .map_err(|e| WineError::io("seek_write", e))?;
        file.write_all(data)
            .map_err(|e| WineError::io("write_block", e))?;
        file.sync_data().map_err(|e| WineError::io("sync", e))
    }

    /// Shrink the file so it holds exactly `count` records.
    pub fn truncate_records(&self, count: u32) -> WineResult<()> {
        let file = self.open_write()?;
        file.set_len(RecordId(count).offset())
            .map_err(|e| WineError::io("truncate", e))?;
        file.sync_data().map_err(|e| WineError::io("sync", e))
    }
}
