//! Positional record store: an in-memory list kept in lockstep with the file.
//!
//! List index `i` always corresponds to file offset `i * RECORD_SIZE`, and the
//! in-memory list is only changed after the matching file write succeeded.
//! Records are kept as they read back from disk, so truncated text fields
//! show up truncated in the list too.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::config::RECORD_SIZE;
use crate::error::{WineError, WineResult};
use crate::file::RecordFile;
use crate::record::{decode_record, encode_record, WineDraft, WineRecord};
use crate::types::{checked_record_index, RecordId};

/// Read every record from `path` in file order.
///
/// A missing file is an empty store; any other I/O failure is returned.
pub fn load_all(path: impl AsRef<Path>) -> WineResult<Vec<WineRecord>> {
    read_records(&RecordFile::new(path.as_ref()))
}

fn read_records(file: &RecordFile) -> WineResult<Vec<WineRecord>> {
    let bytes = match file.read_all() {
        Ok(bytes) => bytes,
        Err(WineError::Io { source, .. }) if source.kind() == ErrorKind::NotFound => {
            tracing::warn!(path = %file.path().display(), "record file not found, starting empty");
            return Ok(Vec::new());
        }
        Err(e) => return Err(e),
    };

    let mut records = Vec::with_capacity(bytes.len() / RECORD_SIZE);
    for (idx, block) in bytes.chunks_exact(RECORD_SIZE).enumerate() {
        let record = decode_record(block)?;
        if record.id.index() != idx {
            return Err(WineError::corruption(
                "store.id_mismatch",
                format!("block {} holds id {}", idx, record.id),
            ));
        }
        records.push(record);
    }
    tracing::debug!(path = %file.path().display(), count = records.len(), "loaded records");
    Ok(records)
}

/// Record store bound to one backing file.
#[derive(Debug)]
pub struct RecordStore {
    file: RecordFile,
    records: Vec<WineRecord>,
}

impl RecordStore {
    /// Open the store at `path` and load its records.
    ///
    /// # Errors
    /// - [`WineError::Io`] if the file exists but cannot be read.
    /// - [`WineError::Corruption`] if the contents are not a valid record file.
    pub fn open(path: impl Into<PathBuf>) -> WineResult<Self> {
        let mut store = Self::empty(path);
        store.load_all()?;
        Ok(store)
    }

    /// Bind to `path` without reading it; the list starts empty.
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            file: RecordFile::new(path),
            records: Vec::new(),
        }
    }

    /// Re-read the whole file, replacing the in-memory list.
    pub fn load_all(&mut self) -> WineResult<&[WineRecord]> {
        self.records = read_records(&self.file)?;
        Ok(&self.records)
    }

    /// Records in id order, as last loaded or mutated.
    pub fn records(&self) -> &[WineRecord] {
        &self.records
    }

    /// Look up a record by id.
    pub fn get(&self, id: RecordId) -> Option<&WineRecord> {
        self.records.get(id.index())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Return the backing file path.
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    fn len_u32(&self) -> u32 {
        self.records.len() as u32
    }

    fn check_id(&self, id: RecordId) -> WineResult<()> {
        if id.index() >= self.records.len() {
            return Err(WineError::OutOfRange {
                id: id.as_u32(),
                len: self.len_u32(),
            });
        }
        Ok(())
    }

    /// Fail unless the file still holds exactly `expected` records.
    fn ensure_file_holds(&self, expected: usize) -> WineResult<u32> {
        let on_disk = self.file.record_count()?;
        if on_disk as usize != expected {
            return Err(WineError::corruption(
                "store.lockstep",
                format!("file holds {} records, list holds {}", on_disk, expected),
            ));
        }
        Ok(on_disk)
    }

    /// Append a record at the end of the file, assigning it the next id.
    ///
    /// # Errors
    /// - [`WineError::Corruption`] if the file no longer matches the list.
    /// - [`WineError::Io`] if the write fails; the list is left unchanged.
    pub fn append(&mut self, draft: WineDraft) -> WineResult<WineRecord> {
        let on_disk = self.ensure_file_holds(self.records.len())?;
        let id = checked_record_index(u64::from(on_disk))?;
        let bytes = encode_record(&WineRecord::from_draft(id, draft))?;
        let record = decode_record(&bytes)?;
        self.file.write_blocks(id, &bytes)?;
        tracing::info!(id = %id, estate = %record.estate, "appended record");
        self.records.push(record.clone());
        Ok(record)
    }

    /// Overwrite the record at `id` in place.
    ///
    /// # Errors
    /// - [`WineError::OutOfRange`] if `id` does not name an existing record.
    /// - [`WineError::Corruption`] if the file no longer matches the list.
    /// - [`WineError::Io`] if the write fails; the list is left unchanged.
    pub fn update(&mut self, id: RecordId, draft: WineDraft) -> WineResult<WineRecord> {
        self.check_id(id)?;
        self.ensure_file_holds(self.records.len())?;
        let bytes = encode_record(&WineRecord::from_draft(id, draft))?;
        let record = decode_record(&bytes)?;
        self.file.write_blocks(id, &bytes)?;
        tracing::info!(id = %id, "updated record");
        self.records[id.index()] = record.clone();
        Ok(record)
    }

    /// Remove the final record by shrinking the file one record length.
    ///
    /// # Errors
    /// - [`WineError::EmptyStore`] if there is nothing to delete.
    /// - [`WineError::Corruption`] if the file no longer matches the list.
    /// - [`WineError::Io`] if the truncate fails; the list is left unchanged.
    pub fn delete_last(&mut self) -> WineResult<WineRecord> {
        let Some(last) = self.records.pop() else {
            return Err(WineError::EmptyStore);
        };
        let truncated = self
            .ensure_file_holds(self.records.len() + 1)
            .and_then(|_| self.file.truncate_records(last.id.as_u32()));
        if let Err(e) = truncated {
            self.records.push(last);
            return Err(e);
        }
        tracing::info!(id = %last.id, "deleted last record");
        Ok(last)
    }

    /// Remove the record at `id`, shifting every later record down one slot.
    ///
    /// Shifted records are renumbered so ids keep matching their offsets.
    /// Removing the final record is the same as [`RecordStore::delete_last`].
    ///
    /// Compaction takes two file operations: the shifted tail is rewritten
    /// first, then the file is cut by one record. If the rewrite fails the
    /// file is unchanged. If only the cut fails, the file already holds the
    /// shifted tail followed by the old last record a second time, so its
    /// contents no longer match the list; [`RecordStore::load_all`] brings
    /// the list back in line. The list is left unchanged in both cases.
    ///
    /// # Errors
    /// - [`WineError::OutOfRange`] if `id` does not name an existing record.
    /// - [`WineError::Corruption`] if the file no longer matches the list.
    /// - [`WineError::Io`] if either file operation fails.
    pub fn remove(&mut self, id: RecordId) -> WineResult<WineRecord> {
        self.check_id(id)?;
        if id.index() + 1 == self.records.len() {
            return self.delete_last();
        }
        self.ensure_file_holds(self.records.len())?;

        let mut shifted = Vec::with_capacity(self.records.len() - id.index() - 1);
        for (slot, record) in self.records[id.index() + 1..].iter().enumerate() {
            let mut moved = record.clone();
            moved.id = RecordId(id.as_u32() + slot as u32);
            shifted.push(moved);
        }
        let mut bytes = Vec::with_capacity(shifted.len() * RECORD_SIZE);
        for record in &shifted {
            bytes.extend_from_slice(&encode_record(record)?);
        }

        self.file.write_blocks(id, &bytes)?;
        self.file.truncate_records(self.len_u32() - 1)?;
        tracing::info!(id = %id, shifted = shifted.len(), "removed record");

        let removed = self.records[id.index()].clone();
        self.records.truncate(id.index());
        self.records.extend(shifted);
        Ok(removed)
    }
}
