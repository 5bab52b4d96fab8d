//! Strongly-typed record identifier.

use crate::config::RECORD_SIZE_U64;
use crate::error::{WineError, WineResult};

/// Positional record identifier; doubles as the block index in the file.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct RecordId(pub u32);

impl RecordId {
    /// Create a new record identifier from a u32.
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Access the raw numeric value.
    pub const fn as_u32(self) -> u32 {
        self.0
    }

    /// Position of this record in the in-memory list.
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Byte offset of this record in the file.
    pub const fn offset(self) -> u64 {
        self.0 as u64 * RECORD_SIZE_U64
    }

    /// Value written to the 32-bit signed id slot on disk.
    pub fn to_disk(self) -> WineResult<i32> {
        i32::try_from(self.0).map_err(|_| WineError::Overflow {
            context: "record id exceeds i32::MAX",
        })
    }

    /// Interpret a 32-bit signed id read from disk.
    pub fn from_disk(raw: i32) -> WineResult<Self> {
        u32::try_from(raw)
            .map(Self)
            .map_err(|_| WineError::corruption("record.id", format!("negative id {}", raw)))
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

/// Convert a record count or index into a `RecordId`, reporting overflow
/// explicitly. Ids must also fit the signed on-disk slot.
pub fn checked_record_index(i: u64) -> WineResult<RecordId> {
    if i <= i32::MAX as u64 {
        Ok(RecordId(i as u32))
    } else {
        Err(WineError::Overflow {
            context: "record index exceeds i32::MAX",
        })
    }
}
