//! Configuration constants for winedb.
//! These constants define the stable on-disk format and shell defaults.

use std::path::PathBuf;

use crate::error::{WineError, WineResult};

/// Width of each text field in 16-bit code units.
pub const FIELD_UNITS: usize = 15;

/// Bytes occupied by one text field on disk.
pub const FIELD_BYTES: usize = FIELD_UNITS * 2;

/// Size of one encoded record in bytes.
pub const RECORD_SIZE: usize = 4 + FIELD_BYTES + FIELD_BYTES + 4 + 4 + 8;

/// Same as [`RECORD_SIZE`], for offset arithmetic.
pub const RECORD_SIZE_U64: u64 = RECORD_SIZE as u64;

const _: () = assert!(RECORD_SIZE == 80);

/// Padding unit used to fill short text fields.
pub const PAD_UNIT: u16 = b' ' as u16;

/// Earliest accepted vintage.
pub const MIN_YEAR: i32 = 1980;

/// Default name of the record file.
pub const DATA_FILE_NAME: &str = "wines.dat";

/// Default name of the plain-text help file.
pub const HELP_FILE_NAME: &str = "readme.txt";

/// Default directory holding the data and help files.
pub const RESOURCE_DIR: &str = "res";

/// Validate that a file length holds a whole number of records.
///
/// Returns the record count, or [`WineError::Corruption`] when the length is
/// not a multiple of [`RECORD_SIZE`].
pub fn validate_file_len(len: u64) -> WineResult<u64> {
    if len % RECORD_SIZE_U64 != 0 {
        return Err(WineError::corruption(
            "file.len_alignment",
            format!("len={} not aligned to RECORD_SIZE", len),
        ));
    }
    Ok(len / RECORD_SIZE_U64)
}

/// Paths used by the terminal shell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShellConfig {
    pub data_path: PathBuf,
    pub help_path: PathBuf,
}

impl ShellConfig {
    /// Build a config rooted at the given resource directory.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        Self {
            data_path: dir.join(DATA_FILE_NAME),
            help_path: dir.join(HELP_FILE_NAME),
        }
    }
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self::in_dir(RESOURCE_DIR)
    }
}
