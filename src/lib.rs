pub mod config;
pub mod encoding;
pub mod error;
pub mod file;
pub mod record;
pub mod shell;
pub mod store;
pub mod types;

pub use error::{WineError, WineResult};
pub use record::{decode_record, encode_record, encode_record_strict, WineDraft, WineRecord};
pub use store::{load_all, RecordStore};
pub use types::RecordId;

use std::path::Path;

/// Open the record store at `path`, loading every record.
///
/// Stable API: part of the supported surface.
/// # Errors
/// - [`WineError::Validation`] if the path is empty or names a directory.
/// - [`WineError::Io`] if the file exists but cannot be read.
/// - [`WineError::Corruption`] if the file is not a whole number of valid records.
pub fn open(path: impl AsRef<Path>) -> WineResult<RecordStore> {
    let path = path.as_ref();
    validate_path(path)?;
    RecordStore::open(path)
}

/// Validate caller-provided path arguments.
fn validate_path(path: &Path) -> WineResult<()> {
    if path.as_os_str().is_empty() {
        return Err(WineError::validation("path", "path must not be empty"));
    }
    if path.is_dir() {
        return Err(WineError::validation(
            "path",
            format!("{} is a directory", path.display()),
        ));
    }
    Ok(())
}
