//! Unified error model for winedb operations.

use thiserror::Error;

/// Result alias that uses the crate-wide [`WineError`] type.
pub type WineResult<T> = Result<T, WineError>;

/// Errors surfaced by the record codec and store.
#[derive(Debug, Error)]
pub enum WineError {
    /// A field failed its range check; nothing was written.
    #[error("invalid {field}: {details}")]
    Validation {
        field: &'static str,
        details: String,
    },
    /// I/O failure during the given action.
    #[error("I/O error during {action}: {source}")]
    Io {
        action: &'static str,
        #[source]
        source: std::io::Error,
    },
    /// Delete requested on a store with no records.
    #[error("store is empty, nothing to delete")]
    EmptyStore,
    /// Record id does not address an existing record.
    #[error("record id {id} out of range for store of {len} records")]
    OutOfRange { id: u32, len: u32 },
    /// A text field exceeds its fixed width and truncation was refused.
    #[error("field {field} is {units} units, maximum is {max}")]
    FieldTooLong {
        field: &'static str,
        units: usize,
        max: usize,
    },
    /// Bytes read from disk do not form a valid record file.
    #[error("corruption detected in {context}: {details}")]
    Corruption {
        context: &'static str,
        details: String,
    },
    /// An arithmetic or range overflow occurred.
    #[error("overflow: {context}")]
    Overflow { context: &'static str },
}

impl WineError {
    /// Helper for wrapping std::io::Error.
    pub fn io(action: &'static str, e: std::io::Error) -> Self {
        Self::Io { action, source: e }
    }

    /// Helper for constructing corruption errors with context.
    pub fn corruption(context: &'static str, details: impl Into<String>) -> Self {
        Self::Corruption {
            context,
            details: details.into(),
        }
    }

    /// Helper for validation errors.
    pub fn validation(field: &'static str, details: impl Into<String>) -> Self {
        Self::Validation {
            field,
            details: details.into(),
        }
    }

    /// True for errors caused by caller input rather than the file.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            WineError::Validation { .. } | WineError::FieldTooLong { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn io_error_exposes_source() {
        let err = WineError::io(
            "read_block",
            std::io::Error::new(std::io::ErrorKind::Other, "disk gone"),
        );
        assert!(err.source().is_some());
        assert_eq!(err.to_string(), "I/O error during read_block: disk gone");
    }

    #[test]
    fn input_errors_are_classified() {
        assert!(WineError::validation("year", "1979").is_input_error());
        assert!(!WineError::EmptyStore.is_input_error());
        assert!(!WineError::OutOfRange { id: 3, len: 2 }.is_input_error());
    }

    #[test]
    fn out_of_range_message_names_both_bounds() {
        let msg = WineError::OutOfRange { id: 7, len: 2 }.to_string();
        assert!(msg.contains('7') && msg.contains('2'));
    }
}
