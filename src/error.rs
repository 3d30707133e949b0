//! Error types for record index operations.

use thiserror::Error;

/// Error variants surfaced by the bitmap, offset index and query engine.
#[derive(Debug, Error)]
pub enum Error {
    /// A bit address, field or record id fell outside the valid bounds.
    #[error("out of range: {what} {index} (limit {limit})")]
    OutOfRange {
        /// What kind of address was rejected ("bit", "record", ...).
        what: &'static str,
        /// The offending address.
        index: i64,
        /// The exclusive upper bound that was violated.
        limit: u64,
    },

    /// A value written into a bit-packed field needs more bits than the field has.
    #[error("value {value} does not fit in {bits} bits")]
    ValueTooWide {
        /// The value that was written.
        value: u64,
        /// Width of the destination field.
        bits: u32,
    },

    /// A malformed query or build request.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The regex collaborator rejected a pattern.
    #[error("regex error: {0}")]
    Regex(#[from] regex::Error),

    /// An on-disk index file failed validation.
    #[error("invalid index format: {0}")]
    InvalidFormat(String),

    /// An I/O error occurred while reading or writing index files.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Index metadata could not be (de)serialized.
    #[error("metadata error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn out_of_range(what: &'static str, index: impl TryInto<i64>, limit: u64) -> Self {
        Error::OutOfRange {
            what,
            index: index.try_into().unwrap_or(i64::MAX),
            limit,
        }
    }
}

/// A specialized Result type for record index operations.
pub type Result<T> = std::result::Result<T, Error>;
