use serde::{Deserialize, Serialize};

/// Identifier of a logical record (its position in the offsets array)
pub type RecordId = u32;

/// Position in the concatenated text
pub type TextPosition = u64;

/// Default byte separating records in the concatenated text
pub const DEFAULT_DELIMITER: u8 = b'\n';

/// Byte appended once after the last record's delimiter
pub const END_OF_TEXT: u8 = 0x00;

/// Inclusive interval `[first, last]` of suffix-array indices.
///
/// All suffixes inside the interval share a common prefix (the pattern the
/// range was resolved for). The range is empty iff `last < first`, which is
/// why both ends are signed: an empty range at index 0 is `(0, -1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SaRange {
    pub first: i64,
    pub last: i64,
}

impl SaRange {
    pub fn new(first: i64, last: i64) -> Self {
        Self { first, last }
    }

    /// Build from a half-open `[lo, hi)` interval as produced by bound searches
    pub fn from_bounds(lo: u64, hi: u64) -> Self {
        Self {
            first: lo as i64,
            last: hi as i64 - 1,
        }
    }

    /// Join the start of `begin` with the end of `end` into one interval.
    ///
    /// Relies on suffix-array order: everything lexicographically between the
    /// two patterns occupies a single contiguous block.
    pub fn span(begin: SaRange, end: SaRange) -> Self {
        Self {
            first: begin.first,
            last: end.last,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.last < self.first
    }

    /// Number of suffix-array entries covered
    pub fn len(&self) -> u64 {
        if self.is_empty() {
            0
        } else {
            (self.last - self.first + 1) as u64
        }
    }

    /// Iterate the suffix-array indices covered by this range
    pub fn indices(&self) -> std::ops::Range<u64> {
        if self.is_empty() {
            0..0
        } else {
            self.first as u64..self.last as u64 + 1
        }
    }
}

/// Configuration for building a record index
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IndexConfig {
    /// Byte separating records (default: `\n`)
    pub delimiter: u8,
    /// Largest record accepted by the builder, in bytes (default: 16MB)
    pub max_record_size: u64,
    /// Text size above which suffixes are sorted on the rayon pool
    pub parallel_sort_threshold: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER,
            max_record_size: 16 * 1024 * 1024,
            parallel_sort_threshold: 100_000,
        }
    }
}

/// Index metadata stored in meta.json
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexMeta {
    /// On-disk format version
    pub version: u32,
    /// Configuration the index was built with
    pub config: IndexConfig,
    /// Number of records
    pub record_count: u64,
    /// Size of the concatenated text, including delimiters and end-of-text
    pub text_size: u64,
    /// Number of suffix-array entries (equals text_size)
    pub suffix_count: u64,
}
