//! Record index builder
//!
//! Builds a record index from a sequence of records by:
//! 1. Concatenating every record followed by the delimiter, then one end-of-text byte
//! 2. Recording each record's start offset
//! 3. Building a sorted suffix array using parallel sort
//!
//! With records `["cat", "dog"]` and the default delimiter the text is
//! `"cat\ndog\n\0"`, offsets are `[0, 4]` and the original size is 9.

use super::reader::SuffixArrayIndex;
use super::types::*;
use crate::error::{Error, Result};
use crate::index::offsets::OffsetIndex;
use crate::index::types::{IndexConfig, IndexMeta, RecordId, TextPosition, END_OF_TEXT};
use crate::query::RecordIndex;
use rayon::prelude::*;
use tracing::{debug, info};

/// Builder for constructing a record index
pub struct RecordIndexBuilder {
    config: IndexConfig,
    /// Concatenated text, without the end-of-text byte
    text: Vec<u8>,
    /// Start offset of each record
    offsets: Vec<TextPosition>,
}

impl RecordIndexBuilder {
    pub fn new(config: IndexConfig) -> Self {
        Self {
            config,
            text: Vec::new(),
            offsets: Vec::new(),
        }
    }

    /// Create a builder with default configuration
    pub fn with_defaults() -> Self {
        Self::new(IndexConfig::default())
    }

    /// Append one record and return its id.
    ///
    /// Fails with `InvalidArgument` if the record is larger than the configured
    /// limit or contains the delimiter byte.
    pub fn add_record(&mut self, record: &[u8]) -> Result<RecordId> {
        if record.len() as u64 > self.config.max_record_size {
            return Err(Error::InvalidArgument(format!(
                "record of {} bytes exceeds max_record_size {}",
                record.len(),
                self.config.max_record_size
            )));
        }
        if let Some(at) = memchr::memchr(self.config.delimiter, record) {
            return Err(Error::InvalidArgument(format!(
                "record contains the delimiter byte at {}",
                at
            )));
        }
        if self.offsets.len() >= RecordId::MAX as usize {
            return Err(Error::InvalidArgument("too many records".to_string()));
        }

        let id = self.offsets.len() as RecordId;
        self.offsets.push(self.text.len() as TextPosition);
        self.text.extend_from_slice(record);
        self.text.push(self.config.delimiter);

        Ok(id)
    }

    /// Split `input` on the delimiter and add every piece as a record.
    ///
    /// A trailing delimiter does not start an extra empty record. Returns the
    /// number of records added.
    pub fn add_delimited(&mut self, input: &[u8]) -> Result<usize> {
        let mut start = 0;
        let mut added = 0;

        for end in memchr::memchr_iter(self.config.delimiter, input) {
            self.add_record(&input[start..end])?;
            start = end + 1;
            added += 1;
        }
        if start < input.len() {
            self.add_record(&input[start..])?;
            added += 1;
        }

        Ok(added)
    }

    /// Get the current size of accumulated text
    pub fn text_size(&self) -> usize {
        self.text.len()
    }

    /// Get the number of records added
    pub fn record_count(&self) -> usize {
        self.offsets.len()
    }

    /// Build the suffix array over the accumulated records
    pub fn build(self) -> Result<BuiltIndex> {
        let mut text = self.text;
        text.push(END_OF_TEXT);

        debug!(
            records = self.offsets.len(),
            text_size = text.len(),
            "sorting suffixes"
        );
        let suffix_array = build_suffix_array(&text, self.config.parallel_sort_threshold);
        let offsets = OffsetIndex::new(self.offsets)?;

        info!(
            records = offsets.num_records(),
            text_size = text.len(),
            "built record index"
        );

        Ok(BuiltIndex {
            text,
            suffix_array,
            offsets,
            config: self.config,
        })
    }
}

/// Result of building a record index, ready to query or write
pub struct BuiltIndex {
    /// Concatenated record text including delimiters and end-of-text
    pub text: Vec<u8>,
    /// Sorted suffix array (positions into text)
    pub suffix_array: Vec<SuffixEntry>,
    /// Record start offsets
    pub offsets: OffsetIndex,
    /// Configuration used for building
    pub config: IndexConfig,
}

impl BuiltIndex {
    pub fn meta(&self) -> IndexMeta {
        IndexMeta {
            version: FORMAT_VERSION,
            config: self.config.clone(),
            record_count: self.offsets.num_records() as u64,
            text_size: self.text.len() as u64,
            suffix_count: self.suffix_array.len() as u64,
        }
    }

    /// Turn into a queryable in-memory index
    pub fn into_record_index(self) -> RecordIndex<SuffixArrayIndex> {
        let text = SuffixArrayIndex::from_parts(self.text, self.suffix_array);
        RecordIndex::new(text, self.offsets)
    }
}

/// Build a suffix array by sorting all suffix positions.
///
/// Time: O(n log n) comparisons, each a full byte comparison of two suffixes.
/// Texts larger than `parallel_threshold` are sorted on the rayon pool.
pub(crate) fn build_suffix_array(text: &[u8], parallel_threshold: usize) -> Vec<SuffixEntry> {
    let n = text.len();
    let mut sa: Vec<SuffixEntry> = (0..n as SuffixEntry).collect();

    if n > parallel_threshold {
        sa.par_sort_unstable_by(|&a, &b| compare_suffixes(text, a as usize, b as usize));
    } else {
        sa.sort_unstable_by(|&a, &b| compare_suffixes(text, a as usize, b as usize));
    }

    sa
}

/// Compare two suffixes lexicographically.
///
/// Distinct suffixes of one text differ in length, so this is a total order
/// without a tie-break.
#[inline]
fn compare_suffixes(text: &[u8], a: usize, b: usize) -> std::cmp::Ordering {
    text[a..].cmp(&text[b..])
}
