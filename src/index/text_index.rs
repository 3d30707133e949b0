//! The compressed full-text index the record engine queries.
//!
//! The engine only needs five primitives from the underlying index; anything
//! that can answer them (a plain suffix array, an FM-index, a remote shard)
//! can sit behind [`TextIndex`].

use super::types::{SaRange, TextPosition};
use crate::error::Result;
use std::collections::BTreeMap;

pub trait TextIndex: Send + Sync {
    /// Return exactly `len` bytes of original text starting at `offset`
    fn extract(&self, offset: TextPosition, len: usize) -> Result<Vec<u8>>;

    /// Inclusive suffix-array range of all suffixes starting with `pattern`
    fn get_range(&self, pattern: &[u8]) -> SaRange;

    /// Text position of the suffix at suffix-array index `index`
    fn lookup_sa(&self, index: u64) -> TextPosition;

    /// Start position → match length of every regex match in the text
    fn regex_search(&self, pattern: &str) -> Result<BTreeMap<TextPosition, usize>>;

    /// Total length of the original text
    fn original_size(&self) -> u64;
}

impl<T: TextIndex + ?Sized> TextIndex for std::sync::Arc<T> {
    fn extract(&self, offset: TextPosition, len: usize) -> Result<Vec<u8>> {
        (**self).extract(offset, len)
    }

    fn get_range(&self, pattern: &[u8]) -> SaRange {
        (**self).get_range(pattern)
    }

    fn lookup_sa(&self, index: u64) -> TextPosition {
        (**self).lookup_sa(index)
    }

    fn regex_search(&self, pattern: &str) -> Result<BTreeMap<TextPosition, usize>> {
        (**self).regex_search(pattern)
    }

    fn original_size(&self) -> u64 {
        (**self).original_size()
    }
}
