use crate::error::{Error, Result};
use crate::index::offsets::OffsetIndex;
use crate::index::text_index::TextIndex;
use crate::index::types::{RecordId, SaRange, TextPosition};
use rayon::prelude::*;
use roaring::RoaringBitmap;
use tracing::debug;

/// Record-level queries over a full-text index.
///
/// Immutable once constructed: every query takes `&self`, so one instance can
/// be shared across threads (e.g. behind an `Arc`) without locking.
pub struct RecordIndex<T> {
    text: T,
    offsets: OffsetIndex,
}

impl<T: TextIndex> RecordIndex<T> {
    pub fn new(text: T, offsets: OffsetIndex) -> Self {
        Self { text, offsets }
    }

    /// The underlying full-text index
    pub fn text_index(&self) -> &T {
        &self.text
    }

    pub fn offsets(&self) -> &OffsetIndex {
        &self.offsets
    }

    pub fn num_records(&self) -> usize {
        self.offsets.num_records()
    }

    /// Record containing text position `pos`
    pub fn search_offset(&self, pos: TextPosition) -> Option<RecordId> {
        self.offsets.search_offset(pos)
    }

    /// Payload of record `id`, without its trailing delimiter.
    ///
    /// Takes a signed id so callers holding a "no record" sentinel get
    /// `OutOfRange` rather than a wrapped index.
    pub fn get_record(&self, id: i64) -> Result<Vec<u8>> {
        let n = self.offsets.num_records();
        if id < 0 || id as u64 >= n as u64 {
            return Err(Error::out_of_range("record", id, n as u64));
        }
        self.record(id as RecordId)
    }

    pub(crate) fn record(&self, id: RecordId) -> Result<Vec<u8>> {
        let begin = self
            .offsets
            .get(id)
            .ok_or_else(|| Error::out_of_range("record", id, self.num_records() as u64))?;
        // The last record runs up to the end-of-text byte
        let end = match self.offsets.get(id + 1) {
            Some(next) => next,
            None => self.text.original_size().saturating_sub(1),
        };
        let len = end.saturating_sub(begin).saturating_sub(1);
        self.text.extract(begin, len as usize)
    }

    /// Record owning the suffix at suffix-array index `index`
    #[inline]
    pub(crate) fn resolve(&self, index: u64) -> Option<RecordId> {
        self.offsets.search_offset(self.text.lookup_sa(index))
    }

    /// Record ids for every suffix in `range`, in suffix-array order, with repeats
    pub(crate) fn scan(&self, range: SaRange) -> impl Iterator<Item = RecordId> + '_ {
        range.indices().filter_map(move |i| self.resolve(i))
    }

    /// Range covering every suffix lexicographically between `begin` and `end`
    pub fn range_between(&self, begin: &[u8], end: &[u8]) -> SaRange {
        SaRange::span(self.text.get_range(begin), self.text.get_range(end))
    }

    /// Distinct ids of records containing `pattern`
    pub fn record_search_ids(&self, pattern: &[u8]) -> RoaringBitmap {
        let range = self.text.get_range(pattern);
        let ids: RoaringBitmap = self.scan(range).collect();
        debug!(
            pattern = %String::from_utf8_lossy(pattern),
            hits = range.len(),
            records = ids.len(),
            "record search ids"
        );
        ids
    }

    /// Number of records containing `pattern`
    pub fn record_count(&self, pattern: &[u8]) -> u64 {
        self.record_search_ids(pattern).len()
    }

    /// Records containing `pattern`, each emitted once.
    ///
    /// Order is first encounter while walking the suffix-array range, which
    /// is neither record order nor text order.
    pub fn record_search(&self, pattern: &[u8]) -> Result<Vec<Vec<u8>>> {
        let range = self.text.get_range(pattern);
        debug!(
            pattern = %String::from_utf8_lossy(pattern),
            hits = range.len(),
            "record search"
        );
        self.collect_records(range)
    }

    /// Records containing any string lexicographically between `begin` and `end`
    pub fn record_range_search(&self, begin: &[u8], end: &[u8]) -> Result<Vec<Vec<u8>>> {
        let range = self.range_between(begin, end);
        debug!(
            begin = %String::from_utf8_lossy(begin),
            end = %String::from_utf8_lossy(end),
            hits = range.len(),
            "record range search"
        );
        self.collect_records(range)
    }

    /// Records containing a match of the regex `pattern`, each emitted once
    /// in match-position order
    pub fn record_search_regex(&self, pattern: &str) -> Result<Vec<Vec<u8>>> {
        let matches = self.text.regex_search(pattern)?;
        debug!(pattern, matches = matches.len(), "record regex search");

        let mut seen = RoaringBitmap::new();
        let mut records = Vec::new();
        for &pos in matches.keys() {
            if let Some(id) = self.offsets.search_offset(pos) {
                if seen.insert(id) {
                    records.push(self.record(id)?);
                }
            }
        }
        Ok(records)
    }

    /// Materialize each distinct record hit by `range` in first-encounter order
    fn collect_records(&self, range: SaRange) -> Result<Vec<Vec<u8>>> {
        let mut seen = RoaringBitmap::new();
        let mut records = Vec::new();

        for id in self.scan(range) {
            if seen.insert(id) {
                records.push(self.record(id)?);
            }
        }

        Ok(records)
    }

    /// Extract up to `max_length` bytes from every record, starting
    /// `byte_offset` bytes into it.
    ///
    /// The cap carries over between records: once a short record clamps it,
    /// later records never get more than that, even if they have room. The
    /// last record's room extends through its delimiter.
    pub fn extract_records(&self, byte_offset: u64, max_length: usize) -> Result<Vec<Vec<u8>>> {
        let offsets = self.offsets.as_slice();
        let size = self.text.original_size();
        let mut length = max_length as u64;
        let mut records = Vec::with_capacity(offsets.len());

        for (i, &start) in offsets.iter().enumerate() {
            let cur_end = offsets.get(i + 1).copied().unwrap_or(size);
            // A start at or past the record end leaves no room at all
            let room = start
                .checked_add(byte_offset)
                .map_or(0, |cur_start| cur_end.saturating_sub(cur_start).saturating_sub(1));
            length = length.min(room);

            if length == 0 {
                records.push(Vec::new());
            } else {
                records.push(self.text.extract(start + byte_offset, length as usize)?);
            }
        }

        Ok(records)
    }

    /// Run independent single-pattern searches on the rayon pool
    pub fn par_record_search_many(&self, patterns: &[&[u8]]) -> Result<Vec<Vec<Vec<u8>>>> {
        patterns
            .par_iter()
            .map(|pattern| self.record_search(pattern))
            .collect()
    }
}
