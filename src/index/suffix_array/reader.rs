//! Suffix array text index
//!
//! Answers the [`TextIndex`] primitives from a concatenated text and its
//! suffix array, either held in memory right after a build or
//! memory-mapped from an index directory.

use super::types::*;
use crate::error::{Error, Result};
use crate::index::offsets::PackedOffsets;
use crate::index::text_index::TextIndex;
use crate::index::types::{IndexMeta, SaRange, TextPosition};
use crate::query::RecordIndex;
use crate::utils::encoding::{read_u64_at, read_u64_words};
use memmap2::Mmap;
use regex::bytes::Regex;
use std::collections::BTreeMap;
use std::fs::File;
use std::ops::Deref;
use std::path::Path;
use tracing::info;

/// Read-only byte storage
enum Bytes {
    Owned(Vec<u8>),
    Mapped(Mmap),
}

impl Deref for Bytes {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            Bytes::Owned(v) => v,
            Bytes::Mapped(m) => m,
        }
    }
}

/// Suffix array entries, either decoded or read in place from sa.bin
enum Suffixes {
    Owned(Vec<SuffixEntry>),
    Mapped { mmap: Mmap, count: u64 },
}

impl Suffixes {
    fn len(&self) -> u64 {
        match self {
            Suffixes::Owned(v) => v.len() as u64,
            Suffixes::Mapped { count, .. } => *count,
        }
    }

    #[inline]
    fn get(&self, i: u64) -> SuffixEntry {
        match self {
            Suffixes::Owned(v) => v[i as usize],
            Suffixes::Mapped { mmap, .. } => {
                let at = SuffixArrayHeader::SIZE + i as usize * 8;
                let mut bytes = [0u8; 8];
                bytes.copy_from_slice(&mmap[at..at + 8]);
                u64::from_le_bytes(bytes)
            }
        }
    }
}

/// A plain suffix array over the concatenated record text.
pub struct SuffixArrayIndex {
    text: Bytes,
    suffixes: Suffixes,
}

impl SuffixArrayIndex {
    /// Wrap an in-memory text and its suffix array
    pub fn from_parts(text: Vec<u8>, suffix_array: Vec<SuffixEntry>) -> Self {
        Self {
            text: Bytes::Owned(text),
            suffixes: Suffixes::Owned(suffix_array),
        }
    }

    /// Memory-map text.bin and sa.bin from an index directory
    pub fn open(dir: &Path) -> Result<Self> {
        let text_file = File::open(dir.join(TEXT_FILE))?;
        // Safety: index files are written once and never modified in place
        let text_mmap = unsafe { Mmap::map(&text_file)? };

        let sa_file = File::open(dir.join(SA_FILE))?;
        let sa_mmap = unsafe { Mmap::map(&sa_file)? };
        let header = SuffixArrayHeader::parse(&sa_mmap)?;

        if header.suffix_count != text_mmap.len() as u64 {
            return Err(Error::InvalidFormat(format!(
                "{} has {} entries but text is {} bytes",
                SA_FILE,
                header.suffix_count,
                text_mmap.len()
            )));
        }

        let text_size = text_mmap.len() as u64;
        let entries = &sa_mmap[SuffixArrayHeader::SIZE..];
        if let Some(at) = entries
            .chunks_exact(8)
            .take(header.suffix_count as usize)
            .position(|chunk| read_u64_at(chunk, 0).map_or(true, |pos| pos >= text_size))
        {
            return Err(Error::InvalidFormat(format!(
                "{} entry {} points past the end of the text",
                SA_FILE, at
            )));
        }

        Ok(Self {
            text: Bytes::Mapped(text_mmap),
            suffixes: Suffixes::Mapped {
                mmap: sa_mmap,
                count: header.suffix_count,
            },
        })
    }

    /// Get the full text slice
    pub fn text(&self) -> &[u8] {
        &self.text
    }

    pub fn suffix_count(&self) -> u64 {
        self.suffixes.len()
    }

    #[inline]
    fn text_at(&self, pos: TextPosition) -> &[u8] {
        &self.text[pos as usize..]
    }

    /// Find first index whose suffix is not less than the pattern
    fn lower_bound(&self, pattern: &[u8]) -> u64 {
        let mut lo: u64 = 0;
        let mut hi: u64 = self.suffixes.len();

        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            let suffix = self.text_at(self.suffixes.get(mid));

            // Compare only up to pattern length
            let cmp_len = pattern.len().min(suffix.len());
            if &suffix[..cmp_len] < pattern {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }

        lo
    }

    /// Find first index at or after `start` whose suffix does not start with the pattern
    fn upper_bound(&self, pattern: &[u8], start: u64) -> u64 {
        let mut lo = start;
        let mut hi: u64 = self.suffixes.len();

        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            if self.text_at(self.suffixes.get(mid)).starts_with(pattern) {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }

        lo
    }
}

impl TextIndex for SuffixArrayIndex {
    fn extract(&self, offset: TextPosition, len: usize) -> Result<Vec<u8>> {
        let size = self.text.len() as u64;
        let end = offset.checked_add(len as u64).filter(|&end| end <= size);
        match end {
            Some(end) => Ok(self.text[offset as usize..end as usize].to_vec()),
            None => Err(Error::out_of_range("text position", offset, size)),
        }
    }

    fn get_range(&self, pattern: &[u8]) -> SaRange {
        if pattern.is_empty() || self.suffixes.len() == 0 {
            return SaRange::from_bounds(0, 0);
        }

        let lo = self.lower_bound(pattern);
        let hi = self.upper_bound(pattern, lo);
        SaRange::from_bounds(lo, hi)
    }

    fn lookup_sa(&self, index: u64) -> TextPosition {
        self.suffixes.get(index)
    }

    fn regex_search(&self, pattern: &str) -> Result<BTreeMap<TextPosition, usize>> {
        let re = Regex::new(pattern)?;
        Ok(re
            .find_iter(&self.text)
            .filter(|m| !m.is_empty())
            .map(|m| (m.start() as TextPosition, m.len()))
            .collect())
    }

    fn original_size(&self) -> u64 {
        self.text.len() as u64
    }
}

impl RecordIndex<SuffixArrayIndex> {
    /// Open a record index written by [`IndexWriter`](super::IndexWriter).
    ///
    /// The text and suffix array stay memory-mapped; offsets are decoded from
    /// their bit-packed form into memory.
    pub fn open(dir: &Path) -> Result<Self> {
        let meta = read_meta(dir)?;
        let text = SuffixArrayIndex::open(dir)?;

        let data = std::fs::read(dir.join(OFFSETS_FILE))?;
        let header = OffsetsHeader::parse(&data)?;
        let words = read_u64_words(&data, OffsetsHeader::SIZE, header.word_count as usize)?;
        let count = usize::try_from(header.record_count).map_err(|_| {
            Error::InvalidFormat(format!("{}: record count {} too large", OFFSETS_FILE, header.record_count))
        })?;
        let offsets = PackedOffsets::from_words(words, header.width, count)?
            .unpack()
            .map_err(|e| match e {
                Error::InvalidArgument(msg) => Error::InvalidFormat(format!("{}: {}", OFFSETS_FILE, msg)),
                other => other,
            })?;

        if let Some(&last) = offsets.as_slice().last() {
            if last >= text.original_size() {
                return Err(Error::InvalidFormat(format!(
                    "{}: record starts at {} past text of {} bytes",
                    OFFSETS_FILE,
                    last,
                    text.original_size()
                )));
            }
        }

        if offsets.num_records() as u64 != meta.record_count
            || text.original_size() != meta.text_size
        {
            return Err(Error::InvalidFormat(format!(
                "{} does not match index files",
                META_FILE
            )));
        }

        info!(
            path = %dir.display(),
            records = offsets.num_records(),
            text_size = text.original_size(),
            "opened record index"
        );

        Ok(RecordIndex::new(text, offsets))
    }
}

/// Read meta.json from an index directory
pub fn read_meta(dir: &Path) -> Result<IndexMeta> {
    let file = File::open(dir.join(META_FILE))?;
    let meta: IndexMeta = serde_json::from_reader(std::io::BufReader::new(file))?;
    if meta.version != FORMAT_VERSION {
        return Err(Error::InvalidFormat(format!(
            "{}: unsupported version {}",
            META_FILE, meta.version
        )));
    }
    Ok(meta)
}
