//! Record offset index
//!
//! Maps a position in the concatenated text back to the record containing
//! it. Offsets are the start positions of each record, strictly increasing.
//! The compact form packs them into a [`BitMap`] at the minimal fixed width
//! and is what gets written to `offsets.bin`.

use super::bitmap::{bits_needed, BitMap};
use super::types::{RecordId, TextPosition};
use crate::error::{Error, Result};

/// Floor search over a sorted sequence accessed by index.
///
/// Returns the largest `i` with `value_at(i) <= pos`, or `None` when `pos`
/// precedes every value (including the empty sequence).
#[inline]
fn floor_search(len: usize, value_at: impl Fn(usize) -> TextPosition, pos: TextPosition) -> Option<usize> {
    let mut lo = 0usize;
    let mut hi = len;

    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        if value_at(mid) <= pos {
            lo = mid + 1;
        } else {
            hi = mid;
        }
    }

    lo.checked_sub(1)
}

/// Start offsets of every record in the concatenated text
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OffsetIndex {
    offsets: Vec<TextPosition>,
}

impl OffsetIndex {
    /// Wrap a list of record start offsets.
    ///
    /// Fails with `InvalidArgument` if the offsets are not strictly increasing
    /// or there are more records than a [`RecordId`] can address.
    pub fn new(offsets: Vec<TextPosition>) -> Result<Self> {
        if offsets.len() > RecordId::MAX as usize {
            return Err(Error::InvalidArgument(format!(
                "too many records: {}",
                offsets.len()
            )));
        }
        if let Some(w) = offsets.windows(2).find(|w| w[0] >= w[1]) {
            return Err(Error::InvalidArgument(format!(
                "offsets must be strictly increasing ({} then {})",
                w[0], w[1]
            )));
        }
        Ok(Self { offsets })
    }

    /// Record containing text position `pos`, or `None` if `pos` comes
    /// before the first record
    pub fn search_offset(&self, pos: TextPosition) -> Option<RecordId> {
        floor_search(self.offsets.len(), |i| self.offsets[i], pos).map(|i| i as RecordId)
    }

    pub fn num_records(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Start offset of record `id`
    pub fn get(&self, id: RecordId) -> Option<TextPosition> {
        self.offsets.get(id as usize).copied()
    }

    pub fn as_slice(&self) -> &[TextPosition] {
        &self.offsets
    }

    /// Pack into a bitmap of minimal fixed-width fields
    pub fn pack(&self) -> Result<PackedOffsets> {
        PackedOffsets::from_offsets(&self.offsets)
    }
}

/// Offsets stored as `width`-bit fields in a [`BitMap`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedOffsets {
    bits: BitMap,
    width: u32,
    count: usize,
}

impl PackedOffsets {
    pub fn from_offsets(offsets: &[TextPosition]) -> Result<Self> {
        let width = bits_needed(offsets.last().copied().unwrap_or(0));
        let mut bits = BitMap::new(offsets.len() as u64 * width as u64);

        for (i, &offset) in offsets.iter().enumerate() {
            bits.set_val_pos(i as u64 * width as u64, offset, width)?;
        }

        Ok(Self {
            bits,
            width,
            count: offsets.len(),
        })
    }

    /// Rebuild from raw words, as read from an index file
    pub fn from_words(words: Vec<u64>, width: u32, count: usize) -> Result<Self> {
        if width == 0 || width > 64 {
            return Err(Error::InvalidFormat(format!("bad offset width {}", width)));
        }
        let len = (count as u64).checked_mul(width as u64).ok_or_else(|| {
            Error::InvalidFormat(format!("{} offsets of {} bits overflow", count, width))
        })?;
        let bits = BitMap::from_words(words, len)?;
        Ok(Self { bits, width, count })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn words(&self) -> &[u64] {
        self.bits.words()
    }

    /// Offset of record `i`
    pub fn get(&self, i: usize) -> Result<TextPosition> {
        if i >= self.count {
            return Err(Error::out_of_range("record", i, self.count as u64));
        }
        self.bits.get_val_pos(i as u64 * self.width as u64, self.width)
    }

    /// Floor search directly on the packed fields
    pub fn search_offset(&self, pos: TextPosition) -> Option<RecordId> {
        let width = self.width;
        let words = self.bits.words();
        floor_search(
            self.count,
            |i| super::bitmap::ops::get_val_pos(words, i as u64 * width as u64, width),
            pos,
        )
        .map(|i| i as RecordId)
    }

    /// Decode back into a plain offset index
    pub fn unpack(&self) -> Result<OffsetIndex> {
        let offsets = (0..self.count)
            .map(|i| self.get(i))
            .collect::<Result<Vec<_>>>()?;
        OffsetIndex::new(offsets)
    }
}
