//! Bit-packed word array.
//!
//! Stores arbitrary-width unsigned fields at arbitrary bit offsets inside a
//! dense `Vec<u64>`. Bit 0 is the most significant bit of word 0, and fields
//! are laid out most-significant-bit first, so a field that straddles a word
//! boundary keeps its high-order bits at the tail of the first word and its
//! low-order bits at the head of the next one.
//!
//! A field is never wider than one word, so it touches at most two words.

use crate::error::{Error, Result};

/// Width of one storage word in bits
pub const WORD_BITS: u64 = 64;

/// Mask with the low `bits` bits set (`bits` in `0..=64`)
#[inline]
pub(crate) fn low_mask(bits: u32) -> u64 {
    if bits >= 64 {
        u64::MAX
    } else {
        (1u64 << bits) - 1
    }
}

/// Number of bits needed to represent `value` (at least 1)
#[inline]
pub fn bits_needed(value: u64) -> u32 {
    (64 - value.leading_zeros()).max(1)
}

/// Field access over a raw word slice.
///
/// These work on any `&[u64]`, including words decoded straight from an index
/// file. They do no bounds checking beyond slice indexing; callers must keep
/// `pos + bits` within the slice and `bits` in `1..=64`.
pub mod ops {
    use super::{low_mask, WORD_BITS};

    /// Read bit `pos`
    #[inline]
    pub fn get_bit(words: &[u64], pos: u64) -> bool {
        let word = words[(pos / WORD_BITS) as usize];
        (word >> (WORD_BITS - 1 - pos % WORD_BITS)) & 1 == 1
    }

    /// Read the `bits`-wide field starting at `pos`
    #[inline]
    pub fn get_val_pos(words: &[u64], pos: u64, bits: u32) -> u64 {
        let word_idx = (pos / WORD_BITS) as usize;
        let bit_off = (pos % WORD_BITS) as u32;

        if bit_off + bits <= WORD_BITS as u32 {
            let shift = WORD_BITS as u32 - bit_off - bits;
            (words[word_idx] >> shift) & low_mask(bits)
        } else {
            // High part is the tail of this word, low part the head of the next
            let high_bits = WORD_BITS as u32 - bit_off;
            let low_bits = bits - high_bits;
            let high = words[word_idx] & low_mask(high_bits);
            let low = words[word_idx + 1] >> (WORD_BITS as u32 - low_bits);
            (high << low_bits) | low
        }
    }

    /// Set bit `pos` to 1
    #[inline]
    pub fn set_bit(words: &mut [u64], pos: u64) {
        words[(pos / WORD_BITS) as usize] |= 1u64 << (WORD_BITS - 1 - pos % WORD_BITS);
    }

    /// Overwrite the `bits`-wide field at `pos` with the low bits of `value`.
    ///
    /// Bits outside the field are preserved.
    #[inline]
    pub fn set_val_pos(words: &mut [u64], pos: u64, value: u64, bits: u32) {
        let word_idx = (pos / WORD_BITS) as usize;
        let bit_off = (pos % WORD_BITS) as u32;
        let value = value & low_mask(bits);

        if bit_off + bits <= WORD_BITS as u32 {
            let shift = WORD_BITS as u32 - bit_off - bits;
            let mask = low_mask(bits) << shift;
            words[word_idx] = (words[word_idx] & !mask) | (value << shift);
        } else {
            let high_bits = WORD_BITS as u32 - bit_off;
            let low_bits = bits - high_bits;

            let high_mask = low_mask(high_bits);
            words[word_idx] = (words[word_idx] & !high_mask) | (value >> low_bits);

            let low_shift = WORD_BITS as u32 - low_bits;
            let next_mask = low_mask(low_bits) << low_shift;
            words[word_idx + 1] =
                (words[word_idx + 1] & !next_mask) | ((value & low_mask(low_bits)) << low_shift);
        }
    }
}

/// A fixed-length bit array backed by 64-bit words.
#[derive(Clone, PartialEq, Eq)]
pub struct BitMap {
    words: Vec<u64>,
    len: u64,
}

impl std::fmt::Debug for BitMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BitMap")
            .field("len", &self.len)
            .field("words", &self.words.len())
            .finish()
    }
}

impl BitMap {
    /// Create an all-zero bitmap of `len` bits
    pub fn new(len: u64) -> Self {
        Self {
            words: vec![0u64; len.div_ceil(WORD_BITS) as usize],
            len,
        }
    }

    /// Wrap existing words, e.g. ones read back from disk
    pub fn from_words(words: Vec<u64>, len: u64) -> Result<Self> {
        let needed = len.div_ceil(WORD_BITS);
        if (words.len() as u64) < needed {
            return Err(Error::InvalidFormat(format!(
                "bitmap of {} bits needs {} words, got {}",
                len,
                needed,
                words.len()
            )));
        }
        Ok(Self { words, len })
    }

    /// Declared length in bits
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Backing words
    pub fn words(&self) -> &[u64] {
        &self.words
    }

    /// Approximate heap memory usage in bytes
    pub fn heap_bytes(&self) -> usize {
        self.words.capacity() * 8
    }

    pub fn set_bit(&mut self, pos: u64) -> Result<()> {
        self.check_field(pos, 1)?;
        ops::set_bit(&mut self.words, pos);
        Ok(())
    }

    pub fn get_bit(&self, pos: u64) -> Result<bool> {
        self.check_field(pos, 1)?;
        Ok(ops::get_bit(&self.words, pos))
    }

    /// Write `value` into the `bits`-wide field at `pos`, MSB first
    pub fn set_val_pos(&mut self, pos: u64, value: u64, bits: u32) -> Result<()> {
        self.check_field(pos, bits)?;
        if value > low_mask(bits) {
            return Err(Error::ValueTooWide { value, bits });
        }
        ops::set_val_pos(&mut self.words, pos, value, bits);
        Ok(())
    }

    /// Read the `bits`-wide field at `pos`
    pub fn get_val_pos(&self, pos: u64, bits: u32) -> Result<u64> {
        self.check_field(pos, bits)?;
        Ok(ops::get_val_pos(&self.words, pos, bits))
    }

    fn check_field(&self, pos: u64, bits: u32) -> Result<()> {
        if bits == 0 || bits as u64 > WORD_BITS {
            return Err(Error::InvalidArgument(format!(
                "field width must be 1..={} bits, got {}",
                WORD_BITS, bits
            )));
        }
        match pos.checked_add(bits as u64) {
            Some(end) if end <= self.len => Ok(()),
            _ => Err(Error::out_of_range("bit", pos, self.len)),
        }
    }
}
