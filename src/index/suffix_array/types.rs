//! On-disk layout of a record index
//!
//! A record index directory holds four files:
//! - `text.bin`: concatenated records, each followed by the delimiter, then one end-of-text byte
//! - `sa.bin`: the sorted suffix array (positions into text.bin)
//! - `offsets.bin`: record start offsets, bit-packed at minimal width
//! - `meta.json`: [`IndexMeta`](crate::index::types::IndexMeta)

use crate::error::{Error, Result};
use crate::utils::encoding::{read_u32_at, read_u64_at, write_u32_le, write_u64_le};
use std::io::Write;

/// Suffix array entry - position in the concatenated text
pub type SuffixEntry = u64;

/// Magic number for sa.bin ("SXSA" in little-endian)
pub const SA_MAGIC: u32 = 0x41535853;

/// Magic number for offsets.bin ("SXOF" in little-endian)
pub const OFFSETS_MAGIC: u32 = 0x464F5853;

/// Current version of the index format
pub const FORMAT_VERSION: u32 = 1;

pub const TEXT_FILE: &str = "text.bin";
pub const SA_FILE: &str = "sa.bin";
pub const OFFSETS_FILE: &str = "offsets.bin";
pub const META_FILE: &str = "meta.json";

fn check_magic(file: &str, found: u32, expected: u32, version: u32) -> Result<()> {
    if found != expected {
        return Err(Error::InvalidFormat(format!("{}: bad magic number", file)));
    }
    if version != FORMAT_VERSION {
        return Err(Error::InvalidFormat(format!(
            "{}: unsupported version {}",
            file, version
        )));
    }
    Ok(())
}

/// Header for sa.bin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuffixArrayHeader {
    pub magic: u32,
    pub version: u32,
    /// Number of suffix entries
    pub suffix_count: u64,
    /// Reserved
    pub flags: u32,
}

impl SuffixArrayHeader {
    pub const SIZE: usize = 4 + 4 + 8 + 4; // 20 bytes

    pub fn new(suffix_count: u64) -> Self {
        Self {
            magic: SA_MAGIC,
            version: FORMAT_VERSION,
            suffix_count,
            flags: 0,
        }
    }

    pub fn write_to<W: Write>(&self, w: &mut W) -> std::io::Result<()> {
        write_u32_le(w, self.magic)?;
        write_u32_le(w, self.version)?;
        write_u64_le(w, self.suffix_count)?;
        write_u32_le(w, self.flags)
    }

    /// Parse and validate the header, including that the entries fit in `data`
    pub fn parse(data: &[u8]) -> Result<Self> {
        let header = Self {
            magic: read_u32_at(data, 0)?,
            version: read_u32_at(data, 4)?,
            suffix_count: read_u64_at(data, 8)?,
            flags: read_u32_at(data, 16)?,
        };
        check_magic(SA_FILE, header.magic, SA_MAGIC, header.version)?;

        let needed = (header.suffix_count as u128) * 8 + Self::SIZE as u128;
        if (data.len() as u128) < needed {
            return Err(Error::InvalidFormat(format!(
                "{}: truncated ({} entries declared, {} bytes present)",
                SA_FILE,
                header.suffix_count,
                data.len()
            )));
        }
        Ok(header)
    }
}

/// Header for offsets.bin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OffsetsHeader {
    pub magic: u32,
    pub version: u32,
    /// Number of records
    pub record_count: u64,
    /// Bit width of each packed offset
    pub width: u32,
    /// Number of u64 words that follow
    pub word_count: u64,
}

impl OffsetsHeader {
    pub const SIZE: usize = 4 + 4 + 8 + 4 + 8; // 28 bytes

    pub fn new(record_count: u64, width: u32, word_count: u64) -> Self {
        Self {
            magic: OFFSETS_MAGIC,
            version: FORMAT_VERSION,
            record_count,
            width,
            word_count,
        }
    }

    pub fn write_to<W: Write>(&self, w: &mut W) -> std::io::Result<()> {
        write_u32_le(w, self.magic)?;
        write_u32_le(w, self.version)?;
        write_u64_le(w, self.record_count)?;
        write_u32_le(w, self.width)?;
        write_u64_le(w, self.word_count)
    }

    pub fn parse(data: &[u8]) -> Result<Self> {
        let header = Self {
            magic: read_u32_at(data, 0)?,
            version: read_u32_at(data, 4)?,
            record_count: read_u64_at(data, 8)?,
            width: read_u32_at(data, 16)?,
            word_count: read_u64_at(data, 20)?,
        };
        check_magic(OFFSETS_FILE, header.magic, OFFSETS_MAGIC, header.version)?;
        Ok(header)
    }
}
