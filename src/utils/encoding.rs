//! Little-endian helpers for the index file formats.

use crate::error::{Error, Result};
use std::io::{self, Write};

/// Write a u32 in little-endian format
pub fn write_u32_le<W: Write>(writer: &mut W, value: u32) -> io::Result<()> {
    writer.write_all(&value.to_le_bytes())
}

/// Write a u64 in little-endian format
pub fn write_u64_le<W: Write>(writer: &mut W, value: u64) -> io::Result<()> {
    writer.write_all(&value.to_le_bytes())
}

/// Read a little-endian u32 at byte offset `at`
pub fn read_u32_at(buf: &[u8], at: usize) -> Result<u32> {
    let mut bytes = [0u8; 4];
    bytes.copy_from_slice(slice_at(buf, at, 4)?);
    Ok(u32::from_le_bytes(bytes))
}

/// Read a little-endian u64 at byte offset `at`
pub fn read_u64_at(buf: &[u8], at: usize) -> Result<u64> {
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(slice_at(buf, at, 8)?);
    Ok(u64::from_le_bytes(bytes))
}

/// Decode a run of little-endian u64 words
pub fn read_u64_words(buf: &[u8], at: usize, count: usize) -> Result<Vec<u64>> {
    let bytes = slice_at(buf, at, count.saturating_mul(8))?;
    Ok(bytes
        .chunks_exact(8)
        .map(|chunk| {
            let mut word = [0u8; 8];
            word.copy_from_slice(chunk);
            u64::from_le_bytes(word)
        })
        .collect())
}

/// Write a run of u64 words in little-endian format, buffered in chunks
pub fn write_u64_words<W: Write>(writer: &mut W, words: &[u64]) -> io::Result<()> {
    // 1024 entries at a time to cut down on write calls
    let mut buffer = Vec::with_capacity(8 * 1024);
    for &word in words {
        buffer.extend_from_slice(&word.to_le_bytes());
        if buffer.len() >= 8 * 1024 {
            writer.write_all(&buffer)?;
            buffer.clear();
        }
    }
    if !buffer.is_empty() {
        writer.write_all(&buffer)?;
    }
    Ok(())
}

fn slice_at(buf: &[u8], at: usize, len: usize) -> Result<&[u8]> {
    at.checked_add(len)
        .and_then(|end| buf.get(at..end))
        .ok_or_else(|| {
            Error::InvalidFormat(format!(
                "unexpected end of data: need {} bytes at {}, have {}",
                len,
                at,
                buf.len()
            ))
        })
}
