//! Record index writer
//!
//! Writes a built index to a directory in a format optimized for
//! memory-mapped reading.

use super::builder::BuiltIndex;
use super::types::*;
use crate::error::Result;
use crate::index::offsets::OffsetIndex;
use crate::utils::encoding::write_u64_words;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

/// Writes record index files to a directory
pub struct IndexWriter;

impl IndexWriter {
    /// Write all index files, creating `dir` if needed
    ///
    /// Creates:
    /// - text.bin: Concatenated record text
    /// - sa.bin: The suffix array itself
    /// - offsets.bin: Bit-packed record offsets
    /// - meta.json: Index metadata and build configuration
    pub fn write(dir: &Path, built: &BuiltIndex) -> Result<()> {
        std::fs::create_dir_all(dir)?;

        Self::write_text(dir, &built.text)?;
        Self::write_suffix_array(dir, &built.suffix_array)?;
        Self::write_offsets(dir, &built.offsets)?;

        // Metadata last, so a half-written directory fails to open
        let meta_file = File::create(dir.join(META_FILE))?;
        serde_json::to_writer_pretty(BufWriter::new(meta_file), &built.meta())?;

        info!(
            path = %dir.display(),
            records = built.offsets.num_records(),
            text_size = built.text.len(),
            "wrote record index"
        );
        Ok(())
    }

    fn write_text(dir: &Path, text: &[u8]) -> Result<()> {
        let mut file = BufWriter::with_capacity(65536, File::create(dir.join(TEXT_FILE))?);
        file.write_all(text)?;
        file.flush()?;
        Ok(())
    }

    fn write_suffix_array(dir: &Path, sa: &[SuffixEntry]) -> Result<()> {
        let mut file = BufWriter::with_capacity(65536, File::create(dir.join(SA_FILE))?);

        SuffixArrayHeader::new(sa.len() as u64).write_to(&mut file)?;
        write_u64_words(&mut file, sa)?;

        file.flush()?;
        Ok(())
    }

    fn write_offsets(dir: &Path, offsets: &OffsetIndex) -> Result<()> {
        let packed = offsets.pack()?;
        let mut file = BufWriter::with_capacity(65536, File::create(dir.join(OFFSETS_FILE))?);

        OffsetsHeader::new(
            packed.len() as u64,
            packed.width(),
            packed.words().len() as u64,
        )
        .write_to(&mut file)?;
        write_u64_words(&mut file, packed.words())?;

        file.flush()?;
        Ok(())
    }
}
