//! Write an index to disk, reopen it memory-mapped and query it.

use std::collections::HashSet;
use std::fs;
use std::path::Path;
use sxi::index::suffix_array::read_meta;
use sxi::index::suffix_array::types::{OffsetsHeader, SuffixArrayHeader};
use sxi::index::{IndexConfig, IndexWriter, PackedOffsets, RecordIndexBuilder};
use sxi::utils::write_u64_words;
use sxi::{BitMap, Error, RecordIndex, RecordQuery, SuffixArrayIndex};
use tempfile::TempDir;

const RECORDS: &str = "cat\ndog\ncataract\nconcatenate\n\nbird\n";

fn write_index(dir: &Path, input: &[u8], config: IndexConfig) {
    let mut builder = RecordIndexBuilder::new(config);
    builder.add_delimited(input).unwrap();
    let built = builder.build().unwrap();
    IndexWriter::write(dir, &built).unwrap();
}

fn fixture() -> TempDir {
    let dir = TempDir::new().expect("Failed to create temp dir");
    write_index(dir.path(), RECORDS.as_bytes(), IndexConfig::default());
    dir
}

#[test]
fn test_reopened_index_answers_queries() {
    let dir = fixture();
    let idx = RecordIndex::<SuffixArrayIndex>::open(dir.path()).unwrap();

    assert_eq!(idx.num_records(), 6);
    assert_eq!(idx.get_record(0).unwrap(), b"cat");
    assert_eq!(idx.get_record(4).unwrap(), b"");
    assert_eq!(idx.get_record(5).unwrap(), b"bird");
    assert!(matches!(idx.get_record(6), Err(Error::OutOfRange { .. })));

    let found: HashSet<Vec<u8>> = idx.record_search(b"cat").unwrap().into_iter().collect();
    let expected: HashSet<Vec<u8>> = [
        b"cat".to_vec(),
        b"cataract".to_vec(),
        b"concatenate".to_vec(),
    ]
    .into_iter()
    .collect();
    assert_eq!(found, expected);
    assert_eq!(idx.record_count(b"cat"), 3);

    let both = idx
        .multi_search(&[
            RecordQuery::Search(b"cat".to_vec()),
            RecordQuery::Search(b"ten".to_vec()),
        ])
        .unwrap();
    assert_eq!(both, vec![b"concatenate".to_vec()]);
}

#[test]
fn test_reopened_index_matches_in_memory() {
    let dir = fixture();
    let disk = RecordIndex::<SuffixArrayIndex>::open(dir.path()).unwrap();

    let mut builder = RecordIndexBuilder::with_defaults();
    builder.add_delimited(RECORDS.as_bytes()).unwrap();
    let memory = builder.build().unwrap().into_record_index();

    assert_eq!(disk.offsets(), memory.offsets());
    for pattern in ["a", "at", "r", "\n", "nothing"] {
        assert_eq!(
            disk.record_search(pattern.as_bytes()).unwrap(),
            memory.record_search(pattern.as_bytes()).unwrap(),
            "pattern {:?}",
            pattern
        );
    }
    assert_eq!(
        disk.extract_records(1, 5).unwrap(),
        memory.extract_records(1, 5).unwrap()
    );
}

#[test]
fn test_meta_round_trip() {
    let dir = TempDir::new().unwrap();
    let config = IndexConfig {
        delimiter: b'|',
        max_record_size: 64,
        ..IndexConfig::default()
    };
    write_index(dir.path(), b"a|bb|ccc", config.clone());

    let meta = read_meta(dir.path()).unwrap();
    assert_eq!(meta.config, config);
    assert_eq!(meta.record_count, 3);
    // "a|bb|ccc|" plus end-of-text
    assert_eq!(meta.text_size, 10);
    assert_eq!(meta.suffix_count, 10);

    let idx = RecordIndex::<SuffixArrayIndex>::open(dir.path()).unwrap();
    assert_eq!(idx.get_record(2).unwrap(), b"ccc");
}

#[test]
fn test_corrupt_suffix_array_rejected() {
    let dir = fixture();
    let sa = dir.path().join("sa.bin");
    let mut data = fs::read(&sa).unwrap();
    data[0] ^= 0xFF;
    fs::write(&sa, data).unwrap();

    assert!(matches!(
        RecordIndex::<SuffixArrayIndex>::open(dir.path()),
        Err(Error::InvalidFormat(_))
    ));
}

#[test]
fn test_truncated_offsets_rejected() {
    let dir = fixture();
    let offsets = dir.path().join("offsets.bin");
    let data = fs::read(&offsets).unwrap();
    fs::write(&offsets, &data[..data.len() - 4]).unwrap();

    assert!(matches!(
        RecordIndex::<SuffixArrayIndex>::open(dir.path()),
        Err(Error::InvalidFormat(_))
    ));
}

fn assert_invalid_format(dir: &Path) {
    assert!(matches!(
        RecordIndex::<SuffixArrayIndex>::open(dir),
        Err(Error::InvalidFormat(_))
    ));
}

#[test]
fn test_suffix_entry_past_text_rejected() {
    let dir = fixture();
    let sa = dir.path().join("sa.bin");
    let mut data = fs::read(&sa).unwrap();
    let at = SuffixArrayHeader::SIZE + 3 * 8;
    data[at..at + 8].copy_from_slice(&u64::MAX.to_le_bytes());
    fs::write(&sa, data).unwrap();

    assert_invalid_format(dir.path());
}

#[test]
fn test_overflowing_record_count_rejected() {
    let dir = fixture();
    let offsets = dir.path().join("offsets.bin");
    let mut data = fs::read(&offsets).unwrap();
    // record_count follows magic and version
    data[8..16].copy_from_slice(&u64::MAX.to_le_bytes());
    fs::write(&offsets, data).unwrap();

    assert_invalid_format(dir.path());
}

#[test]
fn test_offset_past_text_rejected() {
    let dir = fixture();
    let packed = PackedOffsets::from_offsets(&[0, 4, 8, 17, 29, 1000]).unwrap();
    let mut data = Vec::new();
    OffsetsHeader::new(packed.len() as u64, packed.width(), packed.words().len() as u64)
        .write_to(&mut data)
        .unwrap();
    write_u64_words(&mut data, packed.words()).unwrap();
    fs::write(dir.path().join("offsets.bin"), data).unwrap();

    assert_invalid_format(dir.path());
}

#[test]
fn test_unsorted_offsets_rejected() {
    let dir = fixture();
    let packed = PackedOffsets::from_offsets(&[0, 4, 8, 17, 29, 30]).unwrap();
    let width = packed.width();
    let mut fields = BitMap::from_words(packed.words().to_vec(), packed.len() as u64 * width as u64).unwrap();
    // Record 1 now starts after record 2
    fields.set_val_pos(width as u64, 12, width).unwrap();

    let mut data = Vec::new();
    OffsetsHeader::new(packed.len() as u64, width, fields.words().len() as u64)
        .write_to(&mut data)
        .unwrap();
    write_u64_words(&mut data, fields.words()).unwrap();
    fs::write(dir.path().join("offsets.bin"), data).unwrap();

    assert_invalid_format(dir.path());
}

#[test]
fn test_missing_meta_is_io_error() {
    let dir = fixture();
    fs::remove_file(dir.path().join("meta.json")).unwrap();
    assert!(matches!(
        RecordIndex::<SuffixArrayIndex>::open(dir.path()),
        Err(Error::Io(_))
    ));
}
