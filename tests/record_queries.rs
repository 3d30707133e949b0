//! End-to-end record queries over an in-memory index.

use std::collections::HashSet;
use std::sync::Arc;
use sxi::index::RecordIndexBuilder;
use sxi::{Error, QueryKind, RecordIndex, RecordQuery, SuffixArrayIndex};

fn build(records: &[&str]) -> RecordIndex<SuffixArrayIndex> {
    let mut builder = RecordIndexBuilder::with_defaults();
    for record in records {
        builder.add_record(record.as_bytes()).unwrap();
    }
    builder.build().unwrap().into_record_index()
}

fn as_set(records: Vec<Vec<u8>>) -> HashSet<Vec<u8>> {
    records.into_iter().collect()
}

fn words() -> Vec<&'static str> {
    vec![
        "the quick brown fox",
        "jumps over",
        "the lazy dog",
        "brown bread",
        "",
        "quick quick quick",
        "a fox and a dog",
    ]
}

#[test]
fn test_cat_dog_cataract() {
    let idx = build(&["cat", "dog", "cataract"]);

    assert_eq!(idx.get_record(0).unwrap(), b"cat");
    let third = idx.offsets().get(2).unwrap();
    assert_eq!(idx.search_offset(third), Some(2));

    let found = as_set(idx.record_search(b"cat").unwrap());
    let expected: HashSet<Vec<u8>> = [b"cat".to_vec(), b"cataract".to_vec()].into_iter().collect();
    assert_eq!(found, expected);
}

#[test]
fn test_get_record_bounds() {
    let idx = build(&["cat", "dog", "cataract"]);
    assert!(matches!(idx.get_record(-1), Err(Error::OutOfRange { .. })));
    assert!(matches!(idx.get_record(3), Err(Error::OutOfRange { .. })));
}

#[test]
fn test_every_record_reads_back() {
    let records = words();
    let idx = build(&records);
    assert_eq!(idx.num_records(), records.len());
    for (i, record) in records.iter().enumerate() {
        assert_eq!(idx.get_record(i as i64).unwrap(), record.as_bytes());
    }
}

#[test]
fn test_record_count_matches_search_length() {
    let idx = build(&words());
    for pattern in ["quick", "o", "dog", "the ", "zebra", "k q", "\n"] {
        let count = idx.record_count(pattern.as_bytes());
        let records = idx.record_search(pattern.as_bytes()).unwrap();
        assert_eq!(count, records.len() as u64, "pattern {:?}", pattern);
    }
}

#[test]
fn test_search_emits_each_record_once() {
    let idx = build(&words());
    let records = idx.record_search(b"quick").unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(as_set(records).len(), 2);
}

#[test]
fn test_search_agrees_with_linear_scan() {
    let records = words();
    let idx = build(&records);
    for pattern in ["o", "ow", "fox", "a ", "br"] {
        let expected: HashSet<Vec<u8>> = records
            .iter()
            .filter(|r| r.contains(pattern))
            .map(|r| r.as_bytes().to_vec())
            .collect();
        assert_eq!(
            as_set(idx.record_search(pattern.as_bytes()).unwrap()),
            expected,
            "pattern {:?}",
            pattern
        );
    }
}

#[test]
fn test_range_search() {
    let idx = build(&["apple", "banana", "cherry", "date"]);
    // Suffixes starting with anything from "b" through "c..." land in one interval
    let found = as_set(idx.record_range_search(b"b", b"c").unwrap());
    assert!(found.contains(b"banana".as_slice()));
    assert!(found.contains(b"cherry".as_slice()));

    // Inverted bounds give an empty interval
    assert!(idx.record_range_search(b"z", b"a").unwrap().is_empty());
}

#[test]
fn test_regex_search() {
    let idx = build(&words());
    let found = as_set(idx.record_search_regex(r"f[o]x").unwrap());
    let expected: HashSet<Vec<u8>> = [
        b"the quick brown fox".to_vec(),
        b"a fox and a dog".to_vec(),
    ]
    .into_iter()
    .collect();
    assert_eq!(found, expected);

    assert!(matches!(
        idx.record_search_regex("(unclosed"),
        Err(Error::Regex(_))
    ));
}

#[test]
fn test_multi_search_is_commutative() {
    let idx = build(&words());
    let queries = [
        RecordQuery::Search(b"o".to_vec()),
        RecordQuery::Search(b"the".to_vec()),
        RecordQuery::Range {
            begin: b"d".to_vec(),
            end: b"f".to_vec(),
        },
    ];
    let forward = as_set(idx.multi_search(&queries).unwrap());
    let mut reversed = queries.to_vec();
    reversed.reverse();
    assert_eq!(as_set(idx.multi_search(&reversed).unwrap()), forward);

    let expected: HashSet<Vec<u8>> = [b"the quick brown fox".to_vec(), b"the lazy dog".to_vec()]
        .into_iter()
        .collect();
    assert_eq!(forward, expected);
}

#[test]
fn test_multi_search_rejects_empty() {
    let idx = build(&words());
    assert!(matches!(
        idx.multi_search_by_kind(&[], &[]),
        Err(Error::InvalidArgument(_))
    ));
    assert!(matches!(
        "nearby".parse::<QueryKind>(),
        Err(Error::InvalidArgument(_))
    ));
}

#[test]
fn test_extract_records_shrinking_cap() {
    let idx = build(&["abcdef", "xy", "0123456789"]);
    let slices = idx.extract_records(0, 4).unwrap();
    // "xy" clamps the cap to 2 and it never recovers
    assert_eq!(slices, vec![b"abcd".to_vec(), b"xy".to_vec(), b"01".to_vec()]);

    let slices = idx.extract_records(1, 3).unwrap();
    assert_eq!(slices, vec![b"bcd".to_vec(), b"y".to_vec(), b"1".to_vec()]);
}

#[test]
fn test_shared_index_across_threads() {
    let idx = Arc::new(build(&words()));
    let handles: Vec<_> = ["quick", "dog", "fox", "brown"]
        .into_iter()
        .map(|pattern| {
            let idx = Arc::clone(&idx);
            std::thread::spawn(move || idx.record_count(pattern.as_bytes()))
        })
        .collect();
    let counts: Vec<u64> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(counts, vec![2, 2, 2, 2]);

    let patterns: [&[u8]; 2] = [b"quick", b"lazy"];
    let results = idx.par_record_search_many(&patterns).unwrap();
    assert_eq!(results[0].len(), 2);
    assert_eq!(results[1], vec![b"the lazy dog".to_vec()]);
}

#[test]
fn test_long_records_sharing_a_prefix() {
    let prefix = "x".repeat(300);
    let first = format!("{}b", prefix);
    let second = format!("{}a", prefix);
    let idx = build(&[first.as_str(), second.as_str()]);

    let pattern = second.as_bytes();
    assert_eq!(idx.record_search(pattern).unwrap(), vec![pattern.to_vec()]);
    assert_eq!(idx.record_count(pattern), 1);
    assert_eq!(idx.record_count(first.as_bytes()), 1);
    assert_eq!(idx.record_count(prefix.as_bytes()), 2);

    let both = idx
        .multi_search(&[
            RecordQuery::Search(prefix.into_bytes()),
            RecordQuery::Search(b"xa".to_vec()),
        ])
        .unwrap();
    assert_eq!(both, vec![second.into_bytes()]);
}
