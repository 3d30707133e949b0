#![no_main]

use libfuzzer_sys::fuzz_target;
use sxi::index::RecordIndexBuilder;

fuzz_target!(|data: (Vec<u8>, Vec<u8>)| {
    let (input, pattern) = data;
    let mut builder = RecordIndexBuilder::with_defaults();
    if builder.add_delimited(&input).is_err() {
        return;
    }
    let Ok(built) = builder.build() else {
        return;
    };
    let index = built.into_record_index();

    // Counts and materialized results must agree on arbitrary bytes
    let records = index.record_search(&pattern).unwrap();
    assert_eq!(index.record_count(&pattern), records.len() as u64);
    for id in 0..index.num_records() {
        index.get_record(id as i64).unwrap();
    }
    let _ = index.extract_records(pattern.len() as u64, 8).unwrap();
});
