//! # SXI - Compressed Record Index
//!
//! SXI stores a collection of byte records as one delimited text, indexes it
//! with a full-text index, and answers record-level queries: fetch a record
//! by id, find records containing a pattern, find records containing
//! anything between two patterns, regex search and Boolean AND across several
//! such queries.
//!
//! ## Architecture
//!
//! The crate is organized into these main modules:
//!
//! - [`index`] - Bit-packed storage, the record offset index and the
//!   suffix array text index (build, write, open)
//! - [`query`] - The record query engine and multi-query intersection
//! - [`output`] - Result formatting for the CLI
//! - [`utils`] - File encoding helpers, logging and progress bars
//!
//! ## Quick Start
//!
//! ```ignore
//! use sxi::index::RecordIndexBuilder;
//!
//! let mut builder = RecordIndexBuilder::with_defaults();
//! builder.add_delimited(b"cat\ndog\ncataract\n")?;
//! let index = builder.build()?.into_record_index();
//!
//! assert_eq!(index.get_record(1)?, b"dog");
//! assert_eq!(index.record_count(b"cat"), 2);
//! ```
//!
//! ## Record layout
//!
//! Every record is followed by the delimiter and the text ends with a single
//! `0x00` byte. Record `i` starts at `offsets[i]`; its payload runs up to the
//! next record's start minus one delimiter byte.

pub mod error;
pub mod index;
pub mod output;
pub mod query;
pub mod utils;

pub use error::{Error, Result};
pub use index::{
    BitMap, IndexConfig, IndexWriter, OffsetIndex, RecordIndexBuilder, SaRange, SuffixArrayIndex,
    TextIndex,
};
pub use query::{QueryKind, RecordIndex, RecordQuery};
