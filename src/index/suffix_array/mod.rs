//! Suffix array backend for the record index
//!
//! A plain suffix array over the concatenated record text. It implements
//! [`TextIndex`](crate::index::TextIndex) so the record engine can run
//! against it, in memory straight after a build or memory-mapped from disk.
//!
//! ## Architecture
//!
//! - `builder`: Concatenates records and sorts suffixes
//! - `writer`: Persists text, suffix array, packed offsets and metadata
//! - `reader`: In-memory or memory-mapped search
//! - `types`: File names, magic numbers and headers

pub mod builder;
pub mod reader;
pub mod types;
pub mod writer;

// Re-exports for convenience
pub use builder::{BuiltIndex, RecordIndexBuilder};
pub use reader::{read_meta, SuffixArrayIndex};
pub use writer::IndexWriter;
