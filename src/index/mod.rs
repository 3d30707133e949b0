pub mod bitmap;
pub mod offsets;
pub mod suffix_array;
pub mod text_index;
pub mod types;

pub use bitmap::BitMap;
pub use offsets::{OffsetIndex, PackedOffsets};
pub use suffix_array::{BuiltIndex, IndexWriter, RecordIndexBuilder, SuffixArrayIndex};
pub use text_index::TextIndex;
pub use types::*;
