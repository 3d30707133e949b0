pub mod engine;
pub mod multi;

pub use engine::RecordIndex;
pub use multi::{QueryKind, RecordQuery};
