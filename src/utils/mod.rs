//! Utility functions shared by the index and the CLI.
//!
//! ## Modules
//!
//! - [`encoding`] - Little-endian helpers for the index file formats
//! - [`logging`] - `tracing` subscriber setup for the binary
//! - [`progress`] - Build progress bars (no-op without the `progress` feature)

pub mod encoding;
pub mod logging;
pub mod progress;

pub use encoding::*;
pub use logging::*;
