//! Table sinks for star schema output.
//!
//! - [`FileSink`]: one directory per table holding parquet or CSV part files
//! - [`MemorySink`]: tables kept in memory

mod error;
mod file;
mod memory;

pub use error::ReadError;
pub use file::{FileSink, read_table};
pub use memory::MemorySink;
