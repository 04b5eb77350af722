//! Record sources for the star schema engine.

pub mod csv_source;
pub mod discovery;
pub mod memory;

pub use csv_source::CsvSource;
pub use discovery::list_csv_files;
pub use memory::MemorySource;
