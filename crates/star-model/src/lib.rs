//! Star schema model definitions shared by the ETL crates.
//!
//! This crate owns the vocabulary of the engine: the dimension and fact
//! definitions, the write-mode contract per output table, the abstract
//! record source and table sink, and the error taxonomy.

pub mod config;
pub mod error;
pub mod quality;
pub mod report;
pub mod sink;
pub mod source;
pub mod star;

pub use config::{ConfigError, EtlConfig, OutputFormat};
pub use error::{EtlError, Result, SchemaError, SinkError, SourceError};
pub use quality::{DataQualityReport, JoinResolutionGap};
pub use report::{BatchReport, TableWrite};
pub use sink::TableSink;
pub use source::RecordSource;
pub use star::{
    ColumnType, DIM_CUSTOMER_FINANCIALS, DIM_LOCATION, DIM_PROPERTY, DimensionDef,
    FACT_PROPERTY_PURCHASE, FactDef, OutputTable, PREVIOUS_OWNERS, StarModel, WriteMode,
};
