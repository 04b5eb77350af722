//! Dimensional-modeling engine.
//!
//! Turns a flat batch of property-purchase records into a star schema:
//! deduplicated dimension tables keyed by surrogate keys, and a fact table
//! that references them.

pub mod dimension;
pub mod fact;
pub mod keys;
pub mod natural_key;
pub mod pipeline;
pub mod projection;

pub use dimension::{DimensionTable, extract_dimension, extract_dimensions};
pub use fact::{FactTable, assemble_facts, resolve_keys};
pub use keys::{KeyAllocator, SequentialKeyAllocator};
pub use natural_key::{KeyValue, NaturalKey, natural_keys};
pub use pipeline::{PipelineOptions, StarPipeline, StarSchema};
pub use projection::{conform_types, project_columns, require_columns, validate_schema};
