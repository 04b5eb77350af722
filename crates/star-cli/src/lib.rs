//! Batch driver for the property-purchase star schema.

pub mod cli;
pub mod commands;
pub mod logging;
pub mod summary;
pub mod types;
