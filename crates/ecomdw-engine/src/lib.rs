//! Load orchestration and batch loading for the e-commerce star-schema
//! warehouse.
//!
//! A run extracts each source table, applies the per-entity transform,
//! maps it onto the target table's column layout and loads it through a
//! [`TableLoader`](loader::TableLoader), in foreign-key order:
//! reference data, then dimensions, then facts.

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod batch;
pub mod config;
pub mod connection;
pub mod descriptor;
pub mod error;
pub mod extract;
pub mod loader;
pub mod orchestrator;
pub mod result;
pub mod transform;

// Re-export public API for convenience
pub use config::PipelineConfig;
pub use connection::ConnectionManager;
pub use descriptor::{Entity, TableDescriptor};
pub use error::{
    ConfigError, ExtractError, LoadError, PipelineError, RunError, ValidationError,
};
pub use extract::{CsvExtractor, Extractor, Table};
pub use loader::{DescriptorLoader, LoaderSet, TableLoader};
pub use orchestrator::{Pipeline, RunState};
pub use result::{RunSummary, TableLoad};
