//! Songplays ETL Library
//!
//! Loads song metadata and user activity logs into a SQLite star schema.
//! The library exposes the internal modules for testing and reuse by the
//! `songplays-etl` binary.

pub mod config;
pub mod ingest;
pub mod pipeline;
pub mod sqlite_persistence;
pub mod transform;
pub mod warehouse;

// Re-export commonly used types for convenience
pub use config::{AppConfig, CliConfig, FileConfig};
pub use pipeline::{run_pipeline, PipelineSummary};
pub use warehouse::open_warehouse;
