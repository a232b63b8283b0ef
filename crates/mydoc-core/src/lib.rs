//! mydoc-core
//!
//! Shared records, traits, errors and configuration for the mydoc pipeline,
//! plus the two stages that need no external model: document loading and
//! chunking.

pub mod chunker;
pub mod config;
pub mod error;
pub mod loader;
pub mod traits;
pub mod types;

pub use chunker::Chunker;
pub use error::{DocumentReadError, Error, PipelineError};
pub use loader::{DocumentLoader, LoadReport};
pub use types::{Chunk, Citation, Document, IndexEntry, QueryResult, SearchHit, Stage};
