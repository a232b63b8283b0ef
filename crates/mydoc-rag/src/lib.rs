//! mydoc-rag
//!
//! Ties loading, chunking, embedding, retrieval and generation together into
//! one question-answering run.

pub mod context;
pub mod observer;
pub mod pipeline;

pub use context::QueryContext;
pub use observer::{NoopObserver, QueryObserver};
pub use pipeline::Pipeline;
pub use tokio_util::sync::CancellationToken;
