use std::path::PathBuf;

use thiserror::Error;

use crate::types::Stage;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// A single file that could not be loaded. Never fatal on its own.
#[derive(Debug, Error)]
#[error("Error reading {}: {source}", path.display())]
pub struct DocumentReadError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// Fatal outcome of a query. Each variant belongs to the stage that raised it.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("No documents found in '{}'", dir.display())]
    EmptyCorpus { dir: PathBuf },

    #[error("Embedding failed: {0}")]
    Embedding(String),

    /// Storage or search failure. `stage` is where it happened: a stored
    /// index is looked up while embedding, searched while retrieving.
    #[error("Vector index failed while {stage}: {message}")]
    Index { stage: Stage, message: String },

    #[error("No context could be retrieved for the question")]
    NoContext,

    #[error("Generation failed: {0}")]
    Generation(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Query cancelled before {stage}")]
    Cancelled { stage: Stage },
}

impl PipelineError {
    /// The stage the query was in when this error was raised.
    pub fn stage(&self) -> Stage {
        match self {
            PipelineError::EmptyCorpus { .. } => Stage::Loading,
            PipelineError::InvalidConfig(_) => Stage::Chunking,
            PipelineError::Embedding(_) => Stage::Embedding,
            PipelineError::Index { stage, .. } => *stage,
            PipelineError::NoContext => Stage::Retrieving,
            PipelineError::Generation(_) => Stage::Generating,
            PipelineError::Cancelled { stage } => *stage,
        }
    }
}

