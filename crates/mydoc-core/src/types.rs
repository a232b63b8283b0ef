//! Domain records passed between the pipeline stages.

use serde::{Deserialize, Serialize};

/// Ellipsis appended to truncated citation previews.
const PREVIEW_ELLIPSIS: &str = "...";

/// A loaded source file.
///
/// - `content`: the full UTF-8 text of the file
/// - `source_id`: path relative to the documents folder (the file name for a flat folder)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub content: String,
    pub source_id: String,
}

impl Document {
    pub fn new(source_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self { content: content.into(), source_id: source_id.into() }
    }
}

/// A bounded slice of one document, the unit of retrieval.
///
/// `text` is an exact slice of the parent document's content starting at
/// character `offset`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub text: String,
    pub source_id: String,
    pub offset: usize,
}

/// One stored vector with the chunk it was computed from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub vector: Vec<f32>,
    pub chunk: Chunk,
    pub source_id: String,
}

impl IndexEntry {
    pub fn new(chunk: Chunk, vector: Vec<f32>) -> Self {
        let source_id = chunk.source_id.clone();
        Self { vector, chunk, source_id }
    }
}

/// A search result. Lower `distance` is closer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub chunk: Chunk,
    pub distance: f32,
}

/// The answer to one question together with the chunks it was grounded on,
/// in retrieval order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub answer: String,
    pub cited_chunks: Vec<Chunk>,
}

/// Display form of a cited chunk: its source and a bounded preview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    pub source_id: String,
    pub preview: String,
}

impl QueryResult {
    /// Render the cited chunks, keeping at most `preview_chars` characters of each.
    pub fn citations(&self, preview_chars: usize) -> Vec<Citation> {
        self.cited_chunks
            .iter()
            .map(|c| Citation { source_id: c.source_id.clone(), preview: preview(&c.text, preview_chars) })
            .collect()
    }

    /// Distinct source ids of the cited chunks in first-cited order.
    pub fn sources(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for c in &self.cited_chunks {
            if !out.contains(&c.source_id.as_str()) { out.push(&c.source_id); }
        }
        out
    }
}

fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}{}", &text[..byte_idx], PREVIEW_ELLIPSIS),
        None => text.to_string(),
    }
}

/// Lifecycle of a single query.
///
/// Stages advance strictly in declaration order; any stage may jump to
/// `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    Idle,
    Loading,
    Chunking,
    Embedding,
    Indexing,
    Retrieving,
    Generating,
    Done,
    Failed,
}

impl Stage {
    pub fn is_terminal(self) -> bool { matches!(self, Stage::Done | Stage::Failed) }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Idle => "idle",
            Stage::Loading => "loading",
            Stage::Chunking => "chunking",
            Stage::Embedding => "embedding",
            Stage::Indexing => "indexing",
            Stage::Retrieving => "retrieving",
            Stage::Generating => "generating",
            Stage::Done => "done",
            Stage::Failed => "failed",
        };
        f.write_str(name)
    }
}
