use mydoc_core::error::{DocumentReadError, PipelineError};
use mydoc_core::types::{Document, Stage};

/// Progress callbacks for one query. Every method defaults to doing nothing.
pub trait QueryObserver: Send + Sync {
    fn stage_entered(&self, _stage: Stage) {}
    fn document_loaded(&self, _document: &Document) {}
    fn document_failed(&self, _error: &DocumentReadError) {}
    fn documents_loaded(&self, _count: usize) {}
    fn chunks_created(&self, _count: usize) {}
    /// `done` of `total` chunks embedded so far.
    fn embedding_progress(&self, _done: usize, _total: usize) {}
    /// A stored index matched the corpus and the embedding pass was skipped.
    fn index_reused(&self, _entries: usize) {}
    fn chunks_retrieved(&self, _count: usize) {}
    fn query_failed(&self, _error: &PipelineError) {}
}

pub struct NoopObserver;

impl QueryObserver for NoopObserver {}
