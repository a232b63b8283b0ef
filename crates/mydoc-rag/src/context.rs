//! Mutable state of a single query.
use mydoc_core::error::PipelineError;
use mydoc_core::types::{Chunk, Document, IndexEntry, SearchHit, Stage};
use mydoc_vector::InMemoryIndex;
use tokio_util::sync::CancellationToken;

use crate::observer::QueryObserver;

/// Everything one `ask` produces along the way. Created fresh per query and
/// never shared, so concurrent queries cannot see each other.
pub struct QueryContext {
    pub question: String,
    pub documents: Vec<Document>,
    pub chunks: Vec<Chunk>,
    /// Embedded chunks waiting to be indexed, fresh or loaded from storage.
    pub entries: Vec<IndexEntry>,
    /// Set when `entries` came from storage and need not be saved again.
    pub reused: bool,
    pub fingerprint: Option<String>,
    pub index: Option<InMemoryIndex>,
    pub hits: Vec<SearchHit>,
    stage: Stage,
}

impl QueryContext {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            documents: Vec::new(),
            chunks: Vec::new(),
            entries: Vec::new(),
            reused: false,
            fingerprint: None,
            index: None,
            hits: Vec::new(),
            stage: Stage::Idle,
        }
    }

    pub fn stage(&self) -> Stage { self.stage }

    /// Move to `next`, unless the query was cancelled in the meantime.
    pub fn advance(
        &mut self,
        next: Stage,
        cancel: &CancellationToken,
        observer: &dyn QueryObserver,
    ) -> Result<(), PipelineError> {
        debug_assert!(!self.stage.is_terminal(), "query already finished in {}", self.stage);
        if cancel.is_cancelled() {
            tracing::info!(stage = %next, "query cancelled");
            return Err(PipelineError::Cancelled { stage: next });
        }
        tracing::info!(from = %self.stage, to = %next, "stage transition");
        self.stage = next;
        observer.stage_entered(next);
        Ok(())
    }

    /// Terminal transition; skips the cancellation check.
    pub fn finish(&mut self, stage: Stage, observer: &dyn QueryObserver) {
        debug_assert!(stage.is_terminal());
        tracing::info!(from = %self.stage, to = %stage, "stage transition");
        self.stage = stage;
        observer.stage_entered(stage);
    }
}
