//! The question-answering run: load, chunk, embed, index, retrieve, generate.
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use tokio_util::sync::CancellationToken;

use mydoc_core::config::{expand_path, Persistence, Settings};
use mydoc_core::error::PipelineError;
use mydoc_core::loader::{DocumentLoader, LoadReport};
use mydoc_core::traits::{Embedder, LanguageModel, VectorIndex};
use mydoc_core::types::{IndexEntry, QueryResult, Stage};
use mydoc_core::Chunker;
use mydoc_embed::get_default_embedder;
use mydoc_llm::{AnswerGenerator, OllamaClient};
use mydoc_vector::{corpus_fingerprint, InMemoryIndex, LanceStore};

use crate::context::QueryContext;
use crate::observer::{NoopObserver, QueryObserver};

const EMBED_BATCH: usize = 32;

/// Shared, read-only services for answering questions over a documents folder.
pub struct Pipeline {
    settings: Settings,
    docs_dir: PathBuf,
    loader: DocumentLoader,
    chunker: Chunker,
    embedder: Arc<dyn Embedder>,
    generator: AnswerGenerator,
    store: Option<LanceStore>,
}

impl Pipeline {
    pub fn new(
        settings: Settings,
        embedder: Arc<dyn Embedder>,
        model: Arc<dyn LanguageModel>,
    ) -> Result<Self, PipelineError> {
        settings.validate().map_err(|e| PipelineError::InvalidConfig(e.to_string()))?;
        let chunker = Chunker::new(settings.chunking.clone()).map_err(|e| PipelineError::InvalidConfig(e.to_string()))?;
        let store = match settings.index.persistence {
            Persistence::Ephemeral => None,
            Persistence::Lancedb => Some(LanceStore::new(expand_path(&settings.index.path), &settings.index.table)),
        };
        Ok(Self {
            docs_dir: expand_path(&settings.docs.dir),
            loader: DocumentLoader::from_config(&settings.docs),
            chunker,
            generator: AnswerGenerator::new(model, settings.llm.temperature),
            embedder,
            store,
            settings,
        })
    }

    /// Build the configured embedder and an Ollama client.
    pub fn from_settings(settings: Settings) -> Result<Self> {
        let embedder: Arc<dyn Embedder> = Arc::from(get_default_embedder(&settings.embedding)?);
        let model = Arc::new(OllamaClient::new(&settings.llm)?);
        Ok(Self::new(settings, embedder, model)?)
    }

    pub fn settings(&self) -> &Settings { &self.settings }

    pub fn docs_dir(&self) -> &Path { &self.docs_dir }

    pub fn embedder_id(&self) -> &str { self.embedder.embedder_id() }

    pub fn model_id(&self) -> &str { self.generator.model_id() }

    /// Read the documents folder without running a query.
    pub fn load_documents(&self) -> LoadReport { self.loader.load_dir(&self.docs_dir) }

    pub async fn ask(&self, question: &str, cancel: &CancellationToken) -> Result<QueryResult, PipelineError> {
        self.ask_with(question, cancel, &NoopObserver).await
    }

    /// Answer `question`, reporting progress to `observer`. A failure in any
    /// stage ends the query in `Failed`; no partial result is returned.
    pub async fn ask_with(
        &self,
        question: &str,
        cancel: &CancellationToken,
        observer: &dyn QueryObserver,
    ) -> Result<QueryResult, PipelineError> {
        let start = Instant::now();
        let mut ctx = QueryContext::new(question);
        match self.run(&mut ctx, cancel, observer).await {
            Ok(result) => {
                ctx.finish(Stage::Done, observer);
                tracing::info!(elapsed_ms = start.elapsed().as_millis() as u64, cited = result.cited_chunks.len(), "query answered");
                Ok(result)
            }
            Err(err) => {
                tracing::error!(stage = %err.stage(), "query failed: {}", err);
                ctx.finish(Stage::Failed, observer);
                observer.query_failed(&err);
                Err(err)
            }
        }
    }

    async fn run(
        &self,
        ctx: &mut QueryContext,
        cancel: &CancellationToken,
        observer: &dyn QueryObserver,
    ) -> Result<QueryResult, PipelineError> {
        ctx.advance(Stage::Loading, cancel, observer)?;
        self.load(ctx, observer)?;

        ctx.advance(Stage::Chunking, cancel, observer)?;
        ctx.chunks = self.chunker.split_documents(&ctx.documents);
        observer.chunks_created(ctx.chunks.len());

        ctx.advance(Stage::Embedding, cancel, observer)?;
        self.embed(ctx, observer).await?;

        ctx.advance(Stage::Indexing, cancel, observer)?;
        self.index(ctx).await?;

        ctx.advance(Stage::Retrieving, cancel, observer)?;
        self.retrieve(ctx)?;
        observer.chunks_retrieved(ctx.hits.len());

        ctx.advance(Stage::Generating, cancel, observer)?;
        let cited_chunks: Vec<_> = ctx.hits.iter().map(|h| h.chunk.clone()).collect();
        let answer = self
            .generator
            .answer(&ctx.question, &cited_chunks)
            .await
            .map_err(|e| PipelineError::Generation(format!("{:#}", e)))?;
        Ok(QueryResult { answer, cited_chunks })
    }

    fn load(&self, ctx: &mut QueryContext, observer: &dyn QueryObserver) -> Result<(), PipelineError> {
        let report = self.load_documents();
        for failure in &report.failures {
            observer.document_failed(failure);
        }
        for document in &report.documents {
            observer.document_loaded(document);
        }
        observer.documents_loaded(report.documents.len());
        if report.is_empty() {
            return Err(PipelineError::EmptyCorpus { dir: self.docs_dir.clone() });
        }
        ctx.documents = report.documents;
        Ok(())
    }

    /// Fill `ctx.entries`, from storage when the corpus is unchanged and by
    /// running the embedder otherwise.
    async fn embed(&self, ctx: &mut QueryContext, observer: &dyn QueryObserver) -> Result<(), PipelineError> {
        if let Some(store) = &self.store {
            let fingerprint = corpus_fingerprint(self.embedder.embedder_id(), self.chunker.config(), &ctx.documents);
            let stored = store.load(&fingerprint).await.map_err(|e| index_error(Stage::Embedding, e))?;
            ctx.fingerprint = Some(fingerprint);
            if let Some(entries) = stored {
                observer.index_reused(entries.len());
                ctx.entries = entries;
                ctx.reused = true;
                return Ok(());
            }
        }

        let total = ctx.chunks.len();
        let dim = self.embedder.dim();
        let start = Instant::now();
        let mut entries = Vec::with_capacity(total);
        observer.embedding_progress(0, total);
        for batch in ctx.chunks.chunks(EMBED_BATCH) {
            let texts: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();
            let vectors = self.embedder.embed_batch(&texts).map_err(|e| PipelineError::Embedding(format!("{:#}", e)))?;
            if vectors.len() != batch.len() {
                return Err(PipelineError::Embedding(format!(
                    "embedder returned {} vectors for {} texts",
                    vectors.len(),
                    batch.len()
                )));
            }
            for (chunk, vector) in batch.iter().zip(vectors) {
                check_dim(dim, vector.len())?;
                entries.push(IndexEntry::new(chunk.clone(), vector));
            }
            observer.embedding_progress(entries.len(), total);
        }
        tracing::info!(chunks = total, elapsed_ms = start.elapsed().as_millis() as u64, "embedding finished");
        ctx.entries = entries;
        Ok(())
    }

    async fn index(&self, ctx: &mut QueryContext) -> Result<(), PipelineError> {
        let dim = self.embedder.dim();
        if let (Some(store), Some(fingerprint), false) = (&self.store, &ctx.fingerprint, ctx.reused) {
            store
                .save(fingerprint, dim, &ctx.entries)
                .await
                .map_err(|e| index_error(Stage::Indexing, e))?;
        }
        let entries = std::mem::take(&mut ctx.entries);
        let index = InMemoryIndex::from_entries(dim, self.settings.index.metric, entries)
            .map_err(|e| index_error(Stage::Indexing, e))?;
        tracing::info!(entries = index.len(), "vector index ready");
        ctx.index = Some(index);
        Ok(())
    }

    fn retrieve(&self, ctx: &mut QueryContext) -> Result<(), PipelineError> {
        let query = self
            .embedder
            .embed_batch(std::slice::from_ref(&ctx.question))
            .map_err(|e| PipelineError::Embedding(format!("{:#}", e)))?
            .pop()
            .ok_or_else(|| PipelineError::Embedding("no vector returned for the question".to_string()))?;
        check_dim(self.embedder.dim(), query.len())?;

        let index = ctx
            .index
            .as_ref()
            .ok_or_else(|| index_error(Stage::Retrieving, anyhow::anyhow!("index was not built")))?;
        let top_k = self.settings.retrieval.top_k;
        ctx.hits = index.search(&query, top_k).map_err(|e| index_error(Stage::Retrieving, e))?;
        tracing::info!(top_k, hits = ctx.hits.len(), "retrieved context");
        for hit in &ctx.hits {
            tracing::debug!(source = %hit.chunk.source_id, offset = hit.chunk.offset, distance = hit.distance, "hit");
        }
        if ctx.hits.is_empty() && !self.settings.retrieval.allow_empty_context {
            return Err(PipelineError::NoContext);
        }
        Ok(())
    }
}

fn index_error(stage: Stage, err: anyhow::Error) -> PipelineError {
    PipelineError::Index { stage, message: format!("{:#}", err) }
}

fn check_dim(expected: usize, got: usize) -> Result<(), PipelineError> {
    if got != expected {
        return Err(PipelineError::Embedding(format!(
            "embedder returned a {}-dimensional vector, expected {}",
            got, expected
        )));
    }
    Ok(())
}
