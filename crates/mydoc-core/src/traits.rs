use crate::types::{Chunk, SearchHit};

/// Maps text to fixed-dimension vectors.
pub trait Embedder: Send + Sync {
    /// Stable identifier for model and dimension (e.g. `minilm:all-MiniLM-L6-v2:d384`).
    fn embedder_id(&self) -> &str;
    fn dim(&self) -> usize;
    fn max_len(&self) -> usize;
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>>;
}

/// Nearest-neighbour store over chunk embeddings.
pub trait VectorIndex: Send + Sync {
    fn dim(&self) -> usize;
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool { self.len() == 0 }
    fn insert(&mut self, chunk: Chunk, vector: Vec<f32>) -> anyhow::Result<()>;
    /// Up to `k` closest entries, closest first.
    fn search(&self, query: &[f32], k: usize) -> anyhow::Result<Vec<SearchHit>>;
}

/// A text-generation service called as a black box.
#[async_trait::async_trait]
pub trait LanguageModel: Send + Sync {
    fn model_id(&self) -> &str;
    async fn generate(&self, prompt: &str, temperature: f32) -> anyhow::Result<String>;
}
