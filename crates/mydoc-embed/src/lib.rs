//! mydoc-embed
//!
//! Sentence embeddings for chunks and questions. The real model is a candle
//! BERT encoder (all-MiniLM-L6-v2 by default) with masked mean pooling; the
//! fake embedder hashes tokens and is meant for tests and offline development.
use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};
use std::time::Instant;

use candle_core::{DType, Device};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use tokenizers::Tokenizer;

use mydoc_core::config::{expand_path, EmbeddingConfig};
use mydoc_core::traits::Embedder;

pub mod device;
pub mod pool;
pub mod tokenize;

pub use pool::masked_mean_l2;
pub use tokenize::{tokenize_batch, BatchInputs};

const BATCH_SIZE: usize = 32;

/// Files needed to run a BERT-style embedding model.
#[derive(Debug, Clone)]
pub struct ModelFiles {
    pub config: PathBuf,
    pub tokenizer: PathBuf,
    pub weights: PathBuf,
}

impl ModelFiles {
    /// Look for the files inside a local directory, preferring safetensors weights.
    pub fn in_dir(dir: &Path) -> Result<Self> {
        let config = dir.join("config.json");
        let tokenizer = dir.join("tokenizer.json");
        let weights = ["model.safetensors", "pytorch_model.bin"]
            .iter()
            .map(|name| dir.join(name))
            .find(|p| p.exists())
            .ok_or_else(|| anyhow!("No model weights found in {}", dir.display()))?;
        for p in [&config, &tokenizer] {
            if !p.exists() { return Err(anyhow!("Missing model file {}", p.display())); }
        }
        Ok(Self { config, tokenizer, weights })
    }

    /// Fetch the files through the local Hugging Face cache.
    pub fn from_hub(model: &str, revision: &str) -> Result<Self> {
        use hf_hub::{api::sync::Api, Repo, RepoType};
        tracing::info!(model, revision, "resolving embedding model through the Hugging Face cache");
        let api = Api::new().context("Failed to initialize Hugging Face API")?;
        let repo = api.repo(Repo::with_revision(model.to_string(), RepoType::Model, revision.to_string()));
        let config = repo.get("config.json").context("Failed to fetch config.json")?;
        let tokenizer = repo.get("tokenizer.json").context("Failed to fetch tokenizer.json")?;
        let weights = repo
            .get("model.safetensors")
            .or_else(|_| repo.get("pytorch_model.bin"))
            .context("Failed to fetch model weights")?;
        Ok(Self { config, tokenizer, weights })
    }
}

pub struct MiniLmEmbedder {
    model: BertModel,
    tokenizer: Tokenizer,
    device: Device,
    id: String,
    dim: usize,
    max_len: usize,
    pad_id: u32,
}

impl MiniLmEmbedder {
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        let files = resolve_model_files(config)?;
        Self::load(&files, &config.model, config.max_len)
    }

    pub fn load(files: &ModelFiles, model_name: &str, max_len: usize) -> Result<Self> {
        let start = Instant::now();
        let device = device::select_device();
        let tokenizer = Tokenizer::from_file(&files.tokenizer)
            .map_err(|e| anyhow!("Failed to load tokenizer from {}: {}", files.tokenizer.display(), e))?;
        let pad_id = tokenizer.token_to_id("[PAD]").unwrap_or(0);

        let raw: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&files.config)?)?;
        let dim = raw
            .get("hidden_size")
            .and_then(serde_json::Value::as_u64)
            .ok_or_else(|| anyhow!("hidden_size missing from {}", files.config.display()))? as usize;
        let bert_config: BertConfig = serde_json::from_value(raw)?;

        let vb = if files.weights.extension().is_some_and(|e| e == "safetensors") {
            // SAFETY: the weights file is not modified while the model is alive.
            unsafe { VarBuilder::from_mmaped_safetensors(&[files.weights.clone()], DType::F32, &device)? }
        } else {
            VarBuilder::from_pth(&files.weights, DType::F32, &device)?
        };
        let model = BertModel::load(vb, &bert_config)?;
        let short_name = model_name.rsplit('/').next().unwrap_or(model_name);
        let id = format!("minilm:{}:d{}", short_name, dim);
        tracing::info!(model = model_name, dim, elapsed_ms = start.elapsed().as_millis() as u64, "embedding model loaded");
        Ok(Self { model, tokenizer, device, id, dim, max_len, pad_id })
    }

    fn embed_chunk(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let inputs = tokenize_batch(&self.tokenizer, texts, self.max_len, self.pad_id, &self.device)?;
        let hidden = self.model.forward(&inputs.input_ids, &inputs.token_type_ids, Some(&inputs.attention_mask))?;
        let pooled = masked_mean_l2(&hidden, &inputs.attention_mask)?;
        Ok(pooled.to_device(&Device::Cpu)?.to_vec2::<f32>()?)
    }
}

impl Embedder for MiniLmEmbedder {
    fn embedder_id(&self) -> &str { &self.id }
    fn dim(&self) -> usize { self.dim }
    fn max_len(&self) -> usize { self.max_len }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let start = Instant::now();
        let mut out = Vec::with_capacity(texts.len());
        for batch in texts.chunks(BATCH_SIZE) {
            out.extend(self.embed_chunk(batch)?);
        }
        tracing::debug!(texts = texts.len(), elapsed_ms = start.elapsed().as_millis() as u64, "embedded batch");
        Ok(out)
    }
}

/// Deterministic hashed bag-of-words vectors. Texts sharing words end up close.
pub struct FakeEmbedder {
    dim: usize,
    id: String,
}

impl FakeEmbedder {
    pub fn new(dim: usize) -> Self {
        Self { dim, id: format!("fake:xxh64:d{}", dim) }
    }

    fn embed_text(&self, text: &str) -> Vec<f32> {
        use std::hash::{Hash, Hasher};
        use twox_hash::XxHash64;
        let mut v = vec![0f32; self.dim];
        let tokens = text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .map(str::to_lowercase);
        for token in tokens {
            let mut hasher = XxHash64::with_seed(0);
            token.hash(&mut hasher);
            let h = hasher.finish();
            let idx = (h % self.dim as u64) as usize;
            v[idx] += 1.0 + ((h >> 32) as u32) as f32 / u32::MAX as f32;
        }
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut v { *x /= norm; }
        }
        v
    }
}

impl Embedder for FakeEmbedder {
    fn embedder_id(&self) -> &str { &self.id }
    fn dim(&self) -> usize { self.dim }
    fn max_len(&self) -> usize { usize::MAX }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }
}

/// Build the embedder selected by configuration.
///
/// `APP_USE_FAKE_EMBEDDINGS=1` forces the fake embedder regardless of config.
pub fn get_default_embedder(config: &EmbeddingConfig) -> Result<Box<dyn Embedder>> {
    let forced = std::env::var("APP_USE_FAKE_EMBEDDINGS")
        .ok()
        .is_some_and(|v| v == "1" || v.eq_ignore_ascii_case("true"));
    if config.use_fake || forced {
        tracing::info!(dim = config.fake_dim, "using FakeEmbedder");
        return Ok(Box::new(FakeEmbedder::new(config.fake_dim)));
    }
    Ok(Box::new(MiniLmEmbedder::new(config)?))
}

fn resolve_model_files(config: &EmbeddingConfig) -> Result<ModelFiles> {
    if let Some(dir) = &config.model_dir {
        let p = expand_path(dir);
        tracing::info!(dir = %p.display(), "using configured model dir");
        return ModelFiles::in_dir(&p);
    }
    for var in ["APP_MODEL_DIR", "MODEL_DIR"] {
        if let Ok(dir) = std::env::var(var) {
            let p = PathBuf::from(&dir);
            if p.exists() {
                tracing::info!(dir = %p.display(), "using model dir from {}", var);
                return ModelFiles::in_dir(&p);
            }
        }
    }
    ModelFiles::from_hub(&config.model, &config.revision)
}
