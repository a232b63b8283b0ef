//! Layered configuration and path helpers.
//!
//! Uses Figment to merge built-in defaults + `config.toml` + `config.<env>.toml`
//! + `APP_*` env vars (nested keys separated by `__`, e.g. `APP_LLM__MODEL`).
//! Provides helpers to expand `~` and `${VAR}` and to resolve relative paths
//! against a known base directory.
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

pub struct Config {
    figment: Figment,
    env_name: String,
}

impl Config {
    /// Load from the current working directory.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(Path::new("."))
    }

    /// Load with config files looked up in `base`.
    pub fn load_from(base: &Path) -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file(base.join("config.toml")));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file(base.join("config.dev.toml"))),
            "prod" | "production" => figment = figment.merge(Toml::file(base.join("config.prod.toml"))),
            "test" | "testing" => figment = figment.merge(Toml::file(base.join("config.test.toml"))),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        Ok(Self { figment, env_name })
    }

    /// Wrap an existing figment, mostly for tests and embedding callers.
    pub fn from_figment(figment: Figment) -> Self {
        Self { figment, env_name: "test".to_string() }
    }

    /// Extract and validate the full typed settings.
    pub fn settings(&self) -> anyhow::Result<Settings> {
        let settings: Settings = self
            .figment
            .extract()
            .map_err(|e| anyhow::anyhow!("Failed to extract settings: {}", e))?;
        settings.validate()?;
        Self::validate_for_env(&settings, &self.env_name)?;
        Ok(settings)
    }

    fn validate_for_env(settings: &Settings, env: &str) -> Result<()> {
        match env {
            "prod" | "production" if settings.embedding.use_fake => Err(Error::InvalidConfig(
                "fake embeddings are not allowed in production".to_string(),
            )),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub docs: DocsConfig,
    pub chunking: ChunkingConfig,
    pub embedding: EmbeddingConfig,
    pub index: IndexConfig,
    pub retrieval: RetrievalConfig,
    pub llm: LlmConfig,
    pub display: DisplayConfig,
}

impl Settings {
    pub fn validate(&self) -> Result<()> {
        self.chunking.validate()?;
        if self.docs.extensions.is_empty() {
            return Err(Error::InvalidConfig("docs.extensions must not be empty".to_string()));
        }
        if self.embedding.fake_dim == 0 || self.embedding.max_len == 0 {
            return Err(Error::InvalidConfig("embedding.fake_dim and embedding.max_len must be at least 1".to_string()));
        }
        if self.retrieval.top_k == 0 {
            return Err(Error::InvalidConfig("retrieval.top_k must be at least 1".to_string()));
        }
        if !self.llm.temperature.is_finite() || self.llm.temperature < 0.0 {
            return Err(Error::InvalidConfig(format!("llm.temperature must be >= 0, got {}", self.llm.temperature)));
        }
        if self.llm.timeout_secs == 0 {
            return Err(Error::InvalidConfig("llm.timeout_secs must be at least 1".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DocsConfig {
    pub dir: String,
    pub extensions: Vec<String>,
    pub recursive: bool,
}

impl Default for DocsConfig {
    fn default() -> Self {
        Self { dir: "docs".to_string(), extensions: vec!["txt".to_string()], recursive: false }
    }
}

/// Character-based splitting parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    pub max_chunk_size: usize,
    pub overlap: usize,
    /// Cut points in priority order.
    pub separators: Vec<String>,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_chunk_size: 800,
            overlap: 100,
            separators: vec!["\n\n".to_string(), "\n".to_string(), ".".to_string(), " ".to_string()],
        }
    }
}

impl ChunkingConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_chunk_size == 0 {
            return Err(Error::InvalidConfig("chunking.max_chunk_size must be at least 1".to_string()));
        }
        if self.overlap >= self.max_chunk_size {
            return Err(Error::InvalidConfig(format!(
                "chunking.overlap ({}) must be smaller than chunking.max_chunk_size ({})",
                self.overlap, self.max_chunk_size
            )));
        }
        if self.separators.iter().any(String::is_empty) {
            return Err(Error::InvalidConfig("chunking.separators must not contain empty strings".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Hugging Face repository id of the sentence-embedding model.
    pub model: String,
    pub revision: String,
    /// Local directory holding `config.json`, `tokenizer.json` and weights.
    /// When unset the files are fetched through the Hugging Face cache.
    pub model_dir: Option<String>,
    pub max_len: usize,
    pub use_fake: bool,
    pub fake_dim: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: "sentence-transformers/all-MiniLM-L6-v2".to_string(),
            revision: "main".to_string(),
            model_dir: None,
            max_len: 256,
            use_fake: false,
            fake_dim: 384,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Persistence {
    /// Rebuild the index for every query.
    #[default]
    Ephemeral,
    /// Keep entries in a LanceDB table and reuse them while the corpus is unchanged.
    Lancedb,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    #[default]
    Cosine,
    L2,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    pub persistence: Persistence,
    pub path: String,
    pub table: String,
    pub metric: Metric,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            persistence: Persistence::Ephemeral,
            path: ".mydoc/lancedb".to_string(),
            table: "chunks".to_string(),
            metric: Metric::Cosine,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    pub top_k: usize,
    /// Still call the model when retrieval comes back empty.
    pub allow_empty_context: bool,
}

impl Default for RetrievalConfig {
    fn default() -> Self { Self { top_k: 3, allow_empty_context: false } }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            model: "gemma3".to_string(),
            temperature: 0.3,
            timeout_secs: 120,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub preview_chars: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self { Self { preview_chars: 500 } }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after expansion.
/// If `p` is absolute, it's returned as-is; otherwise `base.join(p)` is returned.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}
