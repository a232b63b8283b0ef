//! Ollama HTTP client. One non-streaming request per call, no retries.

use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use mydoc_core::config::LlmConfig;
use mydoc_core::traits::LanguageModel;

pub struct OllamaClient {
    client: Client,
    base_url: String,
    model: String,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Serialize)]
struct GenerateOptions {
    temperature: f32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

#[derive(Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelTag>,
}

#[derive(Deserialize)]
struct ModelTag {
    name: String,
}

impl OllamaClient {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }

    pub fn base_url(&self) -> &str { &self.base_url }

    /// Names of the models the service has pulled. Errors when the service
    /// cannot be reached.
    pub async fn list_models(&self) -> Result<Vec<String>> {
        let url = format!("{}/api/tags", self.base_url);
        let response = self.client.get(&url).send().await.with_context(|| format!("Ollama unreachable at {}", self.base_url))?;
        if !response.status().is_success() {
            return Err(anyhow!("Listing models failed: HTTP {}", response.status()));
        }
        let tags: TagsResponse = response.json().await.context("Failed to parse model list")?;
        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    /// Whether the service answers at all.
    pub async fn health_check(&self) -> bool {
        self.list_models().await.is_ok()
    }
}

#[async_trait::async_trait]
impl LanguageModel for OllamaClient {
    fn model_id(&self) -> &str { &self.model }

    async fn generate(&self, prompt: &str, temperature: f32) -> Result<String> {
        let url = format!("{}/api/generate", self.base_url);
        let request = GenerateRequest { model: &self.model, prompt, stream: false, options: GenerateOptions { temperature } };
        tracing::info!(model = %self.model, temperature, "requesting generation");

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| anyhow!("Generation request to {} failed: {}", self.base_url, e))?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("Generation failed: HTTP {} - {}", status, body));
        }
        let generated: GenerateResponse = response.json().await.context("Failed to parse generation response")?;
        Ok(generated.response)
    }
}
