use anyhow::Result;
use std::sync::Arc;
use std::time::Instant;

use mydoc_core::traits::LanguageModel;
use mydoc_core::types::Chunk;

use crate::prompt::PromptBuilder;

/// Answers a question from retrieved chunks with a fixed sampling temperature.
#[derive(Clone)]
pub struct AnswerGenerator {
    model: Arc<dyn LanguageModel>,
    temperature: f32,
}

impl AnswerGenerator {
    pub fn new(model: Arc<dyn LanguageModel>, temperature: f32) -> Self {
        Self { model, temperature }
    }

    pub fn model_id(&self) -> &str { self.model.model_id() }

    pub async fn answer(&self, question: &str, context: &[Chunk]) -> Result<String> {
        let prompt = PromptBuilder::build_prompt(question, context);
        tracing::debug!(prompt_chars = prompt.len(), context_chunks = context.len(), "prompt assembled");
        let start = Instant::now();
        let answer = self.model.generate(&prompt, self.temperature).await?;
        tracing::info!(model = self.model.model_id(), elapsed_ms = start.elapsed().as_millis() as u64, "answer generated");
        Ok(answer.trim().to_string())
    }
}
