//! Prompt assembly for question answering over retrieved chunks.

use mydoc_core::types::Chunk;

const INSTRUCTIONS: &str = "Use the following pieces of context to answer the question at the end. \
If you don't know the answer, just say that you don't know, don't try to make up an answer.";

pub struct PromptBuilder;

impl PromptBuilder {
    /// Context chunks joined by blank lines, in retrieval order.
    pub fn build_context(chunks: &[Chunk]) -> String {
        chunks.iter().map(|c| c.text.as_str()).collect::<Vec<_>>().join("\n\n")
    }

    pub fn build_prompt(question: &str, chunks: &[Chunk]) -> String {
        format!(
            "{INSTRUCTIONS}\n\n{context}\n\nQuestion: {question}\nHelpful Answer:",
            context = Self::build_context(chunks),
            question = question.trim(),
        )
    }
}
