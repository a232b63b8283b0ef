//! mydoc-llm
//!
//! The generation stage: builds the question-answering prompt and sends it
//! to a locally hosted Ollama model.

pub mod generator;
pub mod ollama;
pub mod prompt;

pub use generator::AnswerGenerator;
pub use ollama::OllamaClient;
pub use prompt::PromptBuilder;
