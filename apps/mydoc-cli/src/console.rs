use std::sync::Mutex;

use indicatif::{ProgressBar, ProgressStyle};

use mydoc_core::error::{DocumentReadError, PipelineError};
use mydoc_core::types::{Document, QueryResult, Stage};
use mydoc_rag::QueryObserver;

/// Prints query progress as status lines, with a bar while chunks are embedded.
pub struct ConsoleObserver {
    model: String,
    bar: Mutex<Option<ProgressBar>>,
}

impl ConsoleObserver {
    pub fn new(model: impl Into<String>) -> Self {
        Self { model: model.into(), bar: Mutex::new(None) }
    }

    fn clear_bar(&self) {
        if let Ok(mut bar) = self.bar.lock() {
            if let Some(pb) = bar.take() { pb.finish_and_clear(); }
        }
    }
}

impl QueryObserver for ConsoleObserver {
    fn stage_entered(&self, stage: Stage) {
        match stage {
            Stage::Loading => println!("📂 Loading documents..."),
            Stage::Retrieving => println!("🔍 Searching for relevant context..."),
            Stage::Generating => println!("🤖 Generating answer with {}...", self.model),
            Stage::Failed => self.clear_bar(),
            _ => {}
        }
    }

    fn document_loaded(&self, document: &Document) {
        println!("Loaded: {}", document.source_id);
    }

    fn document_failed(&self, error: &DocumentReadError) {
        println!("{}", error);
    }

    fn documents_loaded(&self, count: usize) {
        println!("Total documents loaded: {}", count);
    }

    fn chunks_created(&self, count: usize) {
        println!("Total chunks created: {}", count);
    }

    fn embedding_progress(&self, done: usize, total: usize) {
        let Ok(mut bar) = self.bar.lock() else { return };
        if done == 0 {
            let pb = ProgressBar::new(total as u64);
            if let Ok(style) = ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} chunks ({percent}%) {msg}")
            {
                pb.set_style(style.progress_chars("#>-"));
            }
            pb.set_message("embedding");
            *bar = Some(pb);
        }
        if let Some(pb) = bar.as_ref() {
            pb.set_position(done as u64);
            if done >= total {
                pb.finish_with_message("embedded");
                *bar = None;
            }
        }
    }

    fn index_reused(&self, entries: usize) {
        println!("Reusing stored index ({} chunks)", entries);
    }

    fn chunks_retrieved(&self, count: usize) {
        println!("Retrieved {} relevant chunks", count);
    }

    fn query_failed(&self, _error: &PipelineError) {
        self.clear_bar();
    }
}

/// Answer followed by the cited sources and a preview of each chunk.
pub fn render_result(result: &QueryResult, preview_chars: usize) -> String {
    let mut out = format!("\n💬 Answer:\n{}\n", result.answer);
    let citations = result.citations(preview_chars);
    if !citations.is_empty() {
        out.push_str("\n📚 Sources used:\n");
        for (i, c) in citations.iter().enumerate() {
            out.push_str(&format!("\n[{}] {}\n{}\n", i + 1, c.source_id, c.preview));
        }
    }
    out
}

pub fn render_json(question: &str, result: &QueryResult, preview_chars: usize) -> anyhow::Result<String> {
    let value = serde_json::json!({
        "question": question,
        "answer": result.answer,
        "sources": result.citations(preview_chars),
    });
    Ok(serde_json::to_string_pretty(&value)?)
}
