//! Recursive character splitter.
//!
//! Sizes and offsets are counted in characters, not bytes. Every chunk is an
//! exact slice of its document and consecutive chunks share `overlap`
//! characters, so a document can be rebuilt from its chunks.
use crate::config::ChunkingConfig;
use crate::error::Result;
use crate::types::{Chunk, Document};

pub struct Chunker {
    config: ChunkingConfig,
}

impl Default for Chunker {
    fn default() -> Self { Self { config: ChunkingConfig::default() } }
}

impl Chunker {
    pub fn new(config: ChunkingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ChunkingConfig { &self.config }

    /// Chunks of every document, in document order.
    pub fn split_documents(&self, documents: &[Document]) -> Vec<Chunk> {
        let chunks: Vec<Chunk> = documents.iter().flat_map(|d| self.split_document(d)).collect();
        tracing::info!(documents = documents.len(), chunks = chunks.len(), "chunking finished");
        chunks
    }

    pub fn split_document(&self, document: &Document) -> Vec<Chunk> {
        self.split_text(&document.content)
            .into_iter()
            .map(|(offset, text)| Chunk { text: text.to_string(), source_id: document.source_id.clone(), offset })
            .collect()
    }

    /// Split `text` into `(char_offset, slice)` windows.
    pub fn split_text<'a>(&self, text: &'a str) -> Vec<(usize, &'a str)> {
        // byte position of every char boundary, including the end of the text
        let bounds: Vec<usize> = text.char_indices().map(|(i, _)| i).chain(std::iter::once(text.len())).collect();
        let total = bounds.len() - 1;
        let max = self.config.max_chunk_size;
        let overlap = self.config.overlap;

        let mut out = Vec::new();
        let mut start = 0usize;
        while start < total {
            if total - start <= max {
                out.push((start, &text[bounds[start]..]));
                break;
            }
            let window = &text[bounds[start]..bounds[start + max]];
            let cut = self.find_cut(window).unwrap_or(max);
            let end = start + cut;
            out.push((start, &text[bounds[start]..bounds[end]]));
            // cut > overlap, so the next window always moves forward
            start = end - overlap;
        }
        out
    }

    /// Character count of the best prefix of `window`, ending just after the
    /// highest-priority separator that still leaves room beyond the overlap.
    fn find_cut(&self, window: &str) -> Option<usize> {
        for sep in &self.config.separators {
            if let Some(byte_idx) = window.rfind(sep.as_str()) {
                let cut = window[..byte_idx].chars().count() + sep.chars().count();
                if cut > self.config.overlap {
                    return Some(cut);
                }
            }
        }
        None
    }
}
