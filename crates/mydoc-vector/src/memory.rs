//! Exact in-memory vector index.
use anyhow::{anyhow, Result};

use mydoc_core::config::Metric;
use mydoc_core::traits::VectorIndex;
use mydoc_core::types::{Chunk, IndexEntry, SearchHit};

/// Brute-force index. Search scans every entry, so results are exact and
/// equal distances keep insertion order.
#[derive(Debug, Clone)]
pub struct InMemoryIndex {
    dim: usize,
    metric: Metric,
    entries: Vec<IndexEntry>,
}

impl InMemoryIndex {
    pub fn new(dim: usize, metric: Metric) -> Self {
        Self { dim, metric, entries: Vec::new() }
    }

    /// Rebuild an index from stored entries, keeping their order.
    pub fn from_entries(dim: usize, metric: Metric, entries: Vec<IndexEntry>) -> Result<Self> {
        let mut index = Self::new(dim, metric);
        for entry in entries {
            index.check_dim(entry.vector.len())?;
            index.entries.push(entry);
        }
        Ok(index)
    }

    fn check_dim(&self, got: usize) -> Result<()> {
        if got != self.dim {
            return Err(anyhow!("vector dimension {} does not match index dimension {}", got, self.dim));
        }
        Ok(())
    }
}

impl VectorIndex for InMemoryIndex {
    fn dim(&self) -> usize { self.dim }

    fn len(&self) -> usize { self.entries.len() }

    fn insert(&mut self, chunk: Chunk, vector: Vec<f32>) -> Result<()> {
        self.check_dim(vector.len())?;
        self.entries.push(IndexEntry::new(chunk, vector));
        Ok(())
    }

    fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchHit>> {
        self.check_dim(query.len())?;
        let mut scored: Vec<(f32, usize)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, e)| (distance(self.metric, query, &e.vector), i))
            .collect();
        // stable: ties stay in insertion order
        scored.sort_by(|a, b| a.0.total_cmp(&b.0));
        Ok(scored
            .into_iter()
            .take(k)
            .map(|(distance, i)| SearchHit { chunk: self.entries[i].chunk.clone(), distance })
            .collect())
    }
}

pub fn distance(metric: Metric, a: &[f32], b: &[f32]) -> f32 {
    match metric {
        Metric::Cosine => cosine_distance(a, b),
        Metric::L2 => l2_distance(a, b),
    }
}

/// `1 - cos(a, b)`; a zero vector is treated as orthogonal to everything.
pub fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let na = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let nb = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if na == 0.0 || nb == 0.0 { return 1.0; }
    1.0 - dot / (na * nb)
}

pub fn l2_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum::<f32>().sqrt()
}
