//! Lance-backed persistence for index entries, keyed by a corpus fingerprint.
//!
//! A stored index is only reused when the fingerprint recorded next to it
//! matches the current corpus; otherwise the caller rebuilds and saves again.
//! The store only ever touches its own two tables inside the directory.
use anyhow::{anyhow, Result};
use arrow_array::cast::AsArray;
use arrow_array::types::Float32Type;
use arrow_array::{Array, FixedSizeListArray, Int64Array, RecordBatch, RecordBatchIterator, StringArray};
use futures::TryStreamExt;
use lancedb::query::ExecutableQuery;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

use mydoc_core::config::ChunkingConfig;
use mydoc_core::types::{Chunk, Document, IndexEntry};

use crate::schema::build_chunks_schema;
use crate::table::{ensure_table, get_meta, open_db, table_exists, write_meta};

const META_TABLE: &str = "meta";
const FINGERPRINT_KEY: &str = "fingerprint";

pub struct LanceStore {
    path: PathBuf,
    table: String,
    // load and save never interleave within one process
    lock: Mutex<()>,
}

impl LanceStore {
    pub fn new(path: impl Into<PathBuf>, table: &str) -> Self {
        Self { path: path.into(), table: table.to_string(), lock: Mutex::new(()) }
    }

    fn uri(&self) -> String { self.path.to_string_lossy().to_string() }

    /// On-disk directories of the tables this store owns.
    fn owned_table_dirs(&self) -> [PathBuf; 2] {
        [table_dir(&self.path, &self.table), table_dir(&self.path, META_TABLE)]
    }

    /// Stored entries in insertion order, or `None` when nothing is stored
    /// for this fingerprint.
    pub async fn load(&self, fingerprint: &str) -> Result<Option<Vec<IndexEntry>>> {
        let _guard = self.lock.lock().await;
        if !self.path.exists() { return Ok(None); }
        let conn = open_db(&self.uri()).await?;
        match get_meta(&conn, META_TABLE, FINGERPRINT_KEY).await? {
            Some(stored) if stored == fingerprint => {}
            Some(_) => {
                tracing::info!(path = %self.path.display(), "stored index is stale");
                return Ok(None);
            }
            None => return Ok(None),
        }
        if !table_exists(&conn, &self.table).await? { return Ok(None); }

        let t = conn.open_table(&self.table).execute().await?;
        let mut stream = t.query().execute().await?;
        let mut rows: Vec<(i64, IndexEntry)> = Vec::new();
        while let Some(batch) = stream.try_next().await? {
            rows.extend(batch_to_entries(&batch)?);
        }
        rows.sort_by_key(|(seq, _)| *seq);
        tracing::info!(entries = rows.len(), path = %self.path.display(), "loaded stored index");
        Ok(Some(rows.into_iter().map(|(_, e)| e).collect()))
    }

    /// Replace whatever is stored with `entries`. Other files in the
    /// directory are left alone.
    pub async fn save(&self, fingerprint: &str, dim: usize, entries: &[IndexEntry]) -> Result<()> {
        let _guard = self.lock.lock().await;
        std::fs::create_dir_all(&self.path)?;
        for dir in self.owned_table_dirs() {
            if dir.exists() { std::fs::remove_dir_all(&dir)?; }
        }
        let conn = open_db(&self.uri()).await?;
        let dim_i32 = i32::try_from(dim).map_err(|_| anyhow!("dimension {} too large", dim))?;
        let schema = build_chunks_schema(dim_i32);
        if entries.is_empty() {
            ensure_table(&conn, &self.table, schema).await?;
        } else {
            let batch = entries_to_batch(entries, dim_i32)?;
            let reader = Box::new(RecordBatchIterator::new(vec![Ok(batch)].into_iter(), schema));
            conn.create_table(&self.table, reader).execute().await?;
        }
        write_meta(&conn, META_TABLE, &[(FINGERPRINT_KEY, fingerprint)]).await?;
        tracing::info!(entries = entries.len(), path = %self.path.display(), "saved index");
        Ok(())
    }
}

fn table_dir(root: &Path, table: &str) -> PathBuf {
    root.join(format!("{}.lance", table))
}

fn entries_to_batch(entries: &[IndexEntry], dim: i32) -> Result<RecordBatch> {
    let mut seqs = Vec::with_capacity(entries.len());
    let mut sources = Vec::with_capacity(entries.len());
    let mut offsets = Vec::with_capacity(entries.len());
    let mut texts = Vec::with_capacity(entries.len());
    let mut vectors: Vec<Option<Vec<Option<f32>>>> = Vec::with_capacity(entries.len());
    for (i, e) in entries.iter().enumerate() {
        seqs.push(i as i64);
        sources.push(e.source_id.as_str());
        offsets.push(e.chunk.offset as i64);
        texts.push(e.chunk.text.as_str());
        vectors.push(Some(e.vector.iter().map(|&x| Some(x)).collect()));
    }
    Ok(RecordBatch::try_new(
        build_chunks_schema(dim),
        vec![
            Arc::new(Int64Array::from(seqs)),
            Arc::new(StringArray::from(sources)),
            Arc::new(Int64Array::from(offsets)),
            Arc::new(StringArray::from(texts)),
            Arc::new(FixedSizeListArray::from_iter_primitive::<Float32Type, _, _>(vectors.into_iter(), dim)),
        ],
    )?)
}

fn batch_to_entries(batch: &RecordBatch) -> Result<Vec<(i64, IndexEntry)>> {
    let seq = column::<Int64Array>(batch, "seq")?;
    let source = column::<StringArray>(batch, "source_id")?;
    let offset = column::<Int64Array>(batch, "offset")?;
    let text = column::<StringArray>(batch, "text")?;
    let vector = column::<FixedSizeListArray>(batch, "vector")?;
    let mut out = Vec::with_capacity(batch.num_rows());
    for i in 0..batch.num_rows() {
        if vector.is_null(i) { return Err(anyhow!("row {} has no vector", seq.value(i))); }
        let chunk = Chunk {
            text: text.value(i).to_string(),
            source_id: source.value(i).to_string(),
            offset: usize::try_from(offset.value(i))?,
        };
        let values = vector.value(i).as_primitive::<Float32Type>().values().to_vec();
        out.push((seq.value(i), IndexEntry::new(chunk, values)));
    }
    Ok(out)
}

fn column<'a, T: 'static>(batch: &'a RecordBatch, name: &str) -> Result<&'a T> {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<T>())
        .ok_or_else(|| anyhow!("column '{}' missing or of unexpected type", name))
}

/// Identity of a corpus as seen by one embedder and chunking setup.
pub fn corpus_fingerprint(embedder_id: &str, chunking: &ChunkingConfig, documents: &[Document]) -> String {
    let mut h = blake3::Hasher::new();
    h.update(embedder_id.as_bytes());
    h.update(&[0]);
    h.update(&(chunking.max_chunk_size as u64).to_le_bytes());
    h.update(&(chunking.overlap as u64).to_le_bytes());
    for sep in &chunking.separators {
        h.update(&(sep.len() as u64).to_le_bytes());
        h.update(sep.as_bytes());
    }
    for d in documents {
        h.update(&(d.source_id.len() as u64).to_le_bytes());
        h.update(d.source_id.as_bytes());
        h.update(&(d.content.len() as u64).to_le_bytes());
        h.update(d.content.as_bytes());
    }
    h.finalize().to_hex().to_string()
}

