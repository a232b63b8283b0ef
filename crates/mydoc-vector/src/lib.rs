//! mydoc-vector
//!
//! The vector index used by the query pipeline: an exact in-memory index
//! searched per query, and an optional LanceDB store that keeps entries
//! between runs.

pub mod memory;
pub mod schema;
pub mod store;
pub mod table;

pub use memory::{cosine_distance, distance, l2_distance, InMemoryIndex};
pub use store::{corpus_fingerprint, LanceStore};
