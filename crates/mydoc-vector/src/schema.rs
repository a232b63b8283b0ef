use arrow_schema::{DataType, Field, Schema};
use std::sync::Arc;

/// Rows of the persisted index: one chunk and its vector per row. `seq`
/// records insertion order so a reload preserves tie-breaking.
pub fn build_chunks_schema(dim: i32) -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("seq", DataType::Int64, false),
        Field::new("source_id", DataType::Utf8, false),
        Field::new("offset", DataType::Int64, false),
        Field::new("text", DataType::Utf8, false),
        Field::new("vector", DataType::FixedSizeList(Arc::new(Field::new("item", DataType::Float32, true)), dim), true),
    ]))
}

pub fn build_meta_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("key", DataType::Utf8, false),
        Field::new("value", DataType::Utf8, false),
    ]))
}
