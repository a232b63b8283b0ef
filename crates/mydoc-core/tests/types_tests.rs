use mydoc_core::types::{Chunk, QueryResult, Stage};
use mydoc_core::PipelineError;

fn chunk(source: &str, text: &str) -> Chunk {
    Chunk { text: text.to_string(), source_id: source.to_string(), offset: 0 }
}

#[test]
fn citations_truncate_long_chunks() {
    let result = QueryResult {
        answer: "ok".to_string(),
        cited_chunks: vec![chunk("long.txt", &"é".repeat(600)), chunk("short.txt", "brief")],
    };
    let citations = result.citations(500);
    assert_eq!(citations[0].source_id, "long.txt");
    assert_eq!(citations[0].preview.chars().count(), 503);
    assert!(citations[0].preview.ends_with("..."));
    assert_eq!(citations[1].preview, "brief");
}

#[test]
fn exact_length_chunk_is_not_truncated() {
    let result = QueryResult { answer: String::new(), cited_chunks: vec![chunk("a.txt", &"x".repeat(500))] };
    assert_eq!(result.citations(500)[0].preview.len(), 500);
}

#[test]
fn sources_are_distinct_in_citation_order() {
    let result = QueryResult {
        answer: String::new(),
        cited_chunks: vec![chunk("b.txt", "1"), chunk("a.txt", "2"), chunk("b.txt", "3")],
    };
    assert_eq!(result.sources(), vec!["b.txt", "a.txt"]);
}

#[test]
fn errors_report_their_stage() {
    assert_eq!(PipelineError::EmptyCorpus { dir: "docs".into() }.stage(), Stage::Loading);
    assert_eq!(PipelineError::Embedding("x".into()).stage(), Stage::Embedding);
    assert_eq!(PipelineError::NoContext.stage(), Stage::Retrieving);
    let lookup = PipelineError::Index { stage: Stage::Embedding, message: "x".into() };
    assert_eq!(lookup.stage(), Stage::Embedding);
    assert_eq!(lookup.to_string(), "Vector index failed while embedding: x");
    assert_eq!(PipelineError::Generation("x".into()).stage(), Stage::Generating);
    assert_eq!(PipelineError::Cancelled { stage: Stage::Indexing }.stage(), Stage::Indexing);
    assert!(Stage::Done.is_terminal() && Stage::Failed.is_terminal() && !Stage::Idle.is_terminal());
}
