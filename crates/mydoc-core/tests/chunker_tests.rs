use mydoc_core::config::ChunkingConfig;
use mydoc_core::types::Document;
use mydoc_core::Chunker;

fn chunker(max: usize, overlap: usize) -> Chunker {
    Chunker::new(ChunkingConfig { max_chunk_size: max, overlap, ..ChunkingConfig::default() }).unwrap()
}

fn rebuild(chunks: &[(usize, &str)]) -> String {
    let mut out = String::new();
    let mut end = 0usize;
    for (offset, text) in chunks {
        let skip = end.saturating_sub(*offset);
        out.extend(text.chars().skip(skip));
        end = offset + text.chars().count();
    }
    out
}

fn sample_text() -> String {
    let mut text = String::new();
    for p in 0..12 {
        text.push_str(&format!("Paragraph {p} talks about git branches and merge conflicts. "));
        text.push_str("Run the debugger, inspect the stack, then fix the failing test.\n");
        text.push_str("Python virtual environments keep dependencies isolated per project.");
        text.push_str(if p % 3 == 0 { "\n\n" } else { " " });
    }
    text
}

#[test]
fn short_document_is_one_chunk() {
    let c = Chunker::default();
    let doc = Document::new("a.txt", "The cat sat. The dog ran.");
    let chunks = c.split_document(&doc);
    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].text, "The cat sat. The dog ran.");
    assert_eq!(chunks[0].offset, 0);
    assert_eq!(chunks[0].source_id, "a.txt");
}

#[test]
fn empty_document_has_no_chunks() {
    assert!(Chunker::default().split_document(&Document::new("e.txt", "")).is_empty());
}

#[test]
fn chunks_never_exceed_max_size() {
    let text = sample_text();
    for (max, overlap) in [(800, 100), (120, 30), (50, 0), (10, 9)] {
        let chunks = chunker(max, overlap).split_text(&text);
        assert!(chunks.len() > 1);
        for (_, t) in &chunks {
            assert!(t.chars().count() <= max, "chunk of {} chars exceeds {}", t.chars().count(), max);
        }
    }
}

#[test]
fn dropping_overlaps_rebuilds_document() {
    let text = sample_text();
    for (max, overlap) in [(800, 100), (120, 30), (50, 0), (7, 3)] {
        let chunks = chunker(max, overlap).split_text(&text);
        assert_eq!(rebuild(&chunks), text, "max={max} overlap={overlap}");
    }
}

#[test]
fn consecutive_chunks_share_overlap() {
    let text = sample_text();
    let chunks = chunker(120, 30).split_text(&text);
    for pair in chunks.windows(2) {
        let (o1, t1) = pair[0];
        let (o2, _) = pair[1];
        assert_eq!(o1 + t1.chars().count() - o2, 30);
    }
}

#[test]
fn prefers_paragraph_break_over_sentence() {
    let text = format!("{}\n\n{}. {}", "a".repeat(40), "b".repeat(20), "c".repeat(60));
    let chunks = chunker(80, 5).split_text(&text);
    assert!(chunks[0].1.ends_with("\n\n"), "first cut after the blank line: {:?}", chunks[0].1);
}

#[test]
fn falls_back_to_lower_priority_separators() {
    let text = format!("{} {} {}", "x".repeat(30), "y".repeat(30), "z".repeat(30));
    let chunks = chunker(70, 10).split_text(&text);
    assert_eq!(chunks[0].1, format!("{} {} ", "x".repeat(30), "y".repeat(30)));
}

#[test]
fn hard_cut_without_separators() {
    let text = "q".repeat(25);
    let chunks = chunker(10, 2).split_text(&text);
    let offsets: Vec<usize> = chunks.iter().map(|(o, _)| *o).collect();
    assert_eq!(offsets, vec![0, 8, 16]);
    assert_eq!(rebuild(&chunks), text);
}

#[test]
fn multibyte_text_is_split_on_char_boundaries() {
    let text = "héllo wörld ünïcode ✓ ".repeat(20);
    let chunks = chunker(30, 5).split_text(&text);
    for (_, t) in &chunks { assert!(t.chars().count() <= 30); }
    assert_eq!(rebuild(&chunks), text);
}

#[test]
fn deterministic_output() {
    let text = sample_text();
    let c = Chunker::default();
    assert_eq!(c.split_text(&text), c.split_text(&text));
}

#[test]
fn chunk_offsets_index_into_document() {
    let doc = Document::new("s.txt", sample_text());
    for chunk in chunker(200, 40).split_document(&doc) {
        let from_offset: String = doc.content.chars().skip(chunk.offset).take(chunk.text.chars().count()).collect();
        assert_eq!(from_offset, chunk.text);
    }
}

#[test]
fn invalid_config_is_rejected() {
    assert!(Chunker::new(ChunkingConfig { max_chunk_size: 0, overlap: 0, ..ChunkingConfig::default() }).is_err());
    assert!(Chunker::new(ChunkingConfig { max_chunk_size: 100, overlap: 100, ..ChunkingConfig::default() }).is_err());
    assert!(Chunker::new(ChunkingConfig { separators: vec![String::new()], ..ChunkingConfig::default() }).is_err());
}
