use mydoc_core::config::Metric;
use mydoc_core::traits::VectorIndex;
use mydoc_core::types::Chunk;
use mydoc_vector::{cosine_distance, l2_distance, InMemoryIndex};

fn chunk(i: usize) -> Chunk {
    Chunk { text: format!("chunk {i}"), source_id: format!("doc{i}.txt"), offset: 0 }
}

fn seeded(metric: Metric) -> InMemoryIndex {
    let mut index = InMemoryIndex::new(3, metric);
    let vectors = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.7, 0.7, 0.0], [0.0, 0.0, 1.0], [0.9, 0.1, 0.0]];
    for (i, v) in vectors.iter().enumerate() {
        index.insert(chunk(i), v.to_vec()).unwrap();
    }
    index
}

#[test]
fn search_returns_min_k_len() {
    let index = seeded(Metric::Cosine);
    assert_eq!(index.search(&[1.0, 0.0, 0.0], 3).unwrap().len(), 3);
    assert_eq!(index.search(&[1.0, 0.0, 0.0], 10).unwrap().len(), 5, "n < k returns n");
    assert!(index.search(&[1.0, 0.0, 0.0], 0).unwrap().is_empty());
}

#[test]
fn search_distances_are_non_decreasing() {
    for metric in [Metric::Cosine, Metric::L2] {
        let index = seeded(metric);
        let hits = index.search(&[0.8, 0.3, 0.1], 5).unwrap();
        for pair in hits.windows(2) {
            assert!(pair[0].distance <= pair[1].distance, "{:?}: {} > {}", metric, pair[0].distance, pair[1].distance);
        }
        assert_eq!(hits[0].chunk.source_id, "doc4.txt");
    }
}

#[test]
fn search_never_repeats_an_entry() {
    let index = seeded(Metric::L2);
    let hits = index.search(&[0.0, 0.0, 0.0], 5).unwrap();
    let mut ids: Vec<&str> = hits.iter().map(|h| h.chunk.source_id.as_str()).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 5);
}

#[test]
fn ties_keep_insertion_order() {
    let mut index = InMemoryIndex::new(2, Metric::Cosine);
    for i in 0..4 {
        index.insert(chunk(i), vec![1.0, 1.0]).unwrap();
    }
    let hits = index.search(&[1.0, 1.0], 3).unwrap();
    let ids: Vec<&str> = hits.iter().map(|h| h.chunk.source_id.as_str()).collect();
    assert_eq!(ids, vec!["doc0.txt", "doc1.txt", "doc2.txt"]);
}

#[test]
fn duplicate_chunks_are_allowed() {
    let mut index = InMemoryIndex::new(2, Metric::Cosine);
    index.insert(chunk(0), vec![1.0, 0.0]).unwrap();
    index.insert(chunk(0), vec![1.0, 0.0]).unwrap();
    assert_eq!(index.len(), 2);
}

#[test]
fn empty_index_search_is_empty_not_error() {
    let index = InMemoryIndex::new(4, Metric::Cosine);
    assert!(index.is_empty());
    assert!(index.search(&[0.1, 0.2, 0.3, 0.4], 3).unwrap().is_empty());
}

#[test]
fn dimension_mismatch_is_rejected() {
    let mut index = InMemoryIndex::new(3, Metric::Cosine);
    assert!(index.insert(chunk(0), vec![1.0, 0.0]).is_err());
    assert!(index.is_empty());
    assert!(index.search(&[1.0], 1).is_err());
}

#[test]
fn distance_functions() {
    assert!(cosine_distance(&[1.0, 0.0], &[2.0, 0.0]).abs() < 1e-6);
    assert!((cosine_distance(&[1.0, 0.0], &[0.0, 1.0]) - 1.0).abs() < 1e-6);
    assert!((cosine_distance(&[0.0, 0.0], &[0.0, 1.0]) - 1.0).abs() < 1e-6);
    assert!((l2_distance(&[0.0, 0.0], &[3.0, 4.0]) - 5.0).abs() < 1e-6);
}
