use mydoc_core::config::EmbeddingConfig;
use mydoc_core::traits::Embedder;
use mydoc_embed::{get_default_embedder, FakeEmbedder};

fn cosine(a: &[f32], b: &[f32]) -> f32 { a.iter().zip(b).map(|(x, y)| x * y).sum() }

#[test]
fn fake_embedder_shapes_and_determinism() {
    let config = EmbeddingConfig { use_fake: true, ..EmbeddingConfig::default() };
    let embedder = get_default_embedder(&config).expect("embedder");
    let texts = vec!["hello world".to_string(), "hello world".to_string()];
    let embs = embedder.embed_batch(&texts).expect("embed_batch");
    let v1 = &embs[0];
    let v2 = &embs[1];

    assert_eq!(v1.len(), 384, "embedding dim is 384");
    assert_eq!(embedder.dim(), 384);
    assert_eq!(embedder.embedder_id(), "fake:xxh64:d384");

    let norm: f32 = v1.iter().map(|x| x * x).sum::<f32>().sqrt();
    assert!((norm - 1.0).abs() <= 1e-3, "vector is L2-normalized (norm={norm})");

    for (a, b) in v1.iter().zip(v2.iter()) { assert!((a - b).abs() <= 1e-6); }
}

#[test]
fn fake_embedder_ranks_shared_words_closer() {
    let e = FakeEmbedder::new(256);
    let embs = e
        .embed_batch(&["What did the cat do?".to_string(), "The cat sat.".to_string(), "Compilers emit bytecode".to_string()])
        .unwrap();
    assert!(cosine(&embs[0], &embs[1]) > cosine(&embs[0], &embs[2]));
}

#[test]
fn fake_embedder_ignores_case_and_punctuation() {
    let e = FakeEmbedder::new(64);
    let embs = e.embed_batch(&["Cat, sat!".to_string(), "cat sat".to_string()]).unwrap();
    assert_eq!(embs[0], embs[1]);
}

#[test]
fn empty_text_is_zero_vector() {
    let e = FakeEmbedder::new(8);
    let embs = e.embed_batch(&[String::new()]).unwrap();
    assert_eq!(embs[0], vec![0.0; 8]);
}
