use figment::providers::{Format, Serialized, Toml};
use figment::Figment;

use mydoc_core::config::{expand_path, resolve_with_base, Config, Metric, Persistence, Settings};

fn config_from(toml: &str) -> Config {
    Config::from_figment(Figment::from(Serialized::defaults(Settings::default())).merge(Toml::string(toml)))
}

#[test]
fn defaults_match_reference_pipeline() {
    let s = config_from("").settings().expect("settings");
    assert_eq!(s.docs.dir, "docs");
    assert_eq!(s.docs.extensions, vec!["txt"]);
    assert_eq!(s.chunking.max_chunk_size, 800);
    assert_eq!(s.chunking.overlap, 100);
    assert_eq!(s.chunking.separators, vec!["\n\n", "\n", ".", " "]);
    assert_eq!(s.embedding.model, "sentence-transformers/all-MiniLM-L6-v2");
    assert_eq!(s.retrieval.top_k, 3);
    assert_eq!(s.llm.model, "gemma3");
    assert!((s.llm.temperature - 0.3).abs() < f32::EPSILON);
    assert_eq!(s.display.preview_chars, 500);
    assert_eq!(s.index.persistence, Persistence::Ephemeral);
    assert_eq!(s.index.metric, Metric::Cosine);
}

#[test]
fn toml_overrides_sections() {
    let config = config_from(
        r#"
        [llm]
        model = "llama3"
        timeout_secs = 5

        [index]
        persistence = "lancedb"
        metric = "l2"

        [retrieval]
        top_k = 5
        "#,
    );
    let s = config.settings().expect("settings");
    assert_eq!(s.llm.model, "llama3");
    assert_eq!(s.llm.timeout_secs, 5);
    assert_eq!(s.llm.base_url, "http://localhost:11434", "untouched keys keep defaults");
    assert_eq!(s.index.persistence, Persistence::Lancedb);
    assert_eq!(s.index.metric, Metric::L2);
    assert_eq!(s.retrieval.top_k, 5);
}

#[test]
fn invalid_values_fail_validation() {
    assert!(config_from("[chunking]\noverlap = 900").settings().is_err());
    assert!(config_from("[retrieval]\ntop_k = 0").settings().is_err());
    assert!(config_from("[llm]\ntemperature = -1.0").settings().is_err());
    assert!(config_from("[docs]\nextensions = []").settings().is_err());
}

#[test]
fn resolve_relative_and_absolute_paths() {
    let base = std::path::Path::new("/srv/app");
    assert_eq!(resolve_with_base(base, "docs"), base.join("docs"));
    assert_eq!(resolve_with_base(base, "/data/docs"), std::path::PathBuf::from("/data/docs"));
    assert_eq!(expand_path("plain/path"), std::path::PathBuf::from("plain/path"));
}
