use mydoc_core::config::Config;
use mydoc_embed::get_default_embedder;

// Embed two sentences with the configured model and print their similarity.
// Usage:
//   cargo run -p mydoc-embed --example embed
fn main() -> anyhow::Result<()> {
    let settings = Config::load()?.settings()?;
    let embedder = get_default_embedder(&settings.embedding)?;
    let texts = vec!["How do I resolve a merge conflict?".to_string(), "Fixing git merge conflicts".to_string()];
    let embs = embedder.embed_batch(&texts)?;
    let sim: f32 = embs[0].iter().zip(&embs[1]).map(|(a, b)| a * b).sum();
    println!("{} B={} dim={} cosine={:.4}", embedder.embedder_id(), embs.len(), embedder.dim(), sim);
    Ok(())
}
