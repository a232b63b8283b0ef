use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use mydoc_cli::{next_question, render_json, render_result, ChatInput, ConsoleObserver};
use mydoc_core::config::{expand_path, Config, Settings};
use mydoc_core::error::PipelineError;
use mydoc_core::loader::DocumentLoader;
use mydoc_llm::OllamaClient;
use mydoc_rag::{CancellationToken, NoopObserver, Pipeline, QueryObserver};

#[derive(Parser)]
#[command(name = "mydoc", version, about = "Ask questions about your local text documents")]
struct Cli {
    /// Documents folder (overrides `docs.dir`)
    #[arg(long, global = true)]
    docs: Option<PathBuf>,
    /// Ollama model name (overrides `llm.model`)
    #[arg(long, global = true)]
    model: Option<String>,
    /// Number of chunks used as context (overrides `retrieval.top_k`)
    #[arg(long, global = true)]
    top_k: Option<usize>,
    /// Use hashed bag-of-words vectors instead of the embedding model
    #[arg(long, global = true)]
    fake_embeddings: bool,
    /// Print results as JSON and suppress status lines
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Answer a single question
    Ask {
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
    },
    /// Read questions from stdin until `exit`, `quit` or end of input
    Chat,
    /// Show the documents folder contents and whether Ollama is reachable
    Check,
}

impl Cli {
    fn apply(&self, settings: &mut Settings) {
        if let Some(docs) = &self.docs { settings.docs.dir = docs.to_string_lossy().to_string(); }
        if let Some(model) = &self.model { settings.llm.model = model.clone(); }
        if let Some(k) = self.top_k { settings.retrieval.top_k = k; }
        if self.fake_embeddings { settings.embedding.use_fake = true; }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load().map_err(|e| { eprintln!("Error loading config: {}", e); e })?;
    let mut settings = config.settings()?;
    cli.apply(&mut settings);
    settings.validate()?;

    match &cli.command {
        Command::Check => check(&settings).await,
        Command::Ask { question } => {
            let pipeline = Pipeline::from_settings(settings)?;
            let question = question.join(" ");
            if !ask(&pipeline, &question, cli.json).await? {
                std::process::exit(1);
            }
            Ok(())
        }
        Command::Chat => {
            let pipeline = Pipeline::from_settings(settings)?;
            chat(&pipeline, cli.json).await
        }
    }
}

/// Run one query. Returns `false` when it failed for a reason other than
/// an empty documents folder.
async fn ask(pipeline: &Pipeline, question: &str, json: bool) -> anyhow::Result<bool> {
    let cancel = CancellationToken::new();
    let on_ctrl_c = cancel.clone();
    let watcher = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() { on_ctrl_c.cancel(); }
    });

    let console = ConsoleObserver::new(pipeline.model_id());
    let observer: &dyn QueryObserver = if json { &NoopObserver } else { &console };
    let outcome = pipeline.ask_with(question, &cancel, observer).await;
    watcher.abort();

    let preview_chars = pipeline.settings().display.preview_chars;
    match outcome {
        Ok(result) => {
            if json {
                println!("{}", render_json(question, &result, preview_chars)?);
            } else {
                println!("{}", render_result(&result, preview_chars));
            }
            Ok(true)
        }
        Err(PipelineError::EmptyCorpus { dir }) => {
            println!("⚠️  No documents found in '{}'. Add some .txt files and try again.", dir.display());
            Ok(true)
        }
        Err(err) => {
            eprintln!("❌ {}", err);
            Ok(false)
        }
    }
}

async fn chat(pipeline: &Pipeline, json: bool) -> anyhow::Result<()> {
    println!("Ask questions about the documents in '{}'. Type 'exit' or press Ctrl-C to quit.", pipeline.docs_dir().display());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    loop {
        // a query in flight is cancelled by its own watcher in `ask`
        let ctrl_c = async {
            let _ = tokio::signal::ctrl_c().await;
        };
        match next_question(&mut lines, &mut stdout, ctrl_c).await? {
            ChatInput::Question(question) => { ask(pipeline, &question, json).await?; }
            ChatInput::Exit => break,
        }
    }
    println!();
    Ok(())
}

async fn check(settings: &Settings) -> anyhow::Result<()> {
    let dir = expand_path(&settings.docs.dir);
    println!("Documents folder: {}", dir.display());
    let report = DocumentLoader::from_config(&settings.docs).load_dir(&dir);
    for document in &report.documents {
        println!("Loaded: {} ({} chars)", document.source_id, document.content.chars().count());
    }
    for failure in &report.failures {
        println!("{}", failure);
    }
    println!("Total documents loaded: {}", report.documents.len());
    if report.is_empty() {
        println!("⚠️  No documents found. Add some .txt files to '{}'.", dir.display());
    }

    let client = OllamaClient::new(&settings.llm)?;
    match client.list_models().await {
        Ok(models) => {
            println!("✅ Ollama is running at {}", client.base_url());
            let wanted = &settings.llm.model;
            if models.iter().any(|m| m == wanted || m.split(':').next() == Some(wanted.as_str())) {
                println!("✅ Model '{}' is available", wanted);
            } else {
                println!("⚠️  Model '{}' not found. Run: ollama pull {}", wanted, wanted);
            }
        }
        Err(e) => {
            tracing::debug!("health check failed: {:#}", e);
            println!("❌ Ollama is not reachable at {}. Start it with: ollama serve", client.base_url());
        }
    }
    Ok(())
}
