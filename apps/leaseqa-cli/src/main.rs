use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use leaseqa_core::config::{expand_path, Config};
use leaseqa_core::memory::InMemoryStore;
use leaseqa_core::types::{RetrievalResult, Weights};
use leaseqa_hybrid::{EngineConfig, RetrievalEngine};
use leaseqa_vector::{backfill_embeddings, HashingEmbedder};

#[derive(Parser)]
#[command(name = "leaseqa", version, about = "Hybrid lexical + vector passage retrieval over a JSON corpus")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show which of the requested documents a user may read.
    Validate {
        #[arg(long, env = "LEASEQA_CORPUS")]
        corpus: String,
        #[arg(long)]
        user: String,
        #[arg(long = "doc", required = true)]
        docs: Vec<String>,
    },
    /// Run a hybrid search and print ranked passages.
    Search {
        query: String,
        #[arg(long, env = "LEASEQA_CORPUS")]
        corpus: String,
        #[arg(long)]
        user: String,
        #[arg(long = "doc")]
        docs: Vec<String>,
        #[arg(long)]
        top_k: Option<usize>,
        #[arg(long)]
        lexical_weight: Option<f32>,
        #[arg(long)]
        vector_weight: Option<f32>,
        /// Print the prompt context block instead of the ranking.
        #[arg(long)]
        format: bool,
        /// Print the full result as JSON.
        #[arg(long, conflicts_with = "format")]
        json: bool,
        /// Embed chunks that lack an embedding before searching.
        #[arg(long)]
        backfill: bool,
    },
    /// Fill missing chunk embeddings and write the corpus back out.
    Backfill {
        #[arg(long, env = "LEASEQA_CORPUS")]
        corpus: String,
        #[arg(long)]
        out: String,
        #[arg(long, default_value_t = 64)]
        batch_size: usize,
    },
}

fn load_corpus(path: &str) -> anyhow::Result<InMemoryStore> {
    let path: PathBuf = expand_path(path);
    InMemoryStore::from_json_file(&path).with_context(|| format!("loading corpus {}", path.display()))
}

fn print_ranking(result: &RetrievalResult) {
    println!("🔍 Found {} results (vector: {:?})", result.chunks.len(), result.vector);
    if let Some(reason) = result.empty { println!("   empty: {reason:?}"); }
    for c in &result.chunks {
        let title = result.titles.get(&c.document_id).map_or(c.document_id.as_str(), String::as_str);
        println!(
            "\n  {}. fused={:.4}  lexical={}  vector={}  {} p.{}  [{}]",
            c.rank,
            c.fused_score,
            c.lexical_score.map_or("-".to_string(), |s| format!("{s:.4}")),
            c.vector_score.map_or("-".to_string(), |s| format!("{s:.4}")),
            title,
            c.page_number,
            c.chunk_id
        );
        println!("     📝 {}", c.content);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let config = Config::load().map_err(|e| { eprintln!("Error loading config: {}", e); e })?;
    let settings = config.retrieval()?;
    let engine_config = EngineConfig::from_settings(&settings)?;
    let embedder = Arc::new(HashingEmbedder::default());

    match Cli::parse().command {
        Command::Validate { corpus, user, docs } => {
            let store = Arc::new(load_corpus(&corpus)?);
            let engine = RetrievalEngine::new(Arc::clone(&store), store, embedder, engine_config);
            let access = engine.validate_document_access(&user, &docs.into_iter().collect()).await?;
            println!("{}", serde_json::to_string_pretty(&access)?);
        }
        Command::Search { query, corpus, user, docs, top_k, lexical_weight, vector_weight, format, json, backfill } => {
            let mut store = load_corpus(&corpus)?;
            if backfill {
                let report = backfill_embeddings(&mut store.chunks, embedder.as_ref(), 64).await?;
                tracing::info!(filled = report.filled, failed = report.failed, "backfilled embeddings");
            }
            let store = Arc::new(store);
            let engine = RetrievalEngine::new(Arc::clone(&store), store, embedder, engine_config);

            let defaults = engine_config.default_weights;
            let weights = Weights::new(lexical_weight.unwrap_or(defaults.lexical()), vector_weight.unwrap_or(defaults.vector()))?;
            let mut options = engine.options(docs)?.with_weights(weights);
            if let Some(k) = top_k { options = options.with_top_k(k)?; }

            let result = engine.multi_doc_ensemble_search(&user, &query, &options, None).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else if format {
                println!("{}", engine.format_results_for_prompt(&result));
            } else {
                print_ranking(&result);
            }
        }
        Command::Backfill { corpus, out, batch_size } => {
            let mut store = load_corpus(&corpus)?;
            let report = backfill_embeddings(&mut store.chunks, embedder.as_ref(), batch_size).await?;
            let out = expand_path(out);
            store.to_json_file(&out)?;
            println!("✅ Filled {} embeddings ({} failed) → {}", report.filled, report.failed, out.display());
        }
    }
    Ok(())
}
