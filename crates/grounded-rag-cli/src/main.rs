//! Grounded-RAG CLI
//!
//! Command-line interface for the grounded-rag retrieval engine.
//!
//! ## Usage
//!
//! ```bash
//! # Build a corpus index from a directory of .txt/.md files
//! grounded-rag index --data-dir docs/ --output index/
//!
//! # Retrieve the top passages for a query
//! grounded-rag query "What identity checks apply?" --index index/
//!
//! # Print the grounded prompt a generation model would receive
//! grounded-rag ask "What identity checks apply?" --index index/
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use grounded_rag::{
    builder::IndexBuilder,
    chunk::{Chunker, SentenceOverlapChunker},
    embed::TfIdfEmbedder,
    index::CorpusIndex,
    prompt::PromptComposer,
    retrieve::Retriever,
    Document,
};
use std::fs;
use std::path::{Path, PathBuf};

/// File name of the persisted corpus artifact inside the index directory
const ARTIFACT_NAME: &str = "corpus.json";

/// Output format selection
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// JSON lines of ranked results
    Json,
}

#[derive(Parser)]
#[command(name = "grounded-rag")]
#[command(version)]
#[command(about = "Semantic passage retrieval with grounded prompts", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a corpus index from a directory of documents
    Index {
        /// Directory containing .txt/.md documents
        #[arg(short, long)]
        data_dir: PathBuf,

        /// Output directory for the index artifact
        #[arg(short, long)]
        output: PathBuf,

        /// Words per chunk
        #[arg(long, default_value = "400")]
        max_words: usize,

        /// Trailing words carried across chunk boundaries
        #[arg(long, default_value = "50")]
        overlap: usize,

        /// Embedding dimension for the TF-IDF provider
        #[arg(long, default_value = "256")]
        dimension: usize,
    },

    /// Retrieve the top-k passages for a query
    Query {
        /// Query string
        query: String,

        /// Path to the index directory
        #[arg(short, long)]
        index: PathBuf,

        /// Number of results
        #[arg(short = 'k', long, default_value = "5")]
        top_k: usize,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Compose and print the grounded prompt for a query
    Ask {
        /// Query string
        query: String,

        /// Path to the index directory
        #[arg(short, long)]
        index: PathBuf,

        /// Number of sources to include
        #[arg(short = 'k', long, default_value = "5")]
        top_k: usize,

        /// Character budget for the composed prompt
        #[arg(long, default_value = "3000")]
        max_chars: usize,
    },

    /// Show engine info
    Info,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Index {
            data_dir,
            output,
            max_words,
            overlap,
            dimension,
        } => run_index(&data_dir, &output, max_words, overlap, dimension),
        Commands::Query {
            query,
            index,
            top_k,
            format,
        } => run_query(&query, &index, top_k, format),
        Commands::Ask {
            query,
            index,
            top_k,
            max_chars,
        } => run_ask(&query, &index, top_k, max_chars),
        Commands::Info => {
            run_info();
            Ok(())
        }
    }
}

fn run_info() {
    println!("grounded-rag retrieval engine");
    println!("=============================");
    println!("Version: {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Components:");
    println!("  - Chunkers: Fixed, Overlapping, Sentence, SentenceOverlap");
    println!("  - Embedders: TF-IDF (trainable), Mock (testing)");
    println!("  - Index: flat inner-product over unit-normalized vectors");
    println!("  - Metrics: recall@k, precision@k, MRR");
}

/// Collect documents from a directory, keyed by file name
fn load_documents(data_dir: &Path) -> Result<Vec<Document>> {
    if !data_dir.is_dir() {
        anyhow::bail!("not a directory: {}", data_dir.display());
    }

    let mut documents = Vec::new();
    let mut entries: Vec<PathBuf> = fs::read_dir(data_dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .is_some_and(|ext| ext == "txt" || ext == "md")
        })
        .collect();
    // stable document order keeps rebuilds reproducible
    entries.sort();

    for path in entries {
        let text = fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let id = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        documents.push(Document::new(id, text));
    }

    if documents.is_empty() {
        anyhow::bail!("no .txt or .md documents found in {}", data_dir.display());
    }
    Ok(documents)
}

fn run_index(
    data_dir: &Path,
    output: &Path,
    max_words: usize,
    overlap: usize,
    dimension: usize,
) -> Result<()> {
    let documents = load_documents(data_dir)?;
    println!("Found {} documents", documents.len());

    let chunker = SentenceOverlapChunker::new(max_words, overlap)
        .context("invalid chunking parameters")?;

    // fit the TF-IDF provider over the chunk texts; the query path refits
    // over the stored metadata texts, which are the same collection
    let mut chunk_texts: Vec<String> = Vec::new();
    for doc in &documents {
        chunk_texts.extend(chunker.chunk(&doc.text)?);
    }
    let refs: Vec<&str> = chunk_texts.iter().map(String::as_str).collect();
    let mut embedder = TfIdfEmbedder::new(dimension);
    embedder.fit(&refs);

    let corpus = IndexBuilder::with_chunker(chunker)
        .build(&documents, &embedder)
        .context("index build failed")?;

    fs::create_dir_all(output)?;
    let artifact = output.join(ARTIFACT_NAME);
    corpus.save(&artifact).context("failed to persist index")?;

    println!(
        "Indexed {} documents ({} chunks, dimension {})",
        documents.len(),
        corpus.len(),
        corpus.dimension()
    );
    println!("Index saved to: {}", artifact.display());
    Ok(())
}

/// Load the artifact and refit the TF-IDF provider over its chunk texts
fn load_retriever(index_dir: &Path) -> Result<Retriever<TfIdfEmbedder>> {
    let artifact = index_dir.join(ARTIFACT_NAME);
    let corpus = CorpusIndex::load(&artifact)
        .with_context(|| format!("cannot load index from {}", index_dir.display()))?;

    let mut embedder = TfIdfEmbedder::new(corpus.dimension());
    if !corpus.is_empty() {
        let texts: Vec<&str> = corpus.metadata().iter().map(|m| m.text.as_str()).collect();
        embedder.fit(&texts);
    }

    Ok(Retriever::new(corpus, embedder))
}

fn run_query(query: &str, index_dir: &Path, top_k: usize, format: OutputFormat) -> Result<()> {
    let retriever = load_retriever(index_dir)?;

    if retriever.is_empty() {
        println!("Index is empty; no results.");
        return Ok(());
    }

    let results = retriever.retrieve(query, top_k)?;

    match format {
        OutputFormat::Json => {
            let rows: Vec<serde_json::Value> = results
                .iter()
                .enumerate()
                .map(|(rank, r)| {
                    serde_json::json!({
                        "rank": rank + 1,
                        "score": r.score,
                        "doc_id": r.doc_id,
                        "chunk_index": r.chunk_index,
                        "text": r.text,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
        OutputFormat::Text => {
            println!("Query: \"{query}\"\n");
            println!("Top results:");
            for r in &results {
                println!("[{:.3}] {} / chunk {}", r.score, r.doc_id, r.chunk_index);
                println!("{}\n---", r.text);
            }
        }
    }
    Ok(())
}

fn run_ask(query: &str, index_dir: &Path, top_k: usize, max_chars: usize) -> Result<()> {
    let retriever = load_retriever(index_dir)?;
    let results = retriever.retrieve(query, top_k)?;

    let prompt = PromptComposer::new(max_chars).compose(query, &results);
    println!("{prompt}");
    Ok(())
}
