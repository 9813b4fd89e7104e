//! Grounded-RAG: semantic passage retrieval with grounded prompt composition
//!
//! This crate provides the core of a retrieval-augmented generation system:
//! document chunking, vector index construction, similarity search, grounded
//! prompt composition, and retrieval-quality measurement. Embedding models,
//! vector-index backends, and generation models plug in through narrow
//! traits ([`Embedder`], [`index::VectorIndex`], [`GenerationModel`]).
//!
//! # Quick Start
//!
//! ```rust
//! use grounded_rag::{
//!     builder::IndexBuilder,
//!     embed::MockEmbedder,
//!     prompt::PromptComposer,
//!     retrieve::Retriever,
//!     Document,
//! };
//!
//! let embedder = MockEmbedder::new(64);
//! let documents = vec![
//!     Document::new("kyc.txt", "Identity checks apply to new accounts. Reviews are annual."),
//!     Document::new("gdpr.txt", "Personal data processing requires documented consent."),
//! ];
//!
//! // Build the corpus index: chunk, embed, normalize, append in order
//! let index = IndexBuilder::new().build(&documents, &embedder).unwrap();
//!
//! // Retrieve ranked passages for a query
//! let retriever = Retriever::new(index, embedder);
//! let results = retriever.retrieve("what identity checks apply?", 2).unwrap();
//! assert!(!results.is_empty());
//!
//! // Compose a bounded, citation-ready prompt
//! let prompt = PromptComposer::default().compose("what identity checks apply?", &results);
//! assert!(prompt.contains("[SRC_1]"));
//! ```
//!
//! # Chunking Strategies
//!
//! - [`FixedChunker`] - consecutive fixed-size token groups
//! - [`OverlappingChunker`] - token windows with overlap
//! - [`SentenceChunker`] - sentence grouping under a character budget
//! - [`SentenceOverlapChunker`] - sentence grouping under a word budget with
//!   overlap carry (the index-build default)
//!
//! # Evaluation
//!
//! [`metrics`] computes recall@k, precision@k, and mean reciprocal rank from
//! replayed result sets and ground-truth relevance sets, independently of
//! live retrieval.

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::unnecessary_map_or)]

pub mod builder;
pub mod chunk;
pub mod embed;
pub mod error;
pub mod index;
pub mod metrics;
pub mod pipeline;
pub mod prompt;
pub mod retrieve;

pub use builder::IndexBuilder;
pub use chunk::{
    ChunkMeta, ChunkRef, ChunkStrategy, Chunker, FixedChunker, OverlappingChunker,
    SentenceChunker, SentenceOverlapChunker,
};
pub use embed::{cosine_similarity, Embedder, MockEmbedder, TfIdfEmbedder};
pub use error::{Error, Result};
pub use index::{CorpusIndex, FlatIpIndex, VectorIndex};
pub use metrics::{evaluate, mean_reciprocal_rank, precision_at_k, recall_at_k, EvalSummary};
pub use pipeline::{GenerationModel, GroundedAnswer, RagPipeline, StaticGenerator};
pub use prompt::PromptComposer;
pub use retrieve::{RetrievalResult, Retriever};

/// A document to be indexed.
///
/// The id must be unique within the corpus and stable across rebuilds; the
/// CLI uses the source file name.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Document {
    /// Unique, stable document identifier
    pub id: String,
    /// Document text content
    pub text: String,
}

impl Document {
    /// Create a new document
    #[must_use]
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }
}
