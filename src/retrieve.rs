//! Query-time retrieval over a built corpus index

use crate::chunk::ChunkRef;
use crate::embed::{l2_normalize, Embedder};
use crate::index::CorpusIndex;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// A ranked retrieval hit: similarity score plus the chunk it points at
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalResult {
    /// Similarity score, higher = more similar
    pub score: f32,
    /// Source document identifier
    pub doc_id: String,
    /// Ordinal of the chunk within its document
    pub chunk_index: usize,
    /// Chunk text content
    pub text: String,
}

impl RetrievalResult {
    /// Identity of the retrieved chunk
    #[must_use]
    pub fn chunk_ref(&self) -> ChunkRef {
        ChunkRef::new(self.doc_id.clone(), self.chunk_index)
    }
}

/// Retriever over a built corpus index.
///
/// Owns its index and embedder explicitly; multiple retrievers over
/// different indices can coexist in one process.
pub struct Retriever<E: Embedder> {
    index: CorpusIndex,
    embedder: E,
}

impl<E: Embedder> Retriever<E> {
    /// Create a retriever from a corpus index and the embedder that built it
    #[must_use]
    pub fn new(index: CorpusIndex, embedder: E) -> Self {
        Self { index, embedder }
    }

    /// The underlying corpus index
    #[must_use]
    pub fn index(&self) -> &CorpusIndex {
        &self.index
    }

    /// The embedder used for queries
    #[must_use]
    pub fn embedder(&self) -> &E {
        &self.embedder
    }

    /// Number of indexed chunks
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether the corpus is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Retrieve the k most similar chunks for a query.
    ///
    /// The query embedding is normalized exactly like the build-time vectors,
    /// so the inner-product search scores are cosine similarities. Results
    /// come back in descending score order; exact ties are broken by
    /// `(doc_id, chunk_index)` so identical queries against an identical
    /// index always rank identically. Asking for more results than the
    /// corpus holds returns everything; an empty corpus returns nothing.
    pub fn retrieve(&self, query: &str, k: usize) -> Result<Vec<RetrievalResult>> {
        if k == 0 {
            return Err(Error::InvalidConfig(
                "k must be positive".to_string(),
            ));
        }
        if self.index.is_empty() {
            return Ok(Vec::new());
        }

        let mut query_vector = self.embedder.embed_query(query)?;
        l2_normalize(&mut query_vector);

        let hits = self.index.search(&query_vector, k)?;
        let mut results: Vec<RetrievalResult> = hits
            .into_iter()
            .map(|(score, meta)| RetrievalResult {
                score,
                doc_id: meta.doc_id.clone(),
                chunk_index: meta.chunk_index,
                text: meta.text.clone(),
            })
            .collect();

        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.doc_id.cmp(&b.doc_id))
                .then_with(|| a.chunk_index.cmp(&b.chunk_index))
        });

        tracing::debug!(
            k,
            returned = results.len(),
            top_score = results.first().map(|r| r.score),
            "retrieved chunks"
        );
        Ok(results)
    }
}
