//! Corpus index construction

use crate::chunk::{ChunkMeta, Chunker, SentenceOverlapChunker};
use crate::embed::{l2_normalize, Embedder};
use crate::index::{CorpusIndex, FlatIpIndex, VectorIndex};
use crate::{Document, Error, Result};

/// Builds a [`CorpusIndex`] from documents, an embedding provider, and a
/// chunking strategy.
///
/// The build is one-shot: chunk everything, embed everything in a single
/// ordered batch, then append vectors and metadata in lockstep. A provider
/// failure aborts the whole build; nothing is persisted by the builder, so
/// there is never a partial artifact.
pub struct IndexBuilder {
    chunker: Box<dyn Chunker>,
}

impl IndexBuilder {
    /// Create a builder with the default sentence-with-overlap strategy
    #[must_use]
    pub fn new() -> Self {
        Self {
            chunker: Box::new(SentenceOverlapChunker::default()),
        }
    }

    /// Create a builder with a specific chunker
    #[must_use]
    pub fn with_chunker(chunker: impl Chunker + 'static) -> Self {
        Self {
            chunker: Box::new(chunker),
        }
    }

    /// Build a corpus index over the given documents.
    ///
    /// An empty document set produces a valid empty index.
    pub fn build<E: Embedder>(
        &self,
        documents: &[Document],
        embedder: &E,
    ) -> Result<CorpusIndex> {
        let mut metadata: Vec<ChunkMeta> = Vec::new();

        for document in documents {
            let chunks = self.chunker.chunk(&document.text)?;
            for (chunk_index, text) in chunks.into_iter().enumerate() {
                metadata.push(ChunkMeta::new(document.id.clone(), chunk_index, text));
            }
        }

        if metadata.is_empty() {
            tracing::info!(
                documents = documents.len(),
                "built empty corpus index (no chunks produced)"
            );
            return Ok(CorpusIndex::empty(embedder.dimension()));
        }

        let texts: Vec<&str> = metadata.iter().map(|m| m.text.as_str()).collect();
        let mut vectors = embedder.embed_batch(&texts)?;

        if vectors.len() != metadata.len() {
            return Err(Error::Embedding(format!(
                "provider returned {} vectors for {} texts",
                vectors.len(),
                metadata.len()
            )));
        }

        let dimension = embedder.dimension();
        for vector in &mut vectors {
            if vector.len() != dimension {
                return Err(Error::DimensionMismatch {
                    expected: dimension,
                    actual: vector.len(),
                });
            }
            l2_normalize(vector);
        }

        // vectors and metadata are appended in the same order; position is
        // the join key for all future retrieval
        let mut index = FlatIpIndex::new(dimension);
        index.add(&vectors)?;

        let corpus = CorpusIndex::from_parts(index, metadata)?;
        tracing::info!(
            documents = documents.len(),
            chunks = corpus.len(),
            dimension,
            model = embedder.model_id(),
            "built corpus index"
        );
        Ok(corpus)
    }
}

impl Default for IndexBuilder {
    fn default() -> Self {
        Self::new()
    }
}
