//! Vector index and the persisted corpus index artifact

use crate::chunk::ChunkMeta;
use crate::embed::dot_product;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Format version of the persisted corpus artifact
pub const FORMAT_VERSION: u32 = 1;

/// Trait for vector indices.
///
/// `add` is append-only and order-preserving: the position of a vector in
/// the index is determined solely by insertion order. `search` returns
/// `(score, position)` pairs in descending score order.
pub trait VectorIndex: Send + Sync {
    /// Append vectors to the index, preserving their order
    fn add(&mut self, vectors: &[Vec<f32>]) -> Result<()>;

    /// Search for the k nearest vectors, higher score = more similar
    fn search(&self, query: &[f32], k: usize) -> Result<Vec<(f32, usize)>>;

    /// Number of stored vectors
    fn len(&self) -> usize;

    /// Whether the index holds no vectors
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Flat inner-product index.
///
/// Scores every stored vector against the query; on unit-normalized vectors
/// the inner product equals cosine similarity. Exact score ties keep
/// insertion order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlatIpIndex {
    dimension: usize,
    vectors: Vec<Vec<f32>>,
}

impl FlatIpIndex {
    /// Create an empty index for the given dimension
    #[must_use]
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            vectors: Vec::new(),
        }
    }

    /// The dimension every stored vector must have
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.dimension
    }
}

impl VectorIndex for FlatIpIndex {
    fn add(&mut self, vectors: &[Vec<f32>]) -> Result<()> {
        for vector in vectors {
            if vector.len() != self.dimension {
                return Err(Error::DimensionMismatch {
                    expected: self.dimension,
                    actual: vector.len(),
                });
            }
        }
        self.vectors.extend_from_slice(vectors);
        Ok(())
    }

    fn search(&self, query: &[f32], k: usize) -> Result<Vec<(f32, usize)>> {
        if query.len() != self.dimension {
            return Err(Error::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }

        let mut scores: Vec<(f32, usize)> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(position, vector)| (dot_product(query, vector), position))
            .collect();

        scores.sort_by(|a, b| {
            b.0.partial_cmp(&a.0)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.1.cmp(&b.1))
        });
        scores.truncate(k);

        Ok(scores)
    }

    fn len(&self) -> usize {
        self.vectors.len()
    }
}

/// The corpus index: vectors and their metadata stored together.
///
/// Position is the join key between the two halves, so they are kept as one
/// entity and the pairing is verified on every load. The ordering of
/// `metadata` must exactly match the order vectors were added to `index`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusIndex {
    version: u32,
    index: FlatIpIndex,
    metadata: Vec<ChunkMeta>,
}

impl CorpusIndex {
    /// Create an empty corpus index for the given dimension
    #[must_use]
    pub fn empty(dimension: usize) -> Self {
        Self {
            version: FORMAT_VERSION,
            index: FlatIpIndex::new(dimension),
            metadata: Vec::new(),
        }
    }

    /// Assemble a corpus index from position-aligned vectors and metadata.
    ///
    /// Fails if the two halves have different lengths.
    pub fn from_parts(index: FlatIpIndex, metadata: Vec<ChunkMeta>) -> Result<Self> {
        let corpus = Self {
            version: FORMAT_VERSION,
            index,
            metadata,
        };
        corpus.verify()?;
        Ok(corpus)
    }

    /// Verify the artifact pairing: format version and length equality
    pub fn verify(&self) -> Result<()> {
        if self.version != FORMAT_VERSION {
            return Err(Error::IndexNotFound(format!(
                "unsupported format version {} (expected {FORMAT_VERSION})",
                self.version
            )));
        }
        if self.index.len() != self.metadata.len() {
            return Err(Error::IndexNotFound(format!(
                "vector/metadata count mismatch: {} vectors vs {} entries",
                self.index.len(),
                self.metadata.len()
            )));
        }
        Ok(())
    }

    /// Search the index and join each hit with its metadata entry by position
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<(f32, &ChunkMeta)>> {
        if self.is_empty() {
            return Ok(Vec::new());
        }
        let hits = self.index.search(query, k)?;
        Ok(hits
            .into_iter()
            .map(|(score, position)| (score, &self.metadata[position]))
            .collect())
    }

    /// The metadata entry at a vector position
    #[must_use]
    pub fn get(&self, position: usize) -> Option<&ChunkMeta> {
        self.metadata.get(position)
    }

    /// Position-aligned metadata entries
    #[must_use]
    pub fn metadata(&self) -> &[ChunkMeta] {
        &self.metadata
    }

    /// The embedding dimension of the index
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.index.dimension()
    }

    /// Number of indexed chunks
    #[must_use]
    pub fn len(&self) -> usize {
        self.metadata.len()
    }

    /// Whether the corpus is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.metadata.is_empty()
    }

    /// Persist the artifact to a file.
    ///
    /// The write goes through a temporary sibling file and a rename, so a
    /// failed save never leaves a partial artifact at `path`.
    pub fn save(&self, path: &Path) -> Result<()> {
        self.verify()?;
        let json = serde_json::to_string(self)?;

        let tmp = path.with_extension("tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, path)?;

        tracing::info!(
            path = %path.display(),
            chunks = self.len(),
            dimension = self.dimension(),
            "saved corpus index"
        );
        Ok(())
    }

    /// Load a persisted artifact, verifying the vector/metadata pairing.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::IndexNotFound(format!(
                "no index artifact at {}",
                path.display()
            )));
        }

        let json = fs::read_to_string(path)?;
        let corpus: Self = serde_json::from_str(&json)?;
        corpus.verify()?;

        tracing::debug!(
            path = %path.display(),
            chunks = corpus.len(),
            "loaded corpus index"
        );
        Ok(corpus)
    }
}
