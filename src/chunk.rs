//! Document chunking strategies for the retrieval engine

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Identity of a chunk: its source document plus its ordinal within it.
///
/// The pair is unique across the whole corpus and stable across rebuilds,
/// which makes it usable as a ground-truth key for evaluation.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ChunkRef {
    /// Source document identifier
    pub doc_id: String,
    /// Ordinal of the chunk within its document
    pub chunk_index: usize,
}

impl ChunkRef {
    /// Create a new chunk reference
    #[must_use]
    pub fn new(doc_id: impl Into<String>, chunk_index: usize) -> Self {
        Self {
            doc_id: doc_id.into(),
            chunk_index,
        }
    }
}

impl std::fmt::Display for ChunkRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.doc_id, self.chunk_index)
    }
}

/// Metadata entry carried alongside each indexed vector.
///
/// Entries are stored position-aligned with the vectors they describe;
/// the position in the metadata list is the join key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkMeta {
    /// Source document identifier
    pub doc_id: String,
    /// Ordinal of the chunk within its document
    pub chunk_index: usize,
    /// Chunk text content
    pub text: String,
}

impl ChunkMeta {
    /// Create a new metadata entry
    #[must_use]
    pub fn new(doc_id: impl Into<String>, chunk_index: usize, text: impl Into<String>) -> Self {
        Self {
            doc_id: doc_id.into(),
            chunk_index,
            text: text.into(),
        }
    }

    /// Identity of this chunk
    #[must_use]
    pub fn chunk_ref(&self) -> ChunkRef {
        ChunkRef::new(self.doc_id.clone(), self.chunk_index)
    }
}

/// Trait for text chunkers.
///
/// A chunker is a pure function of its input: the same text always produces
/// the same finite, order-preserving sequence of chunk texts. Empty input
/// produces an empty sequence.
pub trait Chunker: Send + Sync {
    /// Split text into chunk texts
    fn chunk(&self, text: &str) -> Result<Vec<String>>;
}

/// Split text into sentences on terminal punctuation followed by whitespace.
///
/// Text without any terminator is a single sentence.
fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;

    for (i, c) in text.char_indices() {
        if matches!(c, '.' | '!' | '?') {
            let end = i + c.len_utf8();
            let next = text[end..].chars().next();
            if next.map_or(true, char::is_whitespace) {
                let sentence = text[start..end].trim();
                if !sentence.is_empty() {
                    sentences.push(sentence);
                }
                start = end;
            }
        }
    }

    let remaining = text[start..].trim();
    if !remaining.is_empty() {
        sentences.push(remaining);
    }

    sentences
}

/// Fixed-size chunker: consecutive groups of `chunk_size` whitespace tokens.
#[derive(Debug, Clone)]
pub struct FixedChunker {
    chunk_size: usize,
}

impl FixedChunker {
    /// Create a new fixed-size chunker
    pub fn new(chunk_size: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(Error::InvalidConfig(
                "chunk size must be positive".to_string(),
            ));
        }
        Ok(Self { chunk_size })
    }
}

impl Chunker for FixedChunker {
    fn chunk(&self, text: &str) -> Result<Vec<String>> {
        let words: Vec<&str> = text.split_whitespace().collect();
        Ok(words
            .chunks(self.chunk_size)
            .map(|group| group.join(" "))
            .collect())
    }
}

/// Overlapping chunker: windows of `chunk_size` tokens advancing by
/// `chunk_size - overlap` tokens.
#[derive(Debug, Clone)]
pub struct OverlappingChunker {
    chunk_size: usize,
    overlap: usize,
}

impl OverlappingChunker {
    /// Create a new overlapping chunker.
    ///
    /// `overlap` must be strictly less than `chunk_size`; anything else
    /// would stall the advancing window.
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(Error::InvalidConfig(
                "chunk size must be positive".to_string(),
            ));
        }
        if overlap >= chunk_size {
            return Err(Error::InvalidConfig(format!(
                "overlap ({overlap}) must be less than chunk size ({chunk_size})"
            )));
        }
        Ok(Self {
            chunk_size,
            overlap,
        })
    }
}

impl Chunker for OverlappingChunker {
    fn chunk(&self, text: &str) -> Result<Vec<String>> {
        let words: Vec<&str> = text.split_whitespace().collect();
        let step = self.chunk_size - self.overlap;
        let mut chunks = Vec::new();
        let mut i = 0;

        while i < words.len() {
            let end = (i + self.chunk_size).min(words.len());
            chunks.push(words[i..end].join(" "));
            // the window now covers the final token; overlap would only
            // re-emit trailing tokens
            if i + self.chunk_size >= words.len() {
                break;
            }
            i += step;
        }

        Ok(chunks)
    }
}

/// Sentence chunker: greedy sentence grouping under a character budget.
///
/// A single sentence longer than `max_len` is kept whole as its own chunk;
/// sentences are never split internally.
#[derive(Debug, Clone)]
pub struct SentenceChunker {
    max_len: usize,
}

impl SentenceChunker {
    /// Create a new sentence chunker with a character budget per chunk
    pub fn new(max_len: usize) -> Result<Self> {
        if max_len == 0 {
            return Err(Error::InvalidConfig(
                "maximum chunk length must be positive".to_string(),
            ));
        }
        Ok(Self { max_len })
    }
}

impl Chunker for SentenceChunker {
    fn chunk(&self, text: &str) -> Result<Vec<String>> {
        let sentences = split_sentences(text);
        let mut chunks = Vec::new();
        let mut current = String::new();

        for sentence in sentences {
            if !current.is_empty() && current.len() + sentence.len() > self.max_len {
                chunks.push(std::mem::take(&mut current));
            }
            if current.is_empty() {
                current.push_str(sentence);
            } else {
                current.push(' ');
                current.push_str(sentence);
            }
        }

        if !current.is_empty() {
            chunks.push(current);
        }

        Ok(chunks)
    }
}

/// Sentence chunker measured in words, carrying trailing overlap words
/// across chunk boundaries.
///
/// This is the default build-time strategy: the carried words preserve
/// cross-boundary context for retrieval.
#[derive(Debug, Clone)]
pub struct SentenceOverlapChunker {
    max_words: usize,
    overlap: usize,
}

impl SentenceOverlapChunker {
    /// Create a new sentence chunker with a word budget and overlap carry
    pub fn new(max_words: usize, overlap: usize) -> Result<Self> {
        if max_words == 0 {
            return Err(Error::InvalidConfig(
                "maximum chunk word count must be positive".to_string(),
            ));
        }
        if overlap >= max_words {
            return Err(Error::InvalidConfig(format!(
                "overlap ({overlap}) must be less than maximum word count ({max_words})"
            )));
        }
        Ok(Self { max_words, overlap })
    }
}

impl Default for SentenceOverlapChunker {
    fn default() -> Self {
        Self {
            max_words: 400,
            overlap: 50,
        }
    }
}

impl Chunker for SentenceOverlapChunker {
    fn chunk(&self, text: &str) -> Result<Vec<String>> {
        let sentences = split_sentences(text);
        let mut chunks: Vec<String> = Vec::new();
        let mut current: Vec<String> = Vec::new();
        let mut current_words = 0usize;

        for sentence in sentences {
            let word_count = sentence.split_whitespace().count();
            if !current.is_empty() && current_words + word_count > self.max_words {
                let chunk = current.join(" ");
                current.clear();
                current_words = 0;
                if self.overlap > 0 {
                    let words: Vec<&str> = chunk.split_whitespace().collect();
                    let tail_start = words.len().saturating_sub(self.overlap);
                    if tail_start < words.len() {
                        current_words = words.len() - tail_start;
                        current.push(words[tail_start..].join(" "));
                    }
                }
                chunks.push(chunk);
            }
            current_words += word_count;
            current.push(sentence.to_string());
        }

        if !current.is_empty() {
            chunks.push(current.join(" "));
        }

        Ok(chunks)
    }
}

/// Chunking strategy selection with parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ChunkStrategy {
    /// Consecutive groups of `chunk_size` tokens
    Fixed {
        /// Tokens per chunk
        chunk_size: usize,
    },
    /// Token windows advancing by `chunk_size - overlap`
    Overlapping {
        /// Tokens per chunk
        chunk_size: usize,
        /// Tokens shared between consecutive chunks
        overlap: usize,
    },
    /// Sentence grouping under a character budget
    Sentence {
        /// Characters per chunk
        max_len: usize,
    },
    /// Sentence grouping under a word budget with overlap carry
    SentenceOverlap {
        /// Words per chunk
        max_words: usize,
        /// Trailing words carried into the next chunk
        overlap: usize,
    },
}

impl Default for ChunkStrategy {
    fn default() -> Self {
        Self::SentenceOverlap {
            max_words: 400,
            overlap: 50,
        }
    }
}

impl ChunkStrategy {
    /// Construct the chunker this strategy names
    pub fn into_chunker(self) -> Result<Box<dyn Chunker>> {
        match self {
            Self::Fixed { chunk_size } => Ok(Box::new(FixedChunker::new(chunk_size)?)),
            Self::Overlapping {
                chunk_size,
                overlap,
            } => Ok(Box::new(OverlappingChunker::new(chunk_size, overlap)?)),
            Self::Sentence { max_len } => Ok(Box::new(SentenceChunker::new(max_len)?)),
            Self::SentenceOverlap { max_words, overlap } => {
                Ok(Box::new(SentenceOverlapChunker::new(max_words, overlap)?))
            }
        }
    }
}
