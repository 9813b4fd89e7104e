//! Grounded prompt composition from ranked retrieval results

use crate::retrieve::RetrievalResult;

/// Default character budget for a composed prompt
pub const DEFAULT_MAX_CHARS: usize = 3000;

const DEFAULT_PREAMBLE: &str = "Use only the provided sources to answer the question. \
     Cite sources by label (e.g., [SRC_1]). \
     If the answer is not present in the sources, say 'INSUFFICIENT DATA'.";

/// Composes ranked retrieval results into a bounded, citation-ready prompt.
///
/// Composition is pure and deterministic: the same query and results always
/// produce the same string.
#[derive(Debug, Clone)]
pub struct PromptComposer {
    max_chars: usize,
    preamble: String,
}

impl PromptComposer {
    /// Create a composer with the given character budget
    #[must_use]
    pub fn new(max_chars: usize) -> Self {
        Self {
            max_chars,
            preamble: DEFAULT_PREAMBLE.to_string(),
        }
    }

    /// Replace the grounding instruction text
    #[must_use]
    pub fn with_preamble(mut self, preamble: impl Into<String>) -> Self {
        self.preamble = preamble.into();
        self
    }

    /// The character budget
    #[must_use]
    pub fn max_chars(&self) -> usize {
        self.max_chars
    }

    /// Compose a grounded prompt from ranked results.
    ///
    /// Sources are labeled `[SRC_1]`, `[SRC_2]`, ... in input order, which is
    /// expected to be rank order. A prompt over the budget is truncated to at
    /// most `max_chars` bytes, backed up to the nearest UTF-8 boundary; the
    /// cut may fall inside the final source block, so size the budget
    /// generously when whole blocks matter.
    #[must_use]
    pub fn compose(&self, query: &str, results: &[RetrievalResult]) -> String {
        let blocks: Vec<String> = results
            .iter()
            .enumerate()
            .map(|(i, r)| {
                format!(
                    "[SRC_{}] (Doc:{}, Chunk:{})\n{}\n",
                    i + 1,
                    r.doc_id,
                    r.chunk_index,
                    r.text
                )
            })
            .collect();
        let context = blocks.join("\n\n");

        let mut prompt = format!(
            "{}\n\nSOURCES:\n{}\n\nQUESTION: {}\n\n\
             Answer concisely and cite sources.",
            self.preamble, context, query
        );

        if prompt.len() > self.max_chars {
            let mut end = self.max_chars;
            while !prompt.is_char_boundary(end) {
                end -= 1;
            }
            prompt.truncate(end);
        }

        prompt
    }
}

impl Default for PromptComposer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CHARS)
    }
}
