//! End-to-end pipeline: retrieve, compose, generate

use crate::embed::Embedder;
use crate::prompt::PromptComposer;
use crate::retrieve::{RetrievalResult, Retriever};
use crate::Result;
use serde::{Deserialize, Serialize};

/// Trait for the downstream text-generation model.
///
/// The engine guarantees only the shape of the prompt it hands over; the
/// call itself, its transport, and its retry policy belong to the
/// implementor.
pub trait GenerationModel: Send + Sync {
    /// Generate a response for a prompt
    fn generate(&self, prompt: &str) -> Result<String>;
}

/// Generation stand-in that returns a fixed response (tests and demos)
#[derive(Debug, Clone)]
pub struct StaticGenerator {
    response: String,
}

impl StaticGenerator {
    /// Create a generator that always returns `response`
    #[must_use]
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
        }
    }
}

impl Default for StaticGenerator {
    fn default() -> Self {
        Self::new("generation model response placeholder")
    }
}

impl GenerationModel for StaticGenerator {
    fn generate(&self, _prompt: &str) -> Result<String> {
        Ok(self.response.clone())
    }
}

/// A fully grounded answer: the retrieval evidence, the prompt it produced,
/// and the generation model's response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroundedAnswer {
    /// The original query
    pub query: String,
    /// Ranked retrieval results backing the answer
    pub results: Vec<RetrievalResult>,
    /// The composed prompt handed to the generation model
    pub prompt: String,
    /// The generation model's response
    pub response: String,
}

/// Retrieval pipeline tying a retriever, a prompt composer, and a
/// generation model together.
pub struct RagPipeline<E: Embedder, G: GenerationModel> {
    retriever: Retriever<E>,
    composer: PromptComposer,
    generator: G,
}

impl<E: Embedder, G: GenerationModel> RagPipeline<E, G> {
    /// Create a pipeline from its three collaborators
    #[must_use]
    pub fn new(retriever: Retriever<E>, composer: PromptComposer, generator: G) -> Self {
        Self {
            retriever,
            composer,
            generator,
        }
    }

    /// The underlying retriever
    #[must_use]
    pub fn retriever(&self) -> &Retriever<E> {
        &self.retriever
    }

    /// Retrieve the top-k chunks for a query
    pub fn retrieve(&self, query: &str, k: usize) -> Result<Vec<RetrievalResult>> {
        self.retriever.retrieve(query, k)
    }

    /// Retrieve, compose a grounded prompt, and call the generation model
    pub fn answer(&self, query: &str, k: usize) -> Result<GroundedAnswer> {
        let results = self.retriever.retrieve(query, k)?;
        let prompt = self.composer.compose(query, &results);
        let response = self.generator.generate(&prompt)?;

        Ok(GroundedAnswer {
            query: query.to_string(),
            results,
            prompt,
            response,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::IndexBuilder;
    use crate::chunk::SentenceChunker;
    use crate::embed::MockEmbedder;
    use crate::index::CorpusIndex;
    use crate::Document;

    fn build_pipeline() -> RagPipeline<MockEmbedder, StaticGenerator> {
        let embedder = MockEmbedder::new(32);
        let builder = IndexBuilder::with_chunker(SentenceChunker::new(80).unwrap());
        let docs = vec![
            Document::new(
                "contract.txt",
                "The contract includes identity verification clauses. \
                 High-value transfers need extra review.",
            ),
            Document::new(
                "policy.txt",
                "Data usage requires documented consent. \
                 Records are kept for five years.",
            ),
        ];
        let index = builder.build(&docs, &embedder).unwrap();
        RagPipeline::new(
            Retriever::new(index, embedder),
            PromptComposer::default(),
            StaticGenerator::new("grounded response"),
        )
    }

    #[test]
    fn test_answer_carries_all_stages() {
        let pipeline = build_pipeline();
        let answer = pipeline.answer("What review applies to transfers?", 3).unwrap();

        assert_eq!(answer.query, "What review applies to transfers?");
        assert!(!answer.results.is_empty());
        assert!(answer.prompt.contains("[SRC_1]"));
        assert!(answer.prompt.contains("QUESTION: What review applies to transfers?"));
        assert_eq!(answer.response, "grounded response");
    }

    #[test]
    fn test_answer_prompt_cites_retrieved_chunks() {
        let pipeline = build_pipeline();
        let answer = pipeline.answer("consent records", 2).unwrap();

        for result in &answer.results {
            assert!(answer
                .prompt
                .contains(&format!("Doc:{}, Chunk:{}", result.doc_id, result.chunk_index)));
        }
    }

    #[test]
    fn test_answer_empty_corpus() {
        let embedder = MockEmbedder::new(16);
        let pipeline = RagPipeline::new(
            Retriever::new(CorpusIndex::empty(16), embedder),
            PromptComposer::default(),
            StaticGenerator::default(),
        );

        let answer = pipeline.answer("anything", 5).unwrap();
        assert!(answer.results.is_empty());
        assert!(!answer.prompt.contains("[SRC_1]"));
    }

    #[test]
    fn test_retrieve_passthrough() {
        let pipeline = build_pipeline();
        let results = pipeline.retrieve("identity verification", 2).unwrap();
        assert!(!results.is_empty());
        assert!(results.len() <= 2);
    }

    #[test]
    fn test_generator_failure_propagates() {
        struct FailingGenerator;
        impl GenerationModel for FailingGenerator {
            fn generate(&self, _prompt: &str) -> Result<String> {
                Err(crate::Error::InvalidConfig("no model configured".to_string()))
            }
        }

        let embedder = MockEmbedder::new(16);
        let index = IndexBuilder::new()
            .build(&[Document::new("d.txt", "Some text.")], &embedder)
            .unwrap();
        let pipeline = RagPipeline::new(
            Retriever::new(index, embedder),
            PromptComposer::default(),
            FailingGenerator,
        );

        assert!(pipeline.answer("query", 1).is_err());
    }

    #[test]
    fn test_grounded_answer_serialization() {
        let pipeline = build_pipeline();
        let answer = pipeline.answer("consent", 2).unwrap();

        let json = serde_json::to_string(&answer).unwrap();
        let back: GroundedAnswer = serde_json::from_str(&json).unwrap();
        assert_eq!(back.query, answer.query);
        assert_eq!(back.results.len(), answer.results.len());
    }
}
