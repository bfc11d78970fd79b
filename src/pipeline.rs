//! The query pipeline.
//!
//! `summarize` runs the fixed stage order: embed the query, retrieve the
//! nearest stored document, render the prompt, call the generator, and
//! return the trimmed text. Every collaborator is passed in at
//! construction so tests can substitute fakes.

use std::sync::Arc;

use crate::errors::ApiError;
use crate::llm::{Embedder, GenerationParams, Generator};
use crate::prompt;
use crate::store::{DocumentMatch, VectorStore};

/// Retrieval behavior. `score_threshold: None` always returns the nearest
/// record, matching the original best-effort behavior; `Some(t)` turns a
/// best score below `t` into a `NoMatch` error.
#[derive(Debug, Clone, Copy)]
pub struct RetrievalOptions {
    pub top_k: usize,
    pub score_threshold: Option<f32>,
}

impl Default for RetrievalOptions {
    fn default() -> Self {
        RetrievalOptions {
            top_k: 1,
            score_threshold: None,
        }
    }
}

pub struct SummaryPipeline {
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
    generator: Arc<dyn Generator>,
    params: GenerationParams,
    options: RetrievalOptions,
}

impl SummaryPipeline {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn VectorStore>,
        generator: Arc<dyn Generator>,
        params: GenerationParams,
        options: RetrievalOptions,
    ) -> Self {
        Self {
            embedder,
            store,
            generator,
            params,
            options,
        }
    }

    /// Runs the full pipeline for a free-text exception name.
    pub async fn summarize(&self, query: &str) -> Result<String, ApiError> {
        let query_embedding = self.embed_query(query).await?;
        let best = self.retrieve(&query_embedding).await?;

        tracing::debug!(
            doc_id = %best.document.doc_id,
            score = best.score,
            "retrieved nearest record"
        );

        let rendered = prompt::render_prompt(&best.document);
        let raw = self.generator.generate(&rendered, &self.params).await?;
        Ok(parse_output(&raw))
    }

    async fn embed_query(&self, query: &str) -> Result<Vec<f32>, ApiError> {
        let mut vectors = self.embedder.embed(&[query.to_string()]).await?;
        vectors
            .pop()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ApiError::Embedding("empty query embedding".to_string()))
    }

    async fn retrieve(&self, query_embedding: &[f32]) -> Result<DocumentMatch, ApiError> {
        if let Some(indexed_model) = self.store.embedding_model().await? {
            if indexed_model != self.embedder.model_id() {
                tracing::warn!(
                    indexed = %indexed_model,
                    configured = %self.embedder.model_id(),
                    "index was built with a different embedding model"
                );
            }
        }

        let matches = self
            .store
            .search(query_embedding, self.options.top_k.max(1))
            .await?;

        let best = matches.into_iter().next().ok_or(ApiError::IndexEmpty)?;

        if let Some(threshold) = self.options.score_threshold {
            if best.score < threshold {
                return Err(ApiError::NoMatch(format!(
                    "best score {:.3} below threshold {:.3}",
                    best.score, threshold
                )));
            }
        }

        Ok(best)
    }
}

/// The model output is plain text; parsing is a trim.
fn parse_output(raw: &str) -> String {
    raw.trim().to_string()
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::llm::types::GenerationParams;

    /// Deterministic embedder: one dimension per known exception name,
    /// set when the text mentions that name. A text and the name it
    /// mentions therefore have maximal mutual similarity.
    pub struct FakeEmbedder;

    const VOCABULARY: [&str; 2] = ["InvalidProductVariant", "PaymentGatewayTimeout"];

    #[async_trait]
    impl Embedder for FakeEmbedder {
        async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, ApiError> {
            Ok(inputs
                .iter()
                .map(|text| {
                    VOCABULARY
                        .iter()
                        .map(|name| if text.contains(name) { 1.0 } else { 0.0 })
                        .collect()
                })
                .collect())
        }

        fn model_id(&self) -> &str {
            "fake-embedder"
        }
    }

    /// Returns a canned summary and records the last prompt it saw.
    pub struct FakeGenerator {
        pub reply: String,
        pub last_prompt: Mutex<Option<String>>,
    }

    impl FakeGenerator {
        pub fn new(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                last_prompt: Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl Generator for FakeGenerator {
        async fn generate(
            &self,
            prompt: &str,
            _params: &GenerationParams,
        ) -> Result<String, ApiError> {
            *self.last_prompt.lock().unwrap() = Some(prompt.to_string());
            Ok(self.reply.clone())
        }
    }
}
