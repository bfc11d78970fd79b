//! Vector index abstraction.
//!
//! The query path only needs "nearest documents for a query vector"; the
//! indexing path only needs "replace everything with these (document,
//! vector) pairs". The primary implementation is `SqliteVectorStore`.

mod sqlite;

pub use sqlite::SqliteVectorStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::ApiError;

/// One exception record as persisted alongside its embedding.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredDocument {
    pub doc_id: String,
    pub exception_name: String,
    pub exception_cause: String,
    pub exception_resolution: String,
}

impl StoredDocument {
    /// The text the embedding is computed over. All four semantic fields
    /// participate so an exact-name query has maximal self-similarity.
    pub fn embedding_text(&self) -> String {
        format!(
            "Name: {}\nCause: {}\nResolution: {}",
            self.exception_name, self.exception_cause, self.exception_resolution
        )
    }
}

/// Result of a similarity search, best first.
#[derive(Debug, Clone)]
pub struct DocumentMatch {
    pub document: StoredDocument,
    /// Cosine similarity (higher = nearer).
    pub score: f32,
}

#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Insert documents with their embeddings in one transaction.
    async fn insert_batch(
        &self,
        items: Vec<(StoredDocument, Vec<f32>)>,
    ) -> Result<(), ApiError>;

    /// Nearest documents to the query embedding, descending by similarity.
    async fn search(
        &self,
        query_embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<DocumentMatch>, ApiError>;

    /// Total number of stored documents.
    async fn count(&self) -> Result<usize, ApiError>;

    /// Remove all documents. Used by a full index rebuild.
    async fn clear(&self) -> Result<(), ApiError>;

    /// Embedding model recorded at index time, if any.
    async fn embedding_model(&self) -> Result<Option<String>, ApiError>;

    /// Record which embedding model produced the stored vectors.
    async fn set_embedding_model(&self, model_id: &str) -> Result<(), ApiError>;
}
