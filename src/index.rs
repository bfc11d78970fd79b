//! Offline indexing step: embed every document and rebuild the index.

use std::sync::Arc;

use crate::errors::ApiError;
use crate::llm::Embedder;
use crate::store::{StoredDocument, VectorStore};

/// Embeds `documents` in one batch call and replaces the store contents
/// with the new (document, vector) pairs. Returns the indexed count.
///
/// Rebuilds are all-or-nothing at the insert level; there is no dedup or
/// delta indexing.
pub async fn build_index(
    store: &Arc<dyn VectorStore>,
    embedder: &Arc<dyn Embedder>,
    documents: Vec<StoredDocument>,
) -> Result<usize, ApiError> {
    let texts: Vec<String> = documents.iter().map(StoredDocument::embedding_text).collect();
    let embeddings = embedder.embed(&texts).await?;

    if embeddings.len() != documents.len() {
        return Err(ApiError::Embedding(format!(
            "embedder returned {} vectors for {} documents",
            embeddings.len(),
            documents.len()
        )));
    }

    store.clear().await?;
    let count = documents.len();
    store
        .insert_batch(documents.into_iter().zip(embeddings).collect())
        .await?;
    store.set_embedding_model(embedder.model_id()).await?;

    tracing::info!("indexed {} documents", count);
    Ok(count)
}
