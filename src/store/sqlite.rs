//! SQLite-backed vector store.
//!
//! In-process index using SQLite for the records and brute-force cosine
//! similarity for search. Embeddings are stored as little-endian f32 blobs.
//! The corpus is small (one row per known exception) so a linear scan is
//! the whole search strategy.

use std::path::PathBuf;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Row, SqlitePool};

use super::{DocumentMatch, StoredDocument, VectorStore};
use crate::errors::ApiError;

pub struct SqliteVectorStore {
    pool: SqlitePool,
    #[allow(dead_code)]
    db_path: PathBuf,
}

impl SqliteVectorStore {
    pub async fn open(db_path: PathBuf) -> Result<Self, ApiError> {
        let options = SqliteConnectOptions::new()
            .filename(&db_path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(4)
            .connect_with(options)
            .await
            .map_err(|err| ApiError::IndexUnavailable(err.to_string()))?;

        let store = Self { pool, db_path };
        store.init_schema().await?;
        Ok(store)
    }

    async fn init_schema(&self) -> Result<(), ApiError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS exception_docs (
                doc_id TEXT PRIMARY KEY,
                exception_name TEXT NOT NULL,
                exception_cause TEXT NOT NULL,
                exception_resolution TEXT NOT NULL,
                embedding BLOB NOT NULL,
                created_at TEXT NOT NULL DEFAULT (STRFTIME('%Y-%m-%dT%H:%M:%fZ', 'now'))
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(|err| ApiError::IndexUnavailable(err.to_string()))?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS index_meta (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL DEFAULT (STRFTIME('%Y-%m-%dT%H:%M:%fZ', 'now'))
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(|err| ApiError::IndexUnavailable(err.to_string()))?;

        Ok(())
    }

    fn serialize_embedding(embedding: &[f32]) -> Vec<u8> {
        embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
    }

    fn deserialize_embedding(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect()
    }

    pub(crate) fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
        if a.len() != b.len() || a.is_empty() {
            return 0.0;
        }

        let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
        let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
        let denom = norm_a * norm_b;

        if denom <= f32::EPSILON {
            0.0
        } else {
            dot / denom
        }
    }

    fn row_to_document(row: &sqlx::sqlite::SqliteRow) -> StoredDocument {
        StoredDocument {
            doc_id: row.get("doc_id"),
            exception_name: row.get("exception_name"),
            exception_cause: row.get("exception_cause"),
            exception_resolution: row.get("exception_resolution"),
        }
    }
}

#[async_trait]
impl VectorStore for SqliteVectorStore {
    async fn insert_batch(
        &self,
        items: Vec<(StoredDocument, Vec<f32>)>,
    ) -> Result<(), ApiError> {
        if items.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await.map_err(ApiError::internal)?;

        for (doc, embedding) in &items {
            let blob = Self::serialize_embedding(embedding);
            sqlx::query(
                "INSERT OR REPLACE INTO exception_docs
                    (doc_id, exception_name, exception_cause, exception_resolution, embedding)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )
            .bind(&doc.doc_id)
            .bind(&doc.exception_name)
            .bind(&doc.exception_cause)
            .bind(&doc.exception_resolution)
            .bind(&blob)
            .execute(&mut *tx)
            .await
            .map_err(ApiError::internal)?;
        }

        tx.commit().await.map_err(ApiError::internal)?;
        Ok(())
    }

    async fn search(
        &self,
        query_embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<DocumentMatch>, ApiError> {
        let rows = sqlx::query(
            "SELECT doc_id, exception_name, exception_cause, exception_resolution, embedding
             FROM exception_docs",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|err| ApiError::IndexUnavailable(err.to_string()))?;

        let mut scored: Vec<DocumentMatch> = rows
            .iter()
            .filter_map(|row| {
                let embedding_bytes: Vec<u8> = row.get("embedding");
                if embedding_bytes.is_empty() {
                    return None;
                }
                let stored = Self::deserialize_embedding(&embedding_bytes);
                let score = Self::cosine_similarity(query_embedding, &stored);

                Some(DocumentMatch {
                    document: Self::row_to_document(row),
                    score,
                })
            })
            .collect();

        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(limit.max(1));

        Ok(scored)
    }

    async fn count(&self) -> Result<usize, ApiError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM exception_docs")
            .fetch_one(&self.pool)
            .await
            .map_err(|err| ApiError::IndexUnavailable(err.to_string()))?;

        Ok(count as usize)
    }

    async fn clear(&self) -> Result<(), ApiError> {
        sqlx::query("DELETE FROM exception_docs")
            .execute(&self.pool)
            .await
            .map_err(ApiError::internal)?;
        Ok(())
    }

    async fn embedding_model(&self) -> Result<Option<String>, ApiError> {
        let value: Option<String> =
            sqlx::query_scalar("SELECT value FROM index_meta WHERE key = 'embedding_model'")
                .fetch_optional(&self.pool)
                .await
                .map_err(|err| ApiError::IndexUnavailable(err.to_string()))?;

        Ok(value)
    }

    async fn set_embedding_model(&self, model_id: &str) -> Result<(), ApiError> {
        sqlx::query(
            "INSERT OR REPLACE INTO index_meta (key, value, updated_at)
             VALUES ('embedding_model', ?1, STRFTIME('%Y-%m-%dT%H:%M:%fZ', 'now'))",
        )
        .bind(model_id)
        .execute(&self.pool)
        .await
        .map_err(ApiError::internal)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_store() -> (SqliteVectorStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteVectorStore::open(dir.path().join("index.db"))
            .await
            .unwrap();
        (store, dir)
    }

    fn make_doc(id: &str, name: &str, cause: &str, resolution: &str) -> StoredDocument {
        StoredDocument {
            doc_id: id.to_string(),
            exception_name: name.to_string(),
            exception_cause: cause.to_string(),
            exception_resolution: resolution.to_string(),
        }
    }

    #[tokio::test]
    async fn insert_and_search_ranks_by_similarity() {
        let (store, _dir) = test_store().await;

        store
            .insert_batch(vec![
                (make_doc("E1", "A", "cause a", "fix a"), vec![1.0, 0.0, 0.0]),
                (make_doc("E2", "B", "cause b", "fix b"), vec![0.0, 1.0, 0.0]),
                (make_doc("E3", "C", "cause c", "fix c"), vec![0.7, 0.7, 0.0]),
            ])
            .await
            .unwrap();

        assert_eq!(store.count().await.unwrap(), 3);

        let results = store.search(&[1.0, 0.0, 0.0], 2).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].document.doc_id, "E1");
        assert!(results[0].score > 0.99);
        assert_eq!(results[1].document.doc_id, "E3");
        assert!(results[1].score < results[0].score);
    }

    #[tokio::test]
    async fn search_on_empty_store_returns_nothing() {
        let (store, _dir) = test_store().await;
        let results = store.search(&[1.0, 0.0], 1).await.unwrap();
        assert!(results.is_empty());
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn insert_replaces_existing_doc_id() {
        let (store, _dir) = test_store().await;

        store
            .insert_batch(vec![(make_doc("E1", "A", "old", "old"), vec![1.0])])
            .await
            .unwrap();
        store
            .insert_batch(vec![(make_doc("E1", "A", "new", "new"), vec![1.0])])
            .await
            .unwrap();

        assert_eq!(store.count().await.unwrap(), 1);
        let results = store.search(&[1.0], 1).await.unwrap();
        assert_eq!(results[0].document.exception_cause, "new");
    }

    #[tokio::test]
    async fn clear_and_embedding_model_metadata() {
        let (store, _dir) = test_store().await;

        store
            .insert_batch(vec![(make_doc("E1", "A", "c", "r"), vec![1.0])])
            .await
            .unwrap();
        assert_eq!(store.embedding_model().await.unwrap(), None);

        store.set_embedding_model("embedding-001").await.unwrap();
        assert_eq!(
            store.embedding_model().await.unwrap().as_deref(),
            Some("embedding-001")
        );

        store.clear().await.unwrap();
        assert_eq!(store.count().await.unwrap(), 0);
        // meta survives a clear; it is overwritten by the next rebuild
        assert!(store.embedding_model().await.unwrap().is_some());
    }

    #[test]
    fn cosine_similarity_edge_cases() {
        assert_eq!(SqliteVectorStore::cosine_similarity(&[], &[]), 0.0);
        assert_eq!(SqliteVectorStore::cosine_similarity(&[1.0], &[1.0, 2.0]), 0.0);
        assert_eq!(SqliteVectorStore::cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
        let sim = SqliteVectorStore::cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]);
        assert!((sim - 1.0).abs() < 1e-6);
    }
}
