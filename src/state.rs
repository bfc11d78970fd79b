use std::sync::Arc;

use crate::config::{AppConfig, AppPaths};
use crate::errors::ApiError;
use crate::llm::{Embedder, GeminiClient, GenerationParams, Generator};
use crate::pipeline::{RetrievalOptions, SummaryPipeline};
use crate::store::{SqliteVectorStore, VectorStore};

/// All long-lived collaborators, constructed once at process start and
/// shared by the CLI and HTTP paths. Trait objects so tests can substitute
/// fakes for the embedding, generation, and index collaborators.
pub struct AppState {
    pub paths: Arc<AppPaths>,
    pub config: AppConfig,
    pub store: Arc<dyn VectorStore>,
    pub embedder: Arc<dyn Embedder>,
    pub pipeline: SummaryPipeline,
}

impl AppState {
    pub async fn initialize() -> Result<Arc<Self>, ApiError> {
        let paths = Arc::new(AppPaths::new());
        let config = AppConfig::load(&paths)?;

        let api_key = config.require_api_key()?;
        let gemini = Arc::new(GeminiClient::new(&config.gemini, api_key)?);

        let store: Arc<dyn VectorStore> =
            Arc::new(SqliteVectorStore::open(paths.index_db_path.clone()).await?);

        Ok(Self::with_collaborators(
            paths,
            config,
            store,
            gemini.clone(),
            gemini,
        ))
    }

    /// Assembles the state from explicit collaborators. The test path.
    pub fn with_collaborators(
        paths: Arc<AppPaths>,
        config: AppConfig,
        store: Arc<dyn VectorStore>,
        embedder: Arc<dyn Embedder>,
        generator: Arc<dyn Generator>,
    ) -> Arc<Self> {
        let params = GenerationParams {
            temperature: config.gemini.temperature,
            top_p: config.gemini.top_p,
        };
        let options = RetrievalOptions {
            top_k: config.retrieval.top_k,
            score_threshold: config.retrieval.score_threshold,
        };
        let pipeline = SummaryPipeline::new(
            embedder.clone(),
            store.clone(),
            generator,
            params,
            options,
        );

        Arc::new(AppState {
            paths,
            config,
            store,
            embedder,
            pipeline,
        })
    }
}
