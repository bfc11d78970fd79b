use async_trait::async_trait;

use super::types::GenerationParams;
use crate::errors::ApiError;

/// Text-to-vector service. One vector per input, same order as the inputs.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, ApiError>;

    /// Model identifier recorded in the index metadata.
    fn model_id(&self) -> &str;
}

/// Prompt-to-text service.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<String, ApiError>;
}
