use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use thiserror::Error;

/// Failure taxonomy for the service. Every external failure class gets its
/// own variant so callers see a structured response instead of a crash.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("source data error: {0}")]
    Source(String),
    #[error("index unavailable: {0}")]
    IndexUnavailable(String),
    #[error("index is empty")]
    IndexEmpty,
    #[error("no sufficiently similar record: {0}")]
    NoMatch(String),
    #[error("embedding service error: {0}")]
    Embedding(String),
    #[error("generation service error: {0}")]
    Generation(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn internal<E: std::fmt::Display>(err: E) -> Self {
        ApiError::Internal(err.to_string())
    }

    /// Stable machine-readable tag for the JSON error body.
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "bad_request",
            ApiError::Source(_) => "source_data",
            ApiError::IndexUnavailable(_) => "index_unavailable",
            ApiError::IndexEmpty => "index_empty",
            ApiError::NoMatch(_) => "no_match",
            ApiError::Embedding(_) => "embedding_service",
            ApiError::Generation(_) => "generation_service",
            ApiError::Internal(_) => "internal",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NoMatch(_) => StatusCode::NOT_FOUND,
            ApiError::IndexUnavailable(_) | ApiError::IndexEmpty => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            ApiError::Embedding(_) | ApiError::Generation(_) => StatusCode::BAD_GATEWAY,
            ApiError::Source(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({ "error": self.to_string(), "kind": self.kind() }));
        (status, body).into_response()
    }
}
