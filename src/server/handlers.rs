use std::sync::Arc;

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::errors::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    pub name: Option<String>,
}

/// `GET /exception-llm-summary?name=<exception name>`
pub async fn exception_summary(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SummaryQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let name = query
        .name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .ok_or_else(|| ApiError::BadRequest("missing query parameter: name".to_string()))?;

    let summary = state.pipeline.summarize(&name).await?;
    Ok(Json(json!({ "inference_output": summary })))
}

pub async fn health(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let indexed = state.store.count().await?;
    Ok(Json(json!({
        "status": "ok",
        "indexed_documents": indexed,
    })))
}
