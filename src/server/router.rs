use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::server::handlers;
use crate::state::AppState;

/// Builds the application router: the summary endpoint, a health probe,
/// and request tracing.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/exception-llm-summary",
            get(handlers::exception_summary),
        )
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
