//! Router construction and shared application state.
use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::api::handlers;
use crate::gemini::client::GeminiClient;
use crate::prompt::composer::PromptComposer;
use crate::storage::outputs::OutputStore;

pub struct AppState {
    /// Present only when a Gemini credential was configured.
    pub gemini: Option<GeminiClient>,
    pub composer: PromptComposer,
    pub outputs: OutputStore,
    pub public_dir: PathBuf,
}

/// Build the application router. The default body limit is disabled so the
/// upload validator's own size check produces the classified error.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/convert", post(handlers::convert))
        .route("/health", get(handlers::health))
        .route("/outputs/:filename", get(handlers::serve_output))
        .layer(DefaultBodyLimit::disable())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
