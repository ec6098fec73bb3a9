mod handlers;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        // Ingestion
        .route("/ingest/tracker", post(handlers::ingest_tracker))
        .route("/ingest/upload", post(handlers::ingest_upload))
        // Generation
        .route("/generate/stories", post(handlers::generate_stories))
        .route("/generate/tests", post(handlers::generate_tests))
        // Export
        .route("/export", get(handlers::export))
        // Introspection
        .route("/config", get(handlers::config_check))
        .route("/diagnostics", get(handlers::diagnostics))
        // Health
        .route("/health", get(handlers::health));

    Router::new()
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
