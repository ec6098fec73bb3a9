use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::export::markdown_summary;
use crate::generate;
use crate::models::{StoriesRequest, TestsRequest, TrackerIngestInput, UploadInput};
use crate::state::AppState;

// ============================================================
// Health & Introspection
// ============================================================

pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// Configured collaborators, secrets masked.
pub async fn config_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.config.summary())
}

/// Which engine produced the last generation, and the error that forced a
/// fallback (if one did).
pub async fn diagnostics(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.diagnostics())
}

// ============================================================
// Ingestion
// ============================================================

/// Run a JQL query against the tracker and replace the session's features
/// with the epics it returns.
///
/// Unlike generation there is no fallback for a failed fetch, so tracker
/// errors surface directly: missing configuration is a 400, upstream
/// failure a 502.
pub async fn ingest_tracker(
    State(state): State<AppState>,
    Json(input): Json<TrackerIngestInput>,
) -> Result<Json<Value>, (StatusCode, String)> {
    let client = state.tracker().ok_or((
        StatusCode::BAD_REQUEST,
        "Missing JIRA_BASE_URL/JIRA_EMAIL/JIRA_API_TOKEN".to_string(),
    ))?;

    let features = client.search_epics(&input.jql).await.map_err(|e| {
        tracing::warn!(error = %e, "tracker ingestion failed");
        (StatusCode::BAD_GATEWAY, format!("Tracker request failed: {e}"))
    })?;

    let count = features.len();
    state.replace_features(features);

    Ok(Json(json!({
        "count": count,
        "features": state.features(),
    })))
}

/// Ingest features from an uploaded JSON document (no AI involved).
pub async fn ingest_upload(
    State(state): State<AppState>,
    Json(input): Json<UploadInput>,
) -> impl IntoResponse {
    let count = input.features.len();
    state.replace_features(input.features);

    Json(json!({
        "count": count,
        "features": state.features(),
    }))
}

// ============================================================
// Generation
// ============================================================

/// Generate stories from the supplied features, or from the session's
/// current features when none are supplied. Replaces the session's stories.
pub async fn generate_stories(
    State(state): State<AppState>,
    Json(request): Json<StoriesRequest>,
) -> impl IntoResponse {
    let features = request.features.unwrap_or_else(|| state.features());

    let generation = generate::generate_stories(state.llm(), &features).await;
    state.record_stories(&generation);

    Json(json!({
        "count": generation.items.len(),
        "engine": generation.engine,
        "stories": generation.items,
    }))
}

/// Generate test cases from the supplied stories, or from the session's
/// current stories when none are supplied. Replaces the session's tests.
pub async fn generate_tests(
    State(state): State<AppState>,
    Json(request): Json<TestsRequest>,
) -> impl IntoResponse {
    let stories = request.stories.unwrap_or_else(|| state.stories());

    let generation = generate::generate_tests(state.llm(), &stories).await;
    state.record_tests(&generation);

    Json(json!({
        "count": generation.items.len(),
        "engine": generation.engine,
        "tests": generation.items,
    }))
}

// ============================================================
// Export
// ============================================================

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    /// Output format: "json" (default) or "md".
    pub fmt: Option<String>,
}

/// Export the whole session as JSON, or its stories as a Markdown summary.
pub async fn export(
    State(state): State<AppState>,
    Query(query): Query<ExportQuery>,
) -> Result<Json<Value>, (StatusCode, String)> {
    match query.fmt.as_deref().unwrap_or("json") {
        "json" => {
            let snapshot = state.snapshot();
            serde_json::to_value(&snapshot)
                .map(Json)
                .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
        "md" => Ok(Json(json!({ "markdown": markdown_summary(&state.stories()) }))),
        other => Err((
            StatusCode::BAD_REQUEST,
            format!("Unsupported format: {other}"),
        )),
    }
}
