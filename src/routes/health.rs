use axum::{extract::State, routing::get, Json, Router};
use crate::models::{AppState, HealthResponse};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .with_state(state)
}

/// Reports whether the document index has been published.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let (index, chunks) = if !state.config.retrieval.enabled {
        ("disabled", None)
    } else {
        match state.index.get() {
            Some(index) => ("ready", Some(index.len())),
            None => ("building", None),
        }
    };

    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        index: index.to_string(),
        chunks,
    })
}
