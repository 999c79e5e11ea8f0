use axum::{
    extract::{rejection::JsonRejection, State},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tracing::{debug, error, info, warn};

use crate::models::{AppState, ChatRequest, ChatResponse, ChatStatusResponse};
use crate::types::AppError;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/chat", get(get_chat).post(post_chat))
        .with_state(state)
}

async fn get_chat() -> Json<ChatStatusResponse> {
    Json(ChatStatusResponse {
        status: "active".to_string(),
        message: "Backend çalışıyor. POST istekleri bekleniyor.".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

pub async fn post_chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Response {
    let expose_details = state.config.server.expose_error_details;

    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            warn!(error = %rejection.body_text(), "Rejected malformed chat request");
            return AppError::InvalidRequest(rejection.body_text())
                .into_response_with(expose_details);
        }
    };

    info!(
        messages = request.conversation_history.len(),
        session_id = ?request.session_id,
        "Received chat request"
    );
    debug!(history = ?request.conversation_history, "Chat request body");

    match state.pipeline.answer(&request).await {
        Ok(text) => {
            debug!(response = %text, "Generated response");
            Json(ChatResponse::from_text(text)).into_response()
        }
        Err(e) => {
            match &e {
                AppError::NotReady | AppError::InvalidRequest(_) => {
                    warn!(error = %e, "Chat request not served")
                }
                _ => error!(error = %e, "Chat request failed"),
            }
            e.into_response_with(expose_details)
        }
    }
}
