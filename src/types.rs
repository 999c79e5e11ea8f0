// Type definitions and the service error taxonomy

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

/// Message sent to the API caller for any 500, matching the public frontend's expectations.
pub const GENERIC_SERVER_ERROR: &str = "İstek işlenirken bir sunucu hatası oluştu";

pub const NOT_READY_MESSAGE: &str = "Belge dizini henüz hazır değil, lütfen biraz sonra tekrar deneyin";

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct LLMRequest {
    pub model: String,
    pub messages: Vec<LLMMessage>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub system_instruction: Option<String>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LLMMessage {
    pub role: String, // "user" or "model"
    pub content: String,
}

impl LLMMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new("user", content)
    }

    pub fn model(content: impl Into<String>) -> Self {
        Self::new("model", content)
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct LLMResponse {
    pub content: String,
    pub finish_reason: String,
    pub usage: TokenUsage,
}

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// The vector index has not been published yet.
    #[error("Service not ready: document index is still being built")]
    NotReady,

    /// Embedding or generation provider failure.
    #[error("LLM API error: {0}")]
    LLMApi(String),

    /// Conversation log write failure. Never surfaced to API callers.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type AppResult<T> = std::result::Result<T, AppError>;

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotReady => StatusCode::SERVICE_UNAVAILABLE,
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::LLMApi(_) | AppError::Database(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Render the error as a JSON response. Raw internal error text is only
    /// attached to 500s when `expose_details` is set.
    pub fn into_response_with(self, expose_details: bool) -> Response {
        let status = self.status_code();
        let body = match &self {
            AppError::NotReady => serde_json::json!({ "error": NOT_READY_MESSAGE }),
            AppError::InvalidRequest(details) => serde_json::json!({
                "error": "Geçersiz istek",
                "details": details,
            }),
            _ if expose_details => serde_json::json!({
                "error": GENERIC_SERVER_ERROR,
                "details": self.to_string(),
            }),
            _ => serde_json::json!({ "error": GENERIC_SERVER_ERROR }),
        };

        (status, Json(body)).into_response()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.into_response_with(false)
    }
}
