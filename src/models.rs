use std::sync::Arc;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::agents::ChatPipeline;
use crate::config::Config;
use crate::embeddings::IndexHandle;
use crate::types::LLMMessage;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub index: IndexHandle,
    pub pipeline: Arc<ChatPipeline>,
}

/// One completed exchange, written to the conversation log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub session_id: String,
    pub query: String,
    pub response: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

// API Request/Response types
// The chat envelope mirrors the Gemini `contents`/`candidates` shapes the frontend already speaks.

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatPart {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String, // "user" or "model"
    #[serde(default)]
    pub parts: Vec<ChatPart>,
}

impl ChatMessage {
    pub fn text(&self) -> String {
        self.parts.iter().map(|p| p.text.as_str()).collect()
    }
}

impl From<&ChatMessage> for LLMMessage {
    fn from(message: &ChatMessage) -> Self {
        LLMMessage::new(message.role.clone(), message.text())
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[validate(length(min = 1, message = "conversationHistory must contain at least one message"))]
    pub conversation_history: Vec<ChatMessage>,
    #[serde(default)]
    #[validate(length(min = 1, max = 128, message = "sessionId must be 1-128 characters"))]
    pub session_id: Option<String>,
}

impl ChatRequest {
    /// Text of the most recent user-role message, if it has any.
    pub fn last_user_message(&self) -> Option<String> {
        self.conversation_history
            .iter()
            .rev()
            .find(|m| m.role == "user")
            .map(ChatMessage::text)
            .filter(|text| !text.trim().is_empty())
    }

    pub fn history(&self) -> Vec<LLMMessage> {
        self.conversation_history.iter().map(LLMMessage::from).collect()
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct CandidateContent {
    pub parts: Vec<ChatPart>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct Candidate {
    pub content: CandidateContent,
}

/// `{candidates: [{content: {parts: [{text}]}}]}`
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ChatResponse {
    pub candidates: Vec<Candidate>,
}

impl ChatResponse {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            candidates: vec![Candidate {
                content: CandidateContent {
                    parts: vec![ChatPart { text: text.into() }],
                },
            }],
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ChatStatusResponse {
    pub status: String,
    pub message: String,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    /// "ready", "building" or "disabled"
    pub index: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chunks: Option<usize>,
}
