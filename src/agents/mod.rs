//! Agent System
//!
//! The question-answering pipeline behind `POST /api/chat`:
//!
//! ```text
//! conversationHistory
//!      │  last user message
//!      ▼
//! ┌─────────────┐
//! │  Retrieval  │  → top 5 chunks from the vector index
//! │   Agent     │
//! └─────────────┘
//!      │
//!      ▼
//! ┌─────────────┐
//! │   Prompt    │  → fixed instruction template
//! └─────────────┘
//!      │
//!      ▼
//! ┌─────────────┐
//! │   Reply     │  → model answer
//! │   Agent     │
//! └─────────────┘
//!      │
//!      ▼
//!  conversation log (best effort)
//! ```

pub mod prompt;
pub mod reply;
pub mod retrieval;

pub use reply::{ReplyAgent, ReplyMode};
pub use retrieval::{RetrievalAgent, TOP_K};

use std::sync::Arc;

use tracing::{info, warn};
use validator::Validate;

use crate::db::ConversationStore;
use crate::models::{ChatRequest, ConversationTurn};
use crate::types::{AppError, AppResult};

pub struct ChatPipeline {
    reply: ReplyAgent,
    store: Option<Arc<dyn ConversationStore>>,
}

impl ChatPipeline {
    pub fn new(reply: ReplyAgent, store: Option<Arc<dyn ConversationStore>>) -> Self {
        Self { reply, store }
    }

    /// Answer the latest user message of `request`.
    pub async fn answer(&self, request: &ChatRequest) -> AppResult<String> {
        request
            .validate()
            .map_err(|e| AppError::InvalidRequest(e.to_string()))?;

        let question = request.last_user_message().ok_or_else(|| {
            AppError::InvalidRequest("conversationHistory has no user message with text".to_string())
        })?;

        let answer = self
            .reply
            .generate_response(&question, &request.history())
            .await?;

        let session_id = request
            .session_id
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        self.log_turn(ConversationTurn {
            session_id,
            query: question,
            response: answer.clone(),
            timestamp: chrono::Utc::now(),
        })
        .await;

        Ok(answer)
    }

    async fn log_turn(&self, turn: ConversationTurn) {
        let Some(store) = &self.store else {
            return;
        };

        match store.record(&turn).await {
            Ok(()) => info!(session_id = %turn.session_id, "Conversation turn logged"),
            Err(e) => warn!(session_id = %turn.session_id, error = %e, "Failed to log conversation turn"),
        }
    }
}
