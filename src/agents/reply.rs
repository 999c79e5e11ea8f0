//! Reply Agent
//!
//! Produces the model answer for a conversation. In retrieval mode the last
//! user question is answered from retrieved document context only; in
//! conversation mode the whole history is forwarded to the model as-is.

use std::sync::Arc;

use tracing::{error, info};

use crate::agents::prompt::build_prompt;
use crate::agents::retrieval::RetrievalAgent;
use crate::config::LLMConfig;
use crate::llm::Generator;
use crate::types::{AppResult, LLMMessage, LLMRequest};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReplyMode {
    /// Retrieve context, answer from it only
    Retrieval,
    /// Plain multi-turn chat with the model
    Conversation,
}

pub struct ReplyAgent {
    generator: Arc<dyn Generator>,
    retrieval: Option<RetrievalAgent>,
    model: String,
    max_output_tokens: u32,
}

impl ReplyAgent {
    pub fn with_retrieval(
        generator: Arc<dyn Generator>,
        retrieval: RetrievalAgent,
        config: &LLMConfig,
    ) -> Self {
        Self {
            generator,
            retrieval: Some(retrieval),
            model: config.generation_model.clone(),
            max_output_tokens: config.max_output_tokens,
        }
    }

    pub fn conversational(generator: Arc<dyn Generator>, config: &LLMConfig) -> Self {
        Self {
            generator,
            retrieval: None,
            model: config.generation_model.clone(),
            max_output_tokens: config.max_output_tokens,
        }
    }

    pub fn mode(&self) -> ReplyMode {
        if self.retrieval.is_some() {
            ReplyMode::Retrieval
        } else {
            ReplyMode::Conversation
        }
    }

    /// Generate the answer to `question`, the latest user message of `history`.
    pub async fn generate_response(
        &self,
        question: &str,
        history: &[LLMMessage],
    ) -> AppResult<String> {
        info!(
            question_len = question.len(),
            history_len = history.len(),
            mode = ?self.mode(),
            "Generating reply"
        );

        let messages = match &self.retrieval {
            Some(retrieval) => {
                let context = retrieval.retrieve(question).await?;
                vec![LLMMessage::user(build_prompt(&context, question))]
            }
            None => history.to_vec(),
        };

        let request = LLMRequest {
            model: self.model.clone(),
            messages,
            max_tokens: Some(self.max_output_tokens),
            temperature: None,
            system_instruction: None,
        };

        match self.generator.create_chat_completion(&request).await {
            Ok(response) => {
                info!(
                    response_len = response.content.len(),
                    finish_reason = %response.finish_reason,
                    total_tokens = response.usage.total_tokens,
                    "Generated reply successfully"
                );
                Ok(response.content)
            }
            Err(e) => {
                error!(error = %e, "LLM call failed");
                Err(e)
            }
        }
    }
}
