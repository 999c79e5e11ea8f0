use std::sync::Arc;

use async_trait::async_trait;
use crate::config::LLMConfig;
use crate::types::{AppResult, LLMRequest, LLMResponse};

/// Text generation capability. Production binds it to the hosted model API;
/// tests substitute deterministic fakes.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn create_chat_completion(&self, request: &LLMRequest) -> AppResult<LLMResponse>;
}

/// Build the configured generation client.
pub fn create_generator(config: &LLMConfig) -> Arc<dyn Generator> {
    Arc::new(crate::llm::google::GoogleAdapter::with_base_url(
        &config.google_api_key,
        &config.api_base,
    ))
}
