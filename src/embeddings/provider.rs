use async_trait::async_trait;
use crate::types::AppResult;

/// Maps text to fixed-length vectors. Production binds this to the remote
/// embeddings API; tests substitute deterministic fakes.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed document chunks for storage. Returns one vector per input, in order.
    async fn embed_documents(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>>;

    /// Embed a user query for lookup.
    async fn embed_query(&self, text: &str) -> AppResult<Vec<f32>>;
}
