//! Retrieval Agent
//!
//! Embeds the query and returns the text of the top chunks from the published
//! index. There is no relevance threshold: the best `TOP_K` chunks are always
//! returned, however weak the match.

use std::sync::Arc;

use tracing::{debug, info};

use crate::embeddings::{Embedder, IndexHandle};
use crate::types::AppResult;

pub const TOP_K: usize = 5;

pub struct RetrievalAgent {
    embedder: Arc<dyn Embedder>,
    index: IndexHandle,
}

impl RetrievalAgent {
    pub fn new(embedder: Arc<dyn Embedder>, index: IndexHandle) -> Self {
        Self { embedder, index }
    }

    /// Chunk texts most similar to `query`, best first.
    /// Fails with `NotReady` before the index is published, without calling the embedder.
    pub async fn retrieve(&self, query: &str) -> AppResult<Vec<String>> {
        let index = self.index.ready()?;

        let vector = self.embedder.embed_query(query).await?;
        let results = index.search(&vector, TOP_K)?;

        for (rank, result) in results.iter().enumerate() {
            debug!(
                rank,
                score = result.score,
                source = %result.chunk.source_id,
                offset = result.chunk.offset,
                "Retrieved chunk"
            );
        }
        info!(
            query_len = query.len(),
            retrieved = results.len(),
            top_score = results.first().map(|r| r.score).unwrap_or(0.0),
            "Retrieval complete"
        );

        Ok(results.into_iter().map(|r| r.chunk.text).collect())
    }
}
