//! In-memory vector index
//!
//! Brute-force cosine similarity over every stored chunk. Adequate for a
//! corpus of a few thousand chunks; an approximate nearest-neighbour
//! structure would be needed beyond that.

use std::sync::{Arc, OnceLock};

use tracing::{debug, info};

use crate::embeddings::provider::Embedder;
use crate::embeddings::text_chunker::Chunk;
use crate::types::{AppError, AppResult};

#[derive(Debug, Clone)]
pub struct EmbeddedChunk {
    pub chunk: Chunk,
    pub vector: Vec<f32>,
}

#[derive(Debug, Clone)]
pub struct SearchResult {
    pub chunk: Chunk,
    pub score: f32,
}

/// Read-only collection of embedded chunks. Every vector has the same length.
#[derive(Debug, Default)]
pub struct VectorIndex {
    entries: Vec<EmbeddedChunk>,
    dimension: usize,
}

impl VectorIndex {
    /// Embed every chunk in batches of `batch_size` and collect the result.
    /// Any embedding failure aborts the whole build; no partial index is returned.
    pub async fn build(
        chunks: Vec<Chunk>,
        embedder: &dyn Embedder,
        batch_size: usize,
    ) -> AppResult<Self> {
        let batch_size = batch_size.max(1);
        let mut vectors: Vec<Vec<f32>> = Vec::with_capacity(chunks.len());

        for (batch_number, batch) in chunks.chunks(batch_size).enumerate() {
            let texts: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();
            let embedded = embedder.embed_documents(&texts).await?;
            if embedded.len() != texts.len() {
                return Err(AppError::LLMApi(format!(
                    "embedder returned {} vectors for a batch of {}",
                    embedded.len(),
                    texts.len()
                )));
            }
            debug!(batch = batch_number, size = texts.len(), "Embedded chunk batch");
            vectors.extend(embedded);
        }

        let entries = chunks
            .into_iter()
            .zip(vectors)
            .map(|(chunk, vector)| EmbeddedChunk { chunk, vector })
            .collect();

        let index = Self::from_entries(entries)?;
        info!(chunks = index.len(), dimension = index.dimension, "Vector index built");
        Ok(index)
    }

    /// Assemble an index from pre-computed embeddings.
    pub fn from_entries(entries: Vec<EmbeddedChunk>) -> AppResult<Self> {
        let dimension = entries.first().map(|e| e.vector.len()).unwrap_or(0);

        if let Some(bad) = entries.iter().find(|e| e.vector.len() != dimension) {
            return Err(AppError::LLMApi(format!(
                "inconsistent embedding dimension: expected {}, got {} for {}@{}",
                dimension,
                bad.vector.len(),
                bad.chunk.source_id,
                bad.chunk.offset
            )));
        }
        if dimension == 0 && !entries.is_empty() {
            return Err(AppError::LLMApi("embedder returned empty vectors".to_string()));
        }

        Ok(Self { entries, dimension })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Return the `k` most similar chunks, best first. Equal scores keep
    /// insertion order. Fewer than `k` entries are returned when the index is smaller.
    pub fn search(&self, query: &[f32], k: usize) -> AppResult<Vec<SearchResult>> {
        if self.entries.is_empty() || k == 0 {
            return Ok(Vec::new());
        }
        if query.len() != self.dimension {
            return Err(AppError::LLMApi(format!(
                "query vector has dimension {}, index has {}",
                query.len(),
                self.dimension
            )));
        }

        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(position, entry)| (position, cosine_similarity(query, &entry.vector)))
            .collect();

        // Stable sort: ties stay in insertion order.
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));

        Ok(scored
            .into_iter()
            .take(k)
            .map(|(position, score)| SearchResult {
                chunk: self.entries[position].chunk.clone(),
                score,
            })
            .collect())
    }
}

/// Cosine similarity; zero vectors score 0 rather than NaN.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    let score = dot / (norm_a.sqrt() * norm_b.sqrt());
    if score.is_nan() {
        return 0.0;
    }
    score
}

/// Write-once slot through which the finished index is published to request
/// handlers. Reads are lock-free; an empty slot means the build is still running.
#[derive(Debug, Clone, Default)]
pub struct IndexHandle {
    slot: Arc<OnceLock<VectorIndex>>,
}

impl IndexHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a completed index. Fails if one was already published.
    pub fn publish(&self, index: VectorIndex) -> AppResult<()> {
        self.slot
            .set(index)
            .map_err(|_| AppError::Internal("vector index already published".to_string()))
    }

    pub fn get(&self) -> Option<&VectorIndex> {
        self.slot.get()
    }

    pub fn ready(&self) -> AppResult<&VectorIndex> {
        self.get().ok_or(AppError::NotReady)
    }

    pub fn is_ready(&self) -> bool {
        self.slot.get().is_some()
    }
}
