// Embeddings, chunking and the in-memory vector index

pub mod document_processor;
pub mod google;
pub mod provider;
pub mod text_chunker;
pub mod vector_search;

pub use document_processor::*;
pub use provider::*;
pub use text_chunker::*;
pub use vector_search::*;

use std::path::Path;
use std::time::Instant;
use tracing::{info, warn};

use crate::config::RetrievalConfig;
use crate::types::{AppError, AppResult};

/// Load, chunk and embed the corpus under `dir`.
pub async fn build_index(
    dir: &Path,
    chunker: TextChunker,
    embedder: &dyn Embedder,
    batch_size: usize,
) -> AppResult<VectorIndex> {
    let started = Instant::now();

    let documents = DocumentProcessor::load_directory(dir)
        .await
        .map_err(|e| AppError::Internal(format!("failed to load documents: {:#}", e)))?;
    if documents.is_empty() {
        warn!(dir = %dir.display(), "No documents found; answers will have no context");
    }

    let chunks: Vec<Chunk> = documents
        .iter()
        .flat_map(|doc| chunker.chunk(&doc.source_id, &doc.text))
        .collect();
    info!(
        documents = documents.len(),
        chunks = chunks.len(),
        chunk_size = chunker.chunk_size(),
        chunk_overlap = chunker.chunk_overlap(),
        "Chunked corpus"
    );

    let index = VectorIndex::build(chunks, embedder, batch_size).await?;
    info!(elapsed_ms = started.elapsed().as_millis() as u64, "Index ready");
    Ok(index)
}

/// Build the index described by `config` and publish it through `handle`.
/// Nothing is published if any step fails.
pub async fn build_and_publish(
    config: &RetrievalConfig,
    embedder: &dyn Embedder,
    handle: &IndexHandle,
) -> AppResult<()> {
    let chunker = TextChunker::new(config.chunk_size, config.chunk_overlap);
    let batch_size = config.embed_batch_size.min(google::MAX_BATCH_SIZE);
    if batch_size < config.embed_batch_size {
        warn!(
            configured = config.embed_batch_size,
            used = batch_size,
            "Embedding batch size capped at provider limit"
        );
    }

    let index = build_index(&config.documents_dir, chunker, embedder, batch_size).await?;
    handle.publish(index)
}
