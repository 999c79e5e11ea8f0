// Lex RAG - retrieval-augmented question answering over a legal document corpus

pub mod config;
pub mod models;
pub mod types;
pub mod agents;
pub mod llm;
pub mod embeddings;
pub mod db;
pub mod routes;
pub mod middleware;
pub mod utils;

#[cfg(test)]
pub(crate) mod testing;

// Re-exports for convenience
pub use config::Config;
pub use models::AppState;

pub fn create_router(state: AppState) -> axum::Router {
    routes::create_router(state)
}
