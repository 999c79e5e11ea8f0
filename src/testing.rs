// Deterministic fakes for the remote providers and the conversation log

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::db::ConversationStore;
use crate::embeddings::Embedder;
use crate::llm::Generator;
use crate::models::ConversationTurn;
use crate::types::{AppError, AppResult, LLMRequest, LLMResponse, TokenUsage};

pub const HASH_DIMENSION: usize = 64;

/// Bag-of-words embedding: each lowercased token bumps one hashed bucket.
/// Identical texts always map to identical vectors.
#[derive(Default)]
pub struct HashEmbedder {
    document_calls: AtomicUsize,
    query_calls: AtomicUsize,
}

impl HashEmbedder {
    pub fn embed(text: &str) -> Vec<f32> {
        let mut vector = vec![0.0; HASH_DIMENSION];
        for token in text.split_whitespace() {
            let token = token.to_lowercase();
            // FNV-1a
            let hash = token
                .bytes()
                .fold(0xcbf29ce484222325u64, |h, b| (h ^ b as u64).wrapping_mul(0x100000001b3));
            vector[(hash % HASH_DIMENSION as u64) as usize] += 1.0;
        }
        vector
    }

    pub fn document_calls(&self) -> usize {
        self.document_calls.load(Ordering::SeqCst)
    }

    pub fn query_calls(&self) -> usize {
        self.query_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Embedder for HashEmbedder {
    async fn embed_documents(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        self.document_calls.fetch_add(1, Ordering::SeqCst);
        Ok(texts.iter().map(|t| Self::embed(t)).collect())
    }

    async fn embed_query(&self, text: &str) -> AppResult<Vec<f32>> {
        self.query_calls.fetch_add(1, Ordering::SeqCst);
        Ok(Self::embed(text))
    }
}

/// Succeeds for the first `ok_batches` document batches, then fails every call.
pub struct FailingEmbedder {
    ok_batches: usize,
    calls: AtomicUsize,
}

impl FailingEmbedder {
    pub fn after_batches(ok_batches: usize) -> Self {
        Self {
            ok_batches,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl Embedder for FailingEmbedder {
    async fn embed_documents(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        if self.calls.fetch_add(1, Ordering::SeqCst) < self.ok_batches {
            return Ok(texts.iter().map(|t| HashEmbedder::embed(t)).collect());
        }
        Err(AppError::LLMApi("embedding quota exceeded".to_string()))
    }

    async fn embed_query(&self, _text: &str) -> AppResult<Vec<f32>> {
        Err(AppError::LLMApi("embedding quota exceeded".to_string()))
    }
}

/// Answers every request with a fixed string and remembers what it was sent.
pub struct EchoGenerator {
    reply: String,
    requests: Mutex<Vec<LLMRequest>>,
}

impl EchoGenerator {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn last_request(&self) -> Option<LLMRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl Generator for EchoGenerator {
    async fn create_chat_completion(&self, request: &LLMRequest) -> AppResult<LLMResponse> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(LLMResponse {
            content: self.reply.clone(),
            finish_reason: "STOP".to_string(),
            usage: TokenUsage::default(),
        })
    }
}

pub struct FailingGenerator;

#[async_trait]
impl Generator for FailingGenerator {
    async fn create_chat_completion(&self, _request: &LLMRequest) -> AppResult<LLMResponse> {
        Err(AppError::LLMApi("Gemini API error (500): internal".to_string()))
    }
}

#[derive(Default)]
pub struct RecordingStore {
    turns: Mutex<Vec<ConversationTurn>>,
}

impl RecordingStore {
    pub fn turns(&self) -> Vec<ConversationTurn> {
        self.turns.lock().unwrap().clone()
    }
}

#[async_trait]
impl ConversationStore for RecordingStore {
    async fn record(&self, turn: &ConversationTurn) -> AppResult<()> {
        self.turns.lock().unwrap().push(turn.clone());
        Ok(())
    }
}

pub struct FailingStore;

#[async_trait]
impl ConversationStore for FailingStore {
    async fn record(&self, _turn: &ConversationTurn) -> AppResult<()> {
        Err(AppError::Database(sqlx::Error::PoolTimedOut))
    }
}
