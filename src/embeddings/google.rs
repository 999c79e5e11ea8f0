// Google Generative Language embeddings client
// API Reference: https://ai.google.dev/api/embeddings

use crate::embeddings::provider::Embedder;
use crate::llm::google::parse_error_message;
use crate::types::{AppError, AppResult};
use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;

pub const TEXT_EMBEDDING_004: &str = "text-embedding-004";

/// Upper bound the API accepts for a single batchEmbedContents call.
pub const MAX_BATCH_SIZE: usize = 100;

pub struct GoogleEmbedder {
    client: Client,
    api_key: String,
    api_base: String,
    model: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EmbedContentRequest<'a> {
    model: String,
    content: EmbedContent<'a>,
    task_type: &'static str,
}

#[derive(Serialize)]
struct EmbedContent<'a> {
    parts: Vec<EmbedPart<'a>>,
}

#[derive(Serialize)]
struct EmbedPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct BatchEmbedRequest<'a> {
    requests: Vec<EmbedContentRequest<'a>>,
}

#[derive(Deserialize)]
struct ContentEmbedding {
    values: Vec<f32>,
}

#[derive(Deserialize)]
struct EmbedContentResponse {
    embedding: ContentEmbedding,
}

#[derive(Deserialize)]
struct BatchEmbedResponse {
    #[serde(default)]
    embeddings: Vec<ContentEmbedding>,
}

impl GoogleEmbedder {
    pub fn with_base_url(api_key: &str, model: &str, api_base: &str) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.to_string(),
            api_base: api_base.trim_end_matches('/').to_string(),
            model: model.to_string(),
        }
    }

    fn model_path(&self) -> String {
        format!("models/{}", self.model)
    }

    fn request<'a>(&self, text: &'a str, task_type: &'static str) -> EmbedContentRequest<'a> {
        EmbedContentRequest {
            model: self.model_path(),
            content: EmbedContent {
                parts: vec![EmbedPart { text }],
            },
            task_type,
        }
    }

    async fn post<B: Serialize, R: DeserializeOwned>(
        &self,
        method: &str,
        body: &B,
    ) -> AppResult<R> {
        let url = format!("{}/{}:{}", self.api_base, self.model_path(), method);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| AppError::LLMApi(format!("Embedding request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::LLMApi(format!(
                "Embedding API error ({}): {}",
                status,
                parse_error_message(&error_text)
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::LLMApi(format!("Failed to parse embedding response: {}", e)))
    }
}

#[async_trait]
impl Embedder for GoogleEmbedder {
    async fn embed_documents(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        if texts.len() > MAX_BATCH_SIZE {
            return Err(AppError::Internal(format!(
                "batch of {} exceeds the provider limit of {}",
                texts.len(),
                MAX_BATCH_SIZE
            )));
        }

        let body = BatchEmbedRequest {
            requests: texts
                .iter()
                .map(|text| self.request(text, "RETRIEVAL_DOCUMENT"))
                .collect(),
        };

        let response: BatchEmbedResponse = self.post("batchEmbedContents", &body).await?;
        if response.embeddings.len() != texts.len() {
            return Err(AppError::LLMApi(format!(
                "Embedding API returned {} vectors for {} inputs",
                response.embeddings.len(),
                texts.len()
            )));
        }

        debug!(count = texts.len(), "Embedded document batch");
        Ok(response.embeddings.into_iter().map(|e| e.values).collect())
    }

    async fn embed_query(&self, text: &str) -> AppResult<Vec<f32>> {
        let body = self.request(text, "RETRIEVAL_QUERY");
        let response: EmbedContentResponse = self.post("embedContent", &body).await?;
        Ok(response.embedding.values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    #[tokio::test]
    async fn test_embed_documents_sends_batch_and_preserves_order() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/models/text-embedding-004:batchEmbedContents")
            .match_header("x-goog-api-key", "test-key")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "requests": [
                    { "model": "models/text-embedding-004", "taskType": "RETRIEVAL_DOCUMENT",
                      "content": { "parts": [{ "text": "birinci" }] } },
                    { "model": "models/text-embedding-004", "taskType": "RETRIEVAL_DOCUMENT",
                      "content": { "parts": [{ "text": "ikinci" }] } }
                ]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"embeddings":[{"values":[1.0,0.0]},{"values":[0.0,1.0]}]}"#)
            .create_async()
            .await;

        let embedder = GoogleEmbedder::with_base_url("test-key", TEXT_EMBEDDING_004, &server.url());
        let vectors = embedder
            .embed_documents(&["birinci".to_string(), "ikinci".to_string()])
            .await
            .unwrap();

        assert_eq!(vectors, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_embed_query_uses_query_task_type() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/models/text-embedding-004:embedContent")
            .match_body(Matcher::PartialJson(serde_json::json!({ "taskType": "RETRIEVAL_QUERY" })))
            .with_status(200)
            .with_body(r#"{"embedding":{"values":[0.5,0.5,0.0]}}"#)
            .create_async()
            .await;

        let embedder = GoogleEmbedder::with_base_url("k", TEXT_EMBEDDING_004, &server.url());
        let vector = embedder.embed_query("Kira süresi ne kadar?").await.unwrap();

        assert_eq!(vector, vec![0.5, 0.5, 0.0]);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_count_mismatch_is_upstream_failure() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/models/text-embedding-004:batchEmbedContents")
            .with_status(200)
            .with_body(r#"{"embeddings":[{"values":[1.0]}]}"#)
            .create_async()
            .await;

        let embedder = GoogleEmbedder::with_base_url("k", TEXT_EMBEDDING_004, &server.url());
        let err = embedder
            .embed_documents(&["a".to_string(), "b".to_string()])
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::LLMApi(_)));
    }

    #[tokio::test]
    async fn test_error_status_reports_provider_message() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/models/text-embedding-004:embedContent")
            .with_status(403)
            .with_body(r#"{"error":{"code":403,"message":"API key not valid","status":"PERMISSION_DENIED"}}"#)
            .create_async()
            .await;

        let embedder = GoogleEmbedder::with_base_url("bad", TEXT_EMBEDDING_004, &server.url());
        let err = embedder.embed_query("soru").await.unwrap_err();

        match err {
            AppError::LLMApi(message) => assert!(message.contains("API key not valid")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_oversized_batch_rejected_without_request() {
        let embedder = GoogleEmbedder::with_base_url("k", TEXT_EMBEDDING_004, "http://127.0.0.1:9");
        let texts = vec!["x".to_string(); MAX_BATCH_SIZE + 1];
        assert!(matches!(
            embedder.embed_documents(&texts).await,
            Err(AppError::Internal(_))
        ));
    }
}
