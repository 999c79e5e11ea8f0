use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;

const DEFAULT_ALLOWED_ORIGINS: &str =
    "https://www.thomasandreasdiconstantinople.av.tr,https://thomasandreasdiconstantinople.av.tr";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub llm: LLMConfig,
    pub retrieval: RetrievalConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    pub cors_allowed_origins: Vec<String>,
    /// Include raw error text in 500 responses. Off in production.
    pub expose_error_details: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Conversation logging is disabled when unset.
    pub url: Option<String>,
    pub max_connections: u32,
}

#[derive(Clone, Deserialize)]
pub struct LLMConfig {
    pub google_api_key: String,
    pub api_base: String,
    pub generation_model: String,
    pub embedding_model: String,
    pub max_output_tokens: u32,
}

// Hand-written so the API key never ends up in logs.
impl std::fmt::Debug for LLMConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LLMConfig")
            .field("google_api_key", &"<redacted>")
            .field("api_base", &self.api_base)
            .field("generation_model", &self.generation_model)
            .field("embedding_model", &self.embedding_model)
            .field("max_output_tokens", &self.max_output_tokens)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RetrievalConfig {
    /// When false the service runs as a plain conversational proxy and no index is built.
    pub enabled: bool,
    pub documents_dir: PathBuf,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub embed_batch_size: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub log_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                port: 10000,
                host: "0.0.0.0".to_string(),
                cors_allowed_origins: parse_list(DEFAULT_ALLOWED_ORIGINS),
                expose_error_details: false,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 5,
            },
            llm: LLMConfig {
                google_api_key: String::new(),
                api_base: crate::llm::google::GOOGLE_API_BASE.to_string(),
                generation_model: crate::llm::google::models::GEMINI_1_5_FLASH.to_string(),
                embedding_model: crate::embeddings::google::TEXT_EMBEDDING_004.to_string(),
                max_output_tokens: 1000,
            },
            retrieval: RetrievalConfig {
                enabled: true,
                documents_dir: PathBuf::from("documents"),
                chunk_size: 1000,
                chunk_overlap: 200,
                embed_batch_size: 100,
            },
            logging: LoggingConfig { log_dir: None },
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        let config = Self {
            server: ServerConfig {
                port: env_or("PORT", defaults.server.port)?,
                host: env::var("HOST").unwrap_or(defaults.server.host),
                cors_allowed_origins: env::var("ALLOWED_ORIGINS")
                    .map(|s| parse_list(&s))
                    .unwrap_or(defaults.server.cors_allowed_origins),
                expose_error_details: env_flag(
                    "EXPOSE_ERROR_DETAILS",
                    defaults.server.expose_error_details,
                )?,
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").ok().filter(|s| !s.trim().is_empty()),
                max_connections: env_or("DB_MAX_CONNECTIONS", defaults.database.max_connections)?,
            },
            llm: LLMConfig {
                google_api_key: env::var("GOOGLE_API_KEY")
                    .context("GOOGLE_API_KEY must be set")?,
                api_base: env::var("GOOGLE_API_BASE").unwrap_or(defaults.llm.api_base),
                generation_model: env::var("GENERATION_MODEL")
                    .unwrap_or(defaults.llm.generation_model),
                embedding_model: env::var("EMBEDDING_MODEL")
                    .unwrap_or(defaults.llm.embedding_model),
                max_output_tokens: env_or("MAX_OUTPUT_TOKENS", defaults.llm.max_output_tokens)?,
            },
            retrieval: RetrievalConfig {
                enabled: env_flag("RETRIEVAL_ENABLED", defaults.retrieval.enabled)?,
                documents_dir: env::var("DOCUMENTS_DIR")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.retrieval.documents_dir),
                chunk_size: env_or("CHUNK_SIZE", defaults.retrieval.chunk_size)?,
                chunk_overlap: env_or("CHUNK_OVERLAP", defaults.retrieval.chunk_overlap)?,
                embed_batch_size: env_or("EMBED_BATCH_SIZE", defaults.retrieval.embed_batch_size)?,
            },
            logging: LoggingConfig {
                log_dir: env::var("LOG_DIR").ok().map(PathBuf::from),
            },
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let retrieval = &self.retrieval;
        anyhow::ensure!(retrieval.chunk_size > 0, "CHUNK_SIZE must be greater than zero");
        anyhow::ensure!(
            retrieval.chunk_overlap < retrieval.chunk_size,
            "CHUNK_OVERLAP ({}) must be smaller than CHUNK_SIZE ({})",
            retrieval.chunk_overlap,
            retrieval.chunk_size
        );
        anyhow::ensure!(
            retrieval.embed_batch_size > 0,
            "EMBED_BATCH_SIZE must be greater than zero"
        );
        anyhow::ensure!(
            !self.llm.google_api_key.trim().is_empty(),
            "GOOGLE_API_KEY must not be empty"
        );
        Ok(())
    }
}

fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("invalid value for {}: {:?}", key, raw)),
        Err(_) => Ok(default),
    }
}

/// Boolean variables accept true/false, 1/0, yes/no and on/off in any case.
fn env_flag(key: &str, default: bool) -> Result<bool> {
    match env::var(key) {
        Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" => Ok(false),
            _ => anyhow::bail!("invalid value for {}: {:?}", key, raw),
        },
        Err(_) => Ok(default),
    }
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
