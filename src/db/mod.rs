// Optional conversation log persistence

pub mod operations;

pub use operations::*;

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::{error, info};

use crate::config::DatabaseConfig;
use crate::models::ConversationTurn;
use crate::types::AppResult;

/// Write-only sink for completed exchanges. Callers log and drop failures.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    async fn record(&self, turn: &ConversationTurn) -> AppResult<()>;
}

pub async fn create_pool(config: &DatabaseConfig, url: &str) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(url)
        .await?;

    // Test connection
    sqlx::query("SELECT 1")
        .fetch_one(&pool)
        .await?;

    Ok(pool)
}

/// Connect and migrate when `DATABASE_URL` is configured. Any failure here
/// disables conversation logging rather than stopping the service.
pub async fn connect_store(config: &DatabaseConfig) -> Option<Arc<dyn ConversationStore>> {
    let url = config.url.as_deref()?;

    let pool = match create_pool(config, url).await {
        Ok(pool) => pool,
        Err(e) => {
            error!(error = %e, "Database unavailable, conversation logging disabled");
            return None;
        }
    };

    info!("Running database migrations...");
    if let Err(e) = sqlx::migrate!("./migrations").run(&pool).await {
        error!(error = %e, "Failed to run migrations, conversation logging disabled");
        return None;
    }
    info!("Database migrations completed");

    Some(Arc::new(PostgresConversationStore::new(pool)))
}
