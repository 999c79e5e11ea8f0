use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::ConversationStore;
use crate::models::ConversationTurn;
use crate::types::AppResult;

pub struct PostgresConversationStore {
    pool: PgPool,
}

impl PostgresConversationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ConversationStore for PostgresConversationStore {
    async fn record(&self, turn: &ConversationTurn) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO conversation_logs (id, session_id, user_prompt, model_response, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&turn.session_id)
        .bind(&turn.query)
        .bind(&turn.response)
        .bind(turn.timestamp)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
