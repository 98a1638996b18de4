// src/store/postgres.rs
use super::{ChatStore, StoreError};
use crate::models::{chat::ChatMessage, user::User};
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct PgChatStore {
    db_pool: PgPool,
}

impl PgChatStore {
    pub fn new(db_pool: PgPool) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl ChatStore for PgChatStore {
    async fn find_user(&self, user_id: Uuid) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT user_id, name, email, created_at FROM users WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.db_pool)
        .await?;

        Ok(user)
    }

    async fn register_user(&self, user_id: Uuid, name: &str, email: &str) -> Result<User, StoreError> {
        // No conflict target: either unique constraint (id or email) suppresses the insert.
        let inserted = sqlx::query(
            "INSERT INTO users (user_id, name, email, created_at)
             VALUES ($1, $2, $3, NOW())
             ON CONFLICT DO NOTHING",
        )
        .bind(user_id)
        .bind(name)
        .bind(email)
        .execute(&self.db_pool)
        .await?
        .rows_affected();

        if inserted == 0 {
            tracing::debug!("User {} already stored, returning existing row", user_id);
        } else {
            tracing::info!("💾 Stored new user {}", user_id);
        }

        let user = sqlx::query_as::<_, User>(
            "SELECT user_id, name, email, created_at FROM users
             WHERE user_id = $1 OR email = $2
             ORDER BY created_at ASC
             LIMIT 1",
        )
        .bind(user_id)
        .bind(email)
        .fetch_one(&self.db_pool)
        .await?;

        Ok(user)
    }

    async fn recent_messages(&self, user_id: Uuid, limit: usize) -> Result<Vec<ChatMessage>, StoreError> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let mut rows = sqlx::query_as::<_, ChatMessage>(
            "SELECT id, user_id, message, reply, created_at FROM chats
             WHERE user_id = $1
             ORDER BY created_at DESC, id DESC
             LIMIT $2",
        )
        .bind(user_id)
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&self.db_pool)
        .await?;

        rows.reverse();
        Ok(rows)
    }

    async fn save_message(&self, user_id: Uuid, message: &str, reply: &str) -> Result<ChatMessage, StoreError> {
        let row = sqlx::query_as::<_, ChatMessage>(
            "INSERT INTO chats (user_id, message, reply, created_at)
             VALUES ($1, $2, $3, NOW())
             RETURNING id, user_id, message, reply, created_at",
        )
        .bind(user_id)
        .bind(message)
        .bind(reply)
        .fetch_one(&self.db_pool)
        .await?;

        tracing::debug!("💾 Saved chat {} for user {}", row.id, user_id);
        Ok(row)
    }

    async fn list_messages(&self, user_id: Uuid) -> Result<Vec<ChatMessage>, StoreError> {
        let rows = sqlx::query_as::<_, ChatMessage>(
            "SELECT id, user_id, message, reply, created_at FROM chats
             WHERE user_id = $1
             ORDER BY created_at ASC, id ASC",
        )
        .bind(user_id)
        .fetch_all(&self.db_pool)
        .await?;

        Ok(rows)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").fetch_one(&self.db_pool).await?;
        Ok(())
    }
}
