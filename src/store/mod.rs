// src/store/mod.rs
use crate::models::{chat::ChatMessage, user::User};
use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

pub mod postgres;

pub use postgres::PgChatStore;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

/// Typed access to the `users` and `chats` tables.
#[async_trait]
pub trait ChatStore: Send + Sync {
    async fn find_user(&self, user_id: Uuid) -> Result<Option<User>, StoreError>;

    /// Inserts the user unless a row with the same id or email exists, then
    /// returns whichever row is stored.
    async fn register_user(&self, user_id: Uuid, name: &str, email: &str) -> Result<User, StoreError>;

    /// The latest `limit` exchanges for the user, oldest first.
    async fn recent_messages(&self, user_id: Uuid, limit: usize) -> Result<Vec<ChatMessage>, StoreError>;

    async fn save_message(&self, user_id: Uuid, message: &str, reply: &str) -> Result<ChatMessage, StoreError>;

    /// Full history for the user, oldest first.
    async fn list_messages(&self, user_id: Uuid) -> Result<Vec<ChatMessage>, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}
