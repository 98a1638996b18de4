// src/directory.rs
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Author of every model reply mirrored into the directory.
pub const BOT_USER_ID: &str = "ai_bot";
pub const BOT_USER_NAME: &str = "AI Bot";

pub const CHANNEL_TYPE: &str = "messaging";
pub const CHANNEL_NAME: &str = "AI Chat";

#[derive(Error, Debug)]
pub enum DirectoryError {
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("Directory API error ({status}): {body}")]
    ApiError { status: u16, body: String },
    #[error("Failed to sign server token: {0}")]
    TokenError(#[from] jsonwebtoken::errors::Error),
    #[error("Failed to decode directory response: {0}")]
    DecodeError(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectoryUser {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub role: Option<String>,
}

impl DirectoryUser {
    pub fn member(id: impl Into<String>, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: Some(name.into()),
            email: Some(email.into()),
            role: Some("user".to_string()),
        }
    }

    pub fn bot() -> Self {
        Self {
            id: BOT_USER_ID.to_string(),
            name: Some(BOT_USER_NAME.to_string()),
            email: None,
            role: Some("user".to_string()),
        }
    }
}

/// A messaging channel in the directory.
#[derive(Debug, Clone, PartialEq)]
pub struct Channel {
    pub channel_type: String,
    pub id: String,
    pub name: String,
    pub created_by_id: String,
    pub members: Vec<String>,
}

impl Channel {
    /// The per-user channel the bot mirrors conversations into.
    pub fn for_user(user_id: &str) -> Self {
        Self {
            channel_type: CHANNEL_TYPE.to_string(),
            id: format!("chat-{}", user_id),
            name: CHANNEL_NAME.to_string(),
            created_by_id: BOT_USER_ID.to_string(),
            members: vec![user_id.to_string(), BOT_USER_ID.to_string()],
        }
    }
}

/// External user directory and message delivery.
#[async_trait]
pub trait Directory: Send + Sync {
    async fn find_user(&self, user_id: &str) -> Result<Option<DirectoryUser>, DirectoryError>;

    async fn find_user_by_id_or_email(
        &self,
        user_id: &str,
        email: &str,
    ) -> Result<Option<DirectoryUser>, DirectoryError>;

    async fn upsert_user(&self, user: &DirectoryUser) -> Result<(), DirectoryError>;

    /// Creates the channel if it does not exist yet; a no-op otherwise.
    async fn ensure_channel(&self, channel: &Channel) -> Result<(), DirectoryError>;

    async fn send_message(&self, channel: &Channel, user_id: &str, text: &str) -> Result<(), DirectoryError>;
}
