// src/completion.rs
use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CompletionError {
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("Completion API error ({status}): {body}")]
    ApiError { status: u16, body: String },
    #[error("Failed to decode completion response: {0}")]
    DecodeError(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Model,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Model => "model",
        }
    }
}

/// A single conversation turn sent to the completion service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub role: Role,
    pub text: String,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self { role: Role::User, text: text.into() }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self { role: Role::Model, text: text.into() }
    }
}

/// Multi-turn text generation.
#[async_trait]
pub trait Completion: Send + Sync {
    /// Returns `Ok(None)` when the service answered but produced no text.
    async fn generate(&self, turns: &[Turn]) -> Result<Option<String>, CompletionError>;

    fn model(&self) -> &str;
}
