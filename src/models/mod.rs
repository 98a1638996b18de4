// src/models/mod.rs
pub mod chat;
pub mod user;

use serde::{Deserialize, Serialize};

/// Body returned with every 4xx/5xx response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
