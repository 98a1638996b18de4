// src/models/user.rs
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Namespace for deriving user identifiers from email addresses.
pub const USER_ID_NAMESPACE: Uuid = Uuid::from_u128(0x6f1c_2a7e_93d4_4b0a_8e35_c1f0_7d2b_9a41);

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Fields are optional so that a missing field surfaces as our own 400
/// instead of the extractor's rejection.
#[derive(Debug, Default, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub user_id: String,
    pub name: String,
    pub email: String,
}

impl From<User> for RegisterResponse {
    fn from(user: User) -> Self {
        RegisterResponse {
            user_id: user.user_id.to_string(),
            name: user.name,
            email: user.email,
        }
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// The same email always maps to the same identifier, which makes
/// registration idempotent in both the directory and the local store.
pub fn derive_user_id(email: &str) -> Uuid {
    Uuid::new_v5(&USER_ID_NAMESPACE, normalize_email(email).as_bytes())
}
