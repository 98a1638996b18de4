// Stream Chat server-side REST client
// Supports: user query/upsert, channel get-or-create, channel messages

use crate::directory::{Channel, Directory, DirectoryError, DirectoryUser};
use async_trait::async_trait;
use jsonwebtoken::{encode, EncodingKey, Header};
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;

#[derive(Clone)]
pub struct StreamClient {
    client: Client,
    api_key: String,
    server_token: String,
    base_url: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ServerClaims {
    pub server: bool,
}

#[derive(Debug, Deserialize)]
pub struct QueryUsersResponse {
    #[serde(default)]
    pub users: Vec<DirectoryUser>,
}

// ============================================================================
// REQUEST BODIES
// ============================================================================

pub fn query_users_payload(filter: Value) -> Value {
    json!({
        "filter_conditions": filter,
        "limit": 1,
    })
}

pub fn upsert_users_body(user: &DirectoryUser) -> Value {
    let mut users = serde_json::Map::new();
    users.insert(user.id.clone(), json!(user));
    json!({ "users": users })
}

pub fn channel_query_body(channel: &Channel) -> Value {
    json!({
        "data": {
            "name": channel.name,
            "created_by_id": channel.created_by_id,
            "members": channel.members,
        },
        "state": false,
    })
}

pub fn message_body(user_id: &str, text: &str) -> Value {
    json!({
        "message": {
            "text": text,
            "user_id": user_id,
        }
    })
}

/// Server tokens carry no expiry; Stream accepts them for the lifetime of the secret.
pub fn sign_server_token(api_secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
    encode(
        &Header::default(),
        &ServerClaims { server: true },
        &EncodingKey::from_secret(api_secret.as_bytes()),
    )
}

// ============================================================================
// IMPLEMENTATION
// ============================================================================

impl StreamClient {
    pub fn new(
        api_key: String,
        api_secret: &str,
        base_url: String,
        timeout: Duration,
    ) -> Result<Self, DirectoryError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            api_key,
            server_token: sign_server_token(api_secret)?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .query(&[("api_key", self.api_key.as_str())])
            .header("Authorization", &self.server_token)
            .header("Stream-Auth-Type", "jwt")
    }

    async fn read_body(response: Response) -> Result<String, DirectoryError> {
        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            Ok(body)
        } else {
            Err(DirectoryError::ApiError {
                status: status.as_u16(),
                body,
            })
        }
    }

    async fn query_users(&self, filter: Value) -> Result<Vec<DirectoryUser>, DirectoryError> {
        let payload = serde_json::to_string(&query_users_payload(filter))?;
        let url = format!("{}/users", self.base_url);

        let response = self
            .authorized(self.client.get(&url))
            .query(&[("payload", payload.as_str())])
            .send()
            .await?;

        let body = Self::read_body(response).await?;
        let result: QueryUsersResponse = serde_json::from_str(&body)?;
        Ok(result.users)
    }
}

#[async_trait]
impl Directory for StreamClient {
    async fn find_user(&self, user_id: &str) -> Result<Option<DirectoryUser>, DirectoryError> {
        let users = self.query_users(json!({ "id": { "$eq": user_id } })).await?;
        Ok(users.into_iter().next())
    }

    async fn find_user_by_id_or_email(
        &self,
        user_id: &str,
        email: &str,
    ) -> Result<Option<DirectoryUser>, DirectoryError> {
        let users = self
            .query_users(json!({
                "$or": [
                    { "id": { "$eq": user_id } },
                    { "email": { "$eq": email } }
                ]
            }))
            .await?;
        Ok(users.into_iter().next())
    }

    async fn upsert_user(&self, user: &DirectoryUser) -> Result<(), DirectoryError> {
        let url = format!("{}/users", self.base_url);
        let response = self
            .authorized(self.client.post(&url))
            .json(&upsert_users_body(user))
            .send()
            .await?;

        Self::read_body(response).await?;
        tracing::info!("📇 Upserted directory user {}", user.id);
        Ok(())
    }

    async fn ensure_channel(&self, channel: &Channel) -> Result<(), DirectoryError> {
        let url = format!(
            "{}/channels/{}/{}/query",
            self.base_url, channel.channel_type, channel.id
        );
        let response = self
            .authorized(self.client.post(&url))
            .json(&channel_query_body(channel))
            .send()
            .await?;

        Self::read_body(response).await?;
        tracing::debug!("Channel {}:{} ready", channel.channel_type, channel.id);
        Ok(())
    }

    async fn send_message(&self, channel: &Channel, user_id: &str, text: &str) -> Result<(), DirectoryError> {
        let url = format!(
            "{}/channels/{}/{}/message",
            self.base_url, channel.channel_type, channel.id
        );
        let response = self
            .authorized(self.client.post(&url))
            .json(&message_body(user_id, text))
            .send()
            .await?;

        Self::read_body(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

    #[test]
    fn test_server_token_is_signed_with_secret() {
        let token = sign_server_token("top-secret").unwrap();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.required_spec_claims.clear();
        validation.validate_exp = false;

        let data = decode::<ServerClaims>(
            &token,
            &DecodingKey::from_secret("top-secret".as_bytes()),
            &validation,
        )
        .unwrap();
        assert!(data.claims.server);

        assert!(decode::<ServerClaims>(
            &token,
            &DecodingKey::from_secret("wrong".as_bytes()),
            &validation,
        )
        .is_err());
    }

    #[test]
    fn test_upsert_body_is_keyed_by_user_id() {
        let user = DirectoryUser::member("u1", "Ada", "ada@example.com");

        assert_eq!(
            upsert_users_body(&user),
            json!({
                "users": {
                    "u1": {"id": "u1", "name": "Ada", "email": "ada@example.com", "role": "user"}
                }
            })
        );
    }

    #[test]
    fn test_channel_query_creates_with_bot_as_owner() {
        let body = channel_query_body(&Channel::for_user("u1"));

        assert_eq!(body["data"]["name"], "AI Chat");
        assert_eq!(body["data"]["created_by_id"], "ai_bot");
        assert_eq!(body["data"]["members"], json!(["u1", "ai_bot"]));
    }

    #[test]
    fn test_message_body_names_author() {
        assert_eq!(
            message_body("ai_bot", "Hi there"),
            json!({"message": {"text": "Hi there", "user_id": "ai_bot"}})
        );
    }

    #[test]
    fn test_users_response_tolerates_extra_fields() {
        let response: QueryUsersResponse = serde_json::from_value(json!({
            "users": [{"id": "u1", "name": "Ada", "online": false, "created_at": "2024-01-01T00:00:00Z"}],
            "duration": "1.2ms"
        }))
        .unwrap();

        assert_eq!(response.users.len(), 1);
        assert_eq!(response.users[0].id, "u1");
        assert_eq!(response.users[0].email, None);
    }
}
