// src/test_support.rs
//! In-process stand-ins for the directory, completion service and store,
//! plus a harness that drives the real router.

use crate::completion::{Completion, CompletionError, Turn};
use crate::directory::{Channel, Directory, DirectoryError, DirectoryUser};
use crate::models::{chat::ChatMessage, user::User};
use crate::store::{ChatStore, StoreError};
use crate::{build_router, AppState};
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;
use uuid::Uuid;

fn directory_down() -> DirectoryError {
    DirectoryError::ApiError {
        status: 503,
        body: "directory unavailable".to_string(),
    }
}

#[derive(Default)]
pub struct FakeDirectory {
    pub users: Mutex<Vec<DirectoryUser>>,
    pub channels: Mutex<Vec<Channel>>,
    /// (channel id, author, text)
    pub messages: Mutex<Vec<(String, String, String)>>,
    pub lookups: AtomicUsize,
    pub upserts: AtomicUsize,
    pub fail: AtomicBool,
    pub fail_sends: AtomicBool,
}

impl FakeDirectory {
    fn check(&self) -> Result<(), DirectoryError> {
        if self.fail.load(Ordering::SeqCst) {
            Err(directory_down())
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Directory for FakeDirectory {
    async fn find_user(&self, user_id: &str) -> Result<Option<DirectoryUser>, DirectoryError> {
        self.check()?;
        self.lookups.fetch_add(1, Ordering::SeqCst);
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.id == user_id).cloned())
    }

    async fn find_user_by_id_or_email(
        &self,
        user_id: &str,
        email: &str,
    ) -> Result<Option<DirectoryUser>, DirectoryError> {
        self.check()?;
        self.lookups.fetch_add(1, Ordering::SeqCst);
        let users = self.users.lock().unwrap();
        Ok(users
            .iter()
            .find(|u| u.id == user_id || u.email.as_deref() == Some(email))
            .cloned())
    }

    async fn upsert_user(&self, user: &DirectoryUser) -> Result<(), DirectoryError> {
        self.check()?;
        self.upserts.fetch_add(1, Ordering::SeqCst);
        let mut users = self.users.lock().unwrap();
        users.retain(|u| u.id != user.id);
        users.push(user.clone());
        Ok(())
    }

    async fn ensure_channel(&self, channel: &Channel) -> Result<(), DirectoryError> {
        self.check()?;
        let mut channels = self.channels.lock().unwrap();
        if !channels.iter().any(|c| c.id == channel.id) {
            channels.push(channel.clone());
        }
        Ok(())
    }

    async fn send_message(&self, channel: &Channel, user_id: &str, text: &str) -> Result<(), DirectoryError> {
        self.check()?;
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(directory_down());
        }
        self.messages
            .lock()
            .unwrap()
            .push((channel.id.clone(), user_id.to_string(), text.to_string()));
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeCompletion {
    pub reply: Option<String>,
    pub calls: Mutex<Vec<Vec<Turn>>>,
    pub fail: AtomicBool,
}

#[async_trait]
impl Completion for FakeCompletion {
    async fn generate(&self, turns: &[Turn]) -> Result<Option<String>, CompletionError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(CompletionError::ApiError {
                status: 500,
                body: "model overloaded".to_string(),
            });
        }
        self.calls.lock().unwrap().push(turns.to_vec());
        Ok(self.reply.clone())
    }

    fn model(&self) -> &str {
        "fake-model"
    }
}

#[derive(Default)]
pub struct MemoryStore {
    pub users: Mutex<Vec<User>>,
    pub chats: Mutex<Vec<ChatMessage>>,
    pub fail: AtomicBool,
}

impl MemoryStore {
    fn check(&self) -> Result<(), StoreError> {
        if self.fail.load(Ordering::SeqCst) {
            Err(StoreError::DatabaseError(sqlx::Error::PoolTimedOut))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ChatStore for MemoryStore {
    async fn find_user(&self, user_id: Uuid) -> Result<Option<User>, StoreError> {
        self.check()?;
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.user_id == user_id).cloned())
    }

    async fn register_user(&self, user_id: Uuid, name: &str, email: &str) -> Result<User, StoreError> {
        self.check()?;
        let mut users = self.users.lock().unwrap();
        if let Some(existing) = users.iter().find(|u| u.user_id == user_id || u.email == email) {
            return Ok(existing.clone());
        }
        let user = User {
            user_id,
            name: name.to_string(),
            email: email.to_string(),
            created_at: chrono::Utc::now(),
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn recent_messages(&self, user_id: Uuid, limit: usize) -> Result<Vec<ChatMessage>, StoreError> {
        self.check()?;
        let chats = self.chats.lock().unwrap();
        let owned: Vec<ChatMessage> = chats.iter().filter(|c| c.user_id == user_id).cloned().collect();
        let skip = owned.len().saturating_sub(limit);
        Ok(owned.into_iter().skip(skip).collect())
    }

    async fn save_message(&self, user_id: Uuid, message: &str, reply: &str) -> Result<ChatMessage, StoreError> {
        self.check()?;
        let mut chats = self.chats.lock().unwrap();
        let row = ChatMessage {
            id: chats.len() as i32 + 1,
            user_id,
            message: message.to_string(),
            reply: reply.to_string(),
            created_at: chrono::Utc::now(),
        };
        chats.push(row.clone());
        Ok(row)
    }

    async fn list_messages(&self, user_id: Uuid) -> Result<Vec<ChatMessage>, StoreError> {
        self.check()?;
        let chats = self.chats.lock().unwrap();
        Ok(chats.iter().filter(|c| c.user_id == user_id).cloned().collect())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.check()
    }
}

pub struct Harness {
    pub directory: Arc<FakeDirectory>,
    pub completion: Arc<FakeCompletion>,
    pub store: Arc<MemoryStore>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_reply(Some("Hi there"))
    }

    pub fn with_reply(reply: Option<&str>) -> Self {
        Self {
            directory: Arc::new(FakeDirectory::default()),
            completion: Arc::new(FakeCompletion {
                reply: reply.map(str::to_string),
                ..Default::default()
            }),
            store: Arc::new(MemoryStore::default()),
        }
    }

    pub fn router(&self) -> axum::Router {
        build_router(Arc::new(AppState {
            directory: self.directory.clone(),
            completion: self.completion.clone(),
            store: self.store.clone(),
            history_context_turns: crate::config::DEFAULT_HISTORY_CONTEXT_TURNS,
        }))
    }

    pub async fn post(&self, path: &str, body: Value) -> (StatusCode, Value) {
        self.post_raw(path, &body.to_string()).await
    }

    pub async fn post_raw(&self, path: &str, body: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    pub async fn get(&self, path: &str) -> (StatusCode, String) {
        let request = Request::builder().uri(path).body(Body::empty()).unwrap();
        let response = self.router().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }
}
