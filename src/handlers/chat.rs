// src/handlers/chat.rs
use super::{bad_request, internal_error, not_found, required, ApiError};
use crate::conversation::{build_turns, pairs_for_turns, reply_or_placeholder};
use crate::directory::{Channel, BOT_USER_ID};
use crate::models::chat::{ChatRequest, ChatResponse, MessagesRequest, MessagesResponse};
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, Extension},
    response::Json,
    routing::post,
    Router,
};
use std::sync::Arc;
use uuid::Uuid;

const USER_NOT_FOUND: &str = "User not found. Please register first.";

pub fn chat_routes() -> Router {
    Router::new()
        .route("/chat", post(chat))
        .route("/get-messages", post(get_messages))
}

async fn chat(
    Extension(state): Extension<Arc<AppState>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let payload = payload.map(|Json(p)| p).unwrap_or_default();

    let (Some(message), Some(raw_user_id)) = (required(&payload.message), required(&payload.user_id)) else {
        return Err(bad_request("Message and user are required"));
    };

    // Every registered id is a UUID; anything else cannot belong to a user.
    let Ok(user_id) = Uuid::parse_str(raw_user_id.trim()) else {
        tracing::debug!("Rejecting chat for malformed user id {:?}", raw_user_id);
        return Err(not_found(USER_NOT_FOUND));
    };
    let user_key = user_id.to_string();

    let directory_user = state
        .directory
        .find_user(&user_key)
        .await
        .map_err(|e| internal_error("Directory lookup failed", e))?;
    if directory_user.is_none() {
        tracing::info!("Chat from {} rejected: unknown to directory", user_key);
        return Err(not_found(USER_NOT_FOUND));
    }

    let stored_user = state
        .store
        .find_user(user_id)
        .await
        .map_err(|e| internal_error("User lookup failed", e))?;
    if stored_user.is_none() {
        tracing::info!("Chat from {} rejected: not in local store", user_key);
        return Err(not_found(USER_NOT_FOUND));
    }

    let history = state
        .store
        .recent_messages(user_id, pairs_for_turns(state.history_context_turns))
        .await
        .map_err(|e| internal_error("Failed to load conversation history", e))?;
    let turns = build_turns(&history, message);

    tracing::info!(
        "💬 Sending message for {} with {} prior exchange(s) to {}",
        user_key,
        history.len(),
        state.completion.model()
    );

    let generated = state
        .completion
        .generate(&turns)
        .await
        .map_err(|e| internal_error("Error generating ai response", e))?;
    let reply = reply_or_placeholder(generated);

    state
        .store
        .save_message(user_id, message, &reply)
        .await
        .map_err(|e| internal_error("Failed to save chat", e))?;

    let channel = Channel::for_user(&user_key);
    state
        .directory
        .ensure_channel(&channel)
        .await
        .map_err(|e| internal_error("Failed to create chat channel", e))?;
    state
        .directory
        .send_message(&channel, &user_key, message)
        .await
        .map_err(|e| internal_error("Failed to mirror user message", e))?;
    state
        .directory
        .send_message(&channel, BOT_USER_ID, &reply)
        .await
        .map_err(|e| internal_error("Failed to mirror bot reply", e))?;

    Ok(Json(ChatResponse { reply }))
}

async fn get_messages(
    Extension(state): Extension<Arc<AppState>>,
    payload: Result<Json<MessagesRequest>, JsonRejection>,
) -> Result<Json<MessagesResponse>, ApiError> {
    let payload = payload.map(|Json(p)| p).unwrap_or_default();

    let Some(raw_user_id) = required(&payload.user_id) else {
        return Err(bad_request("User is required"));
    };

    let Ok(user_id) = Uuid::parse_str(raw_user_id.trim()) else {
        return Ok(Json(MessagesResponse { messages: Vec::new() }));
    };

    let messages = state
        .store
        .list_messages(user_id)
        .await
        .map_err(|e| internal_error("Failed to load messages", e))?;

    tracing::debug!("Loaded {} message(s) for {}", messages.len(), user_id);

    Ok(Json(MessagesResponse { messages }))
}
