// src/handlers/status.rs
use crate::AppState;
use axum::{extract::Extension, response::Json};
use serde_json::{json, Value};
use std::sync::Arc;

// API Status endpoint
pub async fn api_status(Extension(state): Extension<Arc<AppState>>) -> Json<Value> {
    let db_status = match state.store.ping().await {
        Ok(_) => "healthy",
        Err(e) => {
            tracing::warn!("Status check could not reach the database: {}", e);
            "unhealthy"
        }
    };

    Json(json!({
        "status": "operational",
        "version": env!("CARGO_PKG_VERSION"),
        "services": {
            "database": db_status,
            "completion_model": state.completion.model(),
        },
        "settings": {
            "history_context_turns": state.history_context_turns,
        },
        "endpoints": {
            "register": "/register",
            "chat": "/chat",
            "messages": "/get-messages",
            "status": "/api/status"
        }
    }))
}
