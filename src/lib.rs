// lib.rs - Library root: application state, router and collaborators
pub mod completion;
pub mod config;
pub mod conversation;
pub mod db;
pub mod directory;
pub mod gemini_client;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod store;
pub mod stream_client;

#[cfg(test)]
mod test_support;

use axum::{routing::get, Extension, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use completion::Completion;
use directory::Directory;
use store::ChatStore;

// AppState holds the directory client, completion client and chat store behind
// trait objects so handlers can run against any implementation.
pub struct AppState {
    pub directory: Arc<dyn Directory>,
    pub completion: Arc<dyn Completion>,
    pub store: Arc<dyn ChatStore>,
    pub history_context_turns: usize,
}

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(handlers::ui::ui_routes())
        .merge(handlers::register::register_routes())
        .merge(handlers::chat::chat_routes())
        .route("/api/status", get(handlers::status::api_status))
        .layer(axum::middleware::from_fn(middleware::logging::request_logging_middleware))
        .layer(CorsLayer::permissive())
        .layer(Extension(state))
}
