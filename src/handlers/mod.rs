// src/handlers/mod.rs
pub mod chat;
pub mod register;
pub mod status;
pub mod ui;

use crate::models::ErrorResponse;
use axum::{http::StatusCode, Json};
use std::fmt::Display;

/// Error half of every handler result.
pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub fn api_error(status: StatusCode, message: &str) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
}

pub fn bad_request(message: &str) -> ApiError {
    api_error(StatusCode::BAD_REQUEST, message)
}

pub fn not_found(message: &str) -> ApiError {
    api_error(StatusCode::NOT_FOUND, message)
}

/// Logs the underlying failure and returns the generic 500 body.
pub fn internal_error(context: &str, err: impl Display) -> ApiError {
    tracing::error!("{}: {}", context, err);
    api_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
}

/// Value of a required text field as sent, or `None` when missing or blank.
pub fn required(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}
