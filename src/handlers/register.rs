// src/handlers/register.rs
use super::{bad_request, internal_error, required, ApiError};
use crate::directory::DirectoryUser;
use crate::models::user::{derive_user_id, normalize_email, RegisterRequest, RegisterResponse};
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::StatusCode,
    response::Json,
    routing::post,
    Router,
};
use std::sync::Arc;

pub fn register_routes() -> Router {
    Router::new().route("/register", post(register))
}

async fn register(
    Extension(state): Extension<Arc<AppState>>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let payload = payload.map(|Json(p)| p).unwrap_or_default();

    let (Some(name), Some(email)) = (required(&payload.name), required(&payload.email)) else {
        return Err(bad_request("Name and email are required"));
    };

    let email = normalize_email(email);
    let user_id = derive_user_id(&email);
    let user_key = user_id.to_string();

    let existing = state
        .directory
        .find_user_by_id_or_email(&user_key, &email)
        .await
        .map_err(|e| internal_error("Directory lookup failed during registration", e))?;

    // An email held under an older, non-derived id still needs the derived id
    // upserted, since chat looks users up by the id returned here.
    match existing {
        Some(user) if user.id == user_key => {
            tracing::debug!("Directory already knows {} as {}", email, user.id)
        }
        other => {
            if let Some(legacy) = other {
                tracing::info!("Directory holds {} under legacy id {}, adding {}", email, legacy.id, user_key);
            }
            state
                .directory
                .upsert_user(&DirectoryUser::member(user_key.as_str(), name, email.as_str()))
                .await
                .map_err(|e| internal_error("Directory upsert failed", e))?
        }
    }

    // Conditional insert keyed on the unique id/email, so concurrent
    // registrations of the same email converge on one row.
    let user = state
        .store
        .register_user(user_id, name, &email)
        .await
        .map_err(|e| internal_error("Failed to store user", e))?;

    tracing::info!("✅ Registered user {}", user.user_id);

    Ok((StatusCode::CREATED, Json(RegisterResponse::from(user))))
}
