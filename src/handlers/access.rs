//! Public access endpoints used by the member gate and admin login.
//!
//! - POST /validate-key - Check a member access code
//! - POST /validate-admin-key - Check the shared admin secret
//! - POST /get-messages - Notices visible to an active code
//!
//! Bodies are parsed by hand instead of with the `Json` extractor: a body
//! that is not JSON at all is a server error, while a missing field is an
//! input error with its own message.

use axum::{Json, body::Bytes, extract::State, http::StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::{
    error::AppError,
    models::{
        access_key::{AccessKeyRequest, AdminKeyRequest, ValidateKeyResponse},
        message::{MessageResponse, MessagesResponse},
    },
    services::{access_service, message_service},
    state::AppState,
};

fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, AppError> {
    serde_json::from_slice(body)
        .map_err(|e| AppError::Internal(format!("malformed request body: {e}")))
}

/// Validate a member access code.
///
/// # Request Body
///
/// ```json
/// { "access_key": "ABCD2345EFGH" }
/// ```
///
/// # Response
///
/// - **200**: `{ "success": true, "key": "...", "role": "agent", "user_name": "..." }`
/// - **400**: `{ "error": "Access Key Required." }`
/// - **401**: `{ "error": "Invalid Key. Access Denied." }`
/// - **403**: `{ "error": "Access Revoked. Contact Administration." }`
/// - **500**: `{ "error": "Server error." }`
pub async fn validate_key(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ValidateKeyResponse>, AppError> {
    let request: AccessKeyRequest = parse_body(&body)?;

    let identity = access_service::validate_access_key(
        state.store.as_ref(),
        state.clock.as_ref(),
        request.access_key.as_deref(),
    )
    .await?;

    Ok(Json(ValidateKeyResponse {
        success: true,
        identity,
    }))
}

/// Validate the shared admin secret.
///
/// # Response
///
/// - **200**: `{ "success": true }`
/// - **400**: `{ "error": "Admin Key Required." }`
/// - **401**: `{ "error": "Invalid Key. Access Denied." }`
pub async fn validate_admin_key(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Value>, AppError> {
    let request: AdminKeyRequest = parse_body(&body)?;

    access_service::verify_admin_key(&state.config.admin_key, request.admin_key.as_deref())?;

    tracing::info!("admin secret accepted");
    Ok(Json(json!({ "success": true })))
}

/// Fetch the notices visible to an active access code.
///
/// # Response
///
/// - **200**: `{ "messages": [{ "id", "title", "body", "created_at" }] }`, newest first
/// - **401**: `{ "error": "Unauthorized" }`
pub async fn get_messages(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<MessagesResponse>, AppError> {
    let request: AccessKeyRequest = parse_body(&body)?;

    let messages = message_service::messages_for(
        state.store.as_ref(),
        request.access_key.as_deref(),
        state.config.message_limit,
    )
    .await?;

    Ok(Json(MessagesResponse {
        messages: messages.into_iter().map(MessageResponse::from).collect(),
    }))
}

/// Bare OPTIONS request: empty body, CORS headers come from the layer.
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}
