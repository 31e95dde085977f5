//! Error types and HTTP error response handling.
//!
//! This module defines all application errors and how they are converted
//! into HTTP responses with appropriate status codes and JSON bodies.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Application-wide error type.
///
/// Each variant maps to a specific HTTP status code and a fixed,
/// user-facing message. The messages are part of the public contract:
/// the member and admin front ends display them verbatim.
///
/// # Error Categories
///
/// - **Input validation**: empty or malformed fields (400)
/// - **Access errors**: unknown, invalid or revoked keys (401/403)
/// - **Resource errors**: admin operations on rows that do not exist (404)
/// - **Server errors**: storage failures and unparseable bodies (500)
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Any other failure that should surface as a generic server error.
    #[error("Internal error: {0}")]
    Internal(String),

    /// The access key field was missing, not a string, or blank.
    #[error("Access Key Required.")]
    AccessKeyRequired,

    /// The admin key field was missing, not a string, or blank.
    #[error("Admin Key Required.")]
    AdminKeyRequired,

    /// No access key matches, or the admin secret is wrong.
    ///
    /// Unknown codes are deliberately indistinguishable from bad admin secrets.
    #[error("Invalid Key. Access Denied.")]
    InvalidKey,

    /// The access key exists but has been revoked.
    #[error("Access Revoked. Contact Administration.")]
    Revoked,

    /// The caller is not holding an active access key (or admin secret).
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Access key not found")]
    KeyNotFound,

    #[error("Application not found")]
    ApplicationNotFound,

    /// Request body or parameters are invalid.
    ///
    /// The String is shown to the user as-is.
    #[error("{0}")]
    InvalidRequest(String),
}

/// Convert AppError into an HTTP response.
///
/// # Response Format
///
/// ```json
/// { "error": "Invalid Key. Access Denied." }
/// ```
///
/// # Status Code Mapping
///
/// - `AccessKeyRequired`, `AdminKeyRequired`, `InvalidRequest` → 400
/// - `InvalidKey`, `Unauthorized` → 401
/// - `Revoked` → 403
/// - `KeyNotFound`, `ApplicationNotFound` → 404
/// - `Database`, `Internal` → 500 (details are logged, never returned)
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::AccessKeyRequired | AppError::AdminKeyRequired | AppError::InvalidRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::InvalidKey | AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Revoked => StatusCode::FORBIDDEN,
            AppError::KeyNotFound | AppError::ApplicationNotFound => StatusCode::NOT_FOUND,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "request failed");
            "Server error.".to_string()
        } else {
            self.to_string()
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
