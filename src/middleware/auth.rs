//! Admin secret authentication middleware.
//!
//! This middleware intercepts every admin console request to:
//! 1. Extract the secret from the `Authorization: Bearer <secret>` header
//! 2. Compare it with the configured admin secret
//! 3. Reject the request with HTTP 401 when it is missing or wrong
//!
//! There is one shared secret and no per-admin identity.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::{error::AppError, services::access_service, state::AppState};

/// Admin authentication middleware function.
///
/// # Headers
///
/// ```text
/// Authorization: Bearer <admin secret>
/// ```
///
/// # Returns
///
/// - `Ok(Response)` from the next handler when the secret matches
/// - `Err(AppError::Unauthorized)` otherwise (401)
pub async fn admin_auth_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let secret = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .ok_or(AppError::Unauthorized)?;

    access_service::verify_admin_key(&state.config.admin_key, Some(secret)).map_err(|_| {
        tracing::debug!("admin request with bad credentials");
        AppError::Unauthorized
    })?;

    Ok(next.run(request).await)
}
