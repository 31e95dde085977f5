//! Public application form endpoint.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};

use crate::{
    error::AppError,
    models::application::{SubmitApplicationRequest, SubmitApplicationResponse},
    services::application_service,
    state::AppState,
};

/// Submit a membership application.
///
/// # Endpoint
///
/// `POST /api/v1/applications`
///
/// # Response
///
/// - **201 Created**: `{ "id": "...", "status": "pending" }`
/// - **400**: validation message, e.g. `{ "error": "You must be at least 18 years of age." }`
pub async fn submit_application(
    State(state): State<AppState>,
    Json(form): Json<SubmitApplicationRequest>,
) -> Result<impl IntoResponse, AppError> {
    let application =
        application_service::submit_application(state.store.as_ref(), state.clock.as_ref(), form)
            .await?;

    Ok((
        StatusCode::CREATED,
        Json(SubmitApplicationResponse {
            id: application.id,
            status: application.status,
        }),
    ))
}
