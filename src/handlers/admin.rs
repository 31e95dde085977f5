//! Admin console HTTP handlers.
//!
//! All routes here sit behind [`admin_auth_middleware`](crate::middleware::auth::admin_auth_middleware):
//! - GET/POST /api/v1/admin/keys - List and issue access keys
//! - PATCH/DELETE /api/v1/admin/keys/{id} - Edit or delete a key
//! - POST /api/v1/admin/keys/{id}/revoke - Revoke a key
//! - POST /api/v1/admin/messages - Send a broadcast or targeted message
//! - GET /api/v1/admin/applications - List applications
//! - POST /api/v1/admin/applications/{id}/approve|deny - Review an application
//! - GET /api/v1/admin/audit-log - Recent audit entries

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{
        access_key::{AccessKey, AccessKeyUpdate, CreateKeyRequest, KeyFilter},
        application::{Application, ApplicationFilter},
        audit::AuditEntry,
        message::{Message, SendMessageRequest},
    },
    services::{
        application_service::{self, Decision},
        audit_service, key_service, message_service,
    },
    state::AppState,
};

/// Issue a new access key.
///
/// # Request Body
///
/// ```json
/// { "assigned_user_name": "Jane Doe", "role": "agent" }
/// ```
///
/// # Response
///
/// 201 Created with the full key record, including the generated code.
pub async fn create_key(
    State(state): State<AppState>,
    Json(request): Json<CreateKeyRequest>,
) -> Result<impl IntoResponse, AppError> {
    let key = key_service::create_key(state.store.as_ref(), state.clock.as_ref(), request).await?;

    Ok((StatusCode::CREATED, Json(key)))
}

/// List keys, newest first. `?status=active|revoked` narrows the list.
pub async fn list_keys(
    State(state): State<AppState>,
    Query(filter): Query<KeyFilter>,
) -> Result<Json<Vec<AccessKey>>, AppError> {
    let keys = key_service::list_keys(state.store.as_ref(), filter.status).await?;

    Ok(Json(keys))
}

/// Edit a key's user name, role or status.
///
/// # Request Body
///
/// Any subset of:
///
/// ```json
/// { "assigned_user_name": "Jane Doe", "role": "layperson", "status": "active" }
/// ```
pub async fn update_key(
    State(state): State<AppState>,
    Path(key_id): Path<Uuid>,
    Json(update): Json<AccessKeyUpdate>,
) -> Result<Json<AccessKey>, AppError> {
    let key =
        key_service::update_key(state.store.as_ref(), state.clock.as_ref(), key_id, update).await?;

    Ok(Json(key))
}

pub async fn revoke_key(
    State(state): State<AppState>,
    Path(key_id): Path<Uuid>,
) -> Result<Json<AccessKey>, AppError> {
    let key = key_service::revoke_key(state.store.as_ref(), state.clock.as_ref(), key_id).await?;

    Ok(Json(key))
}

/// Delete a key permanently. Returns 204 No Content.
pub async fn delete_key(
    State(state): State<AppState>,
    Path(key_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    key_service::delete_key(state.store.as_ref(), state.clock.as_ref(), key_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Send a message.
///
/// # Request Body
///
/// ```json
/// { "target_key": "ABCD2345EFGH", "title": "Summons", "body": "..." }
/// ```
///
/// Omit `target_key` (or send null) to broadcast to every active key.
pub async fn send_message(
    State(state): State<AppState>,
    Json(request): Json<SendMessageRequest>,
) -> Result<impl IntoResponse, AppError> {
    let message =
        message_service::send_message(state.store.as_ref(), state.clock.as_ref(), request).await?;

    Ok((StatusCode::CREATED, Json::<Message>(message)))
}

pub async fn list_applications(
    State(state): State<AppState>,
    Query(filter): Query<ApplicationFilter>,
) -> Result<Json<Vec<Application>>, AppError> {
    let applications =
        application_service::list_applications(state.store.as_ref(), filter.status).await?;

    Ok(Json(applications))
}

pub async fn approve_application(
    State(state): State<AppState>,
    Path(application_id): Path<Uuid>,
) -> Result<Json<Application>, AppError> {
    review(state, application_id, Decision::Approve).await
}

pub async fn deny_application(
    State(state): State<AppState>,
    Path(application_id): Path<Uuid>,
) -> Result<Json<Application>, AppError> {
    review(state, application_id, Decision::Deny).await
}

async fn review(
    state: AppState,
    application_id: Uuid,
    decision: Decision,
) -> Result<Json<Application>, AppError> {
    let application = application_service::review_application(
        state.store.as_ref(),
        state.clock.as_ref(),
        application_id,
        decision,
    )
    .await?;

    Ok(Json(application))
}

#[derive(Debug, Deserialize)]
pub struct AuditQuery {
    #[serde(default = "default_audit_limit")]
    pub limit: i64,
}

fn default_audit_limit() -> i64 {
    100
}

/// Recent audit entries, newest first. `?limit=` defaults to 100.
pub async fn list_audit_log(
    State(state): State<AppState>,
    Query(query): Query<AuditQuery>,
) -> Result<Json<Vec<AuditEntry>>, AppError> {
    let entries = audit_service::recent(state.store.as_ref(), query.limit).await?;

    Ok(Json(entries))
}
