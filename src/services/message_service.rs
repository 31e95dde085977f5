//! Member notices: fetching for a member, sending from the admin console.

use serde_json::json;

use crate::{
    clock::Clock,
    error::AppError,
    models::{
        audit::AuditAction,
        message::{Message, NewMessage, SendMessageRequest},
    },
    services::{access_service, audit_service},
    store::Store,
};

/// Messages a member may read: broadcasts plus those addressed to their
/// code, newest first, at most `limit`.
///
/// # Errors
///
/// - `Unauthorized`: code missing, unknown or revoked
pub async fn messages_for(
    store: &dyn Store,
    candidate: Option<&str>,
    limit: i64,
) -> Result<Vec<Message>, AppError> {
    let key = access_service::require_active_key(store, candidate).await?;
    store.visible_messages(&key.access_key, limit).await
}

/// Send a broadcast (no target) or a message to a single key.
///
/// # Errors
///
/// - `InvalidRequest`: blank title or body
/// - `KeyNotFound`: the target code does not exist
pub async fn send_message(
    store: &dyn Store,
    clock: &dyn Clock,
    request: SendMessageRequest,
) -> Result<Message, AppError> {
    let title = request.title.trim();
    let body = request.body.trim();
    if title.is_empty() || body.is_empty() {
        return Err(AppError::InvalidRequest(
            "Title and body are required".to_string(),
        ));
    }

    let target_key = match request.target_key.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(code) => {
            let key = store
                .find_access_key(code)
                .await?
                .ok_or(AppError::KeyNotFound)?;
            Some(key.access_key)
        }
    };

    let message = store
        .insert_message(NewMessage {
            target_key,
            title: title.to_string(),
            body: body.to_string(),
            created_at: clock.now(),
        })
        .await?;

    audit_service::record(
        store,
        clock,
        AuditAction::SendMessage,
        json!({
            "target": message.target_key.as_deref().unwrap_or("broadcast"),
            "title": message.title,
        }),
    )
    .await;

    Ok(message)
}
