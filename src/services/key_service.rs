//! Access key administration: issue, edit, revoke, delete.
//!
//! Every successful mutation leaves an entry in the audit trail through
//! [`audit_service::record`].

use rand::Rng;
use serde_json::json;
use uuid::Uuid;

use crate::{
    clock::Clock,
    error::AppError,
    models::{
        access_key::{AccessKey, AccessKeyUpdate, CreateKeyRequest, KeyStatus, NewAccessKey},
        audit::AuditAction,
    },
    services::{access_service::fingerprint, audit_service},
    store::Store,
};

/// Characters used for generated codes. I, O, 0 and 1 are left out because
/// they are easy to misread.
pub const ACCESS_CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Length of generated codes.
pub const ACCESS_CODE_LENGTH: usize = 12;

const DEFAULT_USER_NAME: &str = "Unassigned";

/// Fresh codes are retried this many times on collision before giving up.
const MAX_CODE_ATTEMPTS: usize = 5;

/// Generate a random access code.
pub fn generate_access_code() -> String {
    let mut rng = rand::rng();
    (0..ACCESS_CODE_LENGTH)
        .map(|_| {
            let index = rng.random_range(0..ACCESS_CODE_ALPHABET.len());
            char::from(ACCESS_CODE_ALPHABET[index])
        })
        .collect()
}

/// Issue a new active key with a generated code.
///
/// # Errors
///
/// - `Internal`: no free code found after several attempts
/// - `Database`: store failure
pub async fn create_key(
    store: &dyn Store,
    clock: &dyn Clock,
    request: CreateKeyRequest,
) -> Result<AccessKey, AppError> {
    let assigned_user_name = request
        .assigned_user_name
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| DEFAULT_USER_NAME.to_string());

    for _ in 0..MAX_CODE_ATTEMPTS {
        let candidate = NewAccessKey {
            access_key: generate_access_code(),
            assigned_user_name: assigned_user_name.clone(),
            role: request.role,
            date_issued: clock.now(),
        };

        if let Some(key) = store.insert_access_key(candidate).await? {
            tracing::info!(key = %fingerprint(&key.access_key), role = ?key.role, "access key issued");
            audit_service::record(
                store,
                clock,
                AuditAction::AddKey,
                json!({
                    "key": key.access_key,
                    "user_name": key.assigned_user_name,
                    "role": key.role,
                }),
            )
            .await;
            return Ok(key);
        }
    }

    Err(AppError::Internal(
        "could not allocate a unique access code".to_string(),
    ))
}

/// List keys, newest first.
pub async fn list_keys(
    store: &dyn Store,
    status: Option<KeyStatus>,
) -> Result<Vec<AccessKey>, AppError> {
    store.list_access_keys(status).await
}

/// Change the user name, role and/or status of a key.
///
/// # Errors
///
/// - `InvalidRequest`: nothing to change, or a blank user name
/// - `KeyNotFound`: no key with this id
pub async fn update_key(
    store: &dyn Store,
    clock: &dyn Clock,
    id: Uuid,
    mut update: AccessKeyUpdate,
) -> Result<AccessKey, AppError> {
    if update.is_empty() {
        return Err(AppError::InvalidRequest("Nothing to update".to_string()));
    }

    if let Some(name) = update.assigned_user_name.take() {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::InvalidRequest(
                "User name cannot be empty".to_string(),
            ));
        }
        update.assigned_user_name = Some(name);
    }

    let key = store
        .update_access_key(id, &update)
        .await?
        .ok_or(AppError::KeyNotFound)?;

    audit_service::record(
        store,
        clock,
        AuditAction::EditKey,
        json!({
            "key": key.access_key,
            "changes": {
                "user_name": update.assigned_user_name,
                "role": update.role,
                "status": update.status,
            },
        }),
    )
    .await;

    Ok(key)
}

/// Mark a key revoked. Sessions already issued for it are not affected.
pub async fn revoke_key(store: &dyn Store, clock: &dyn Clock, id: Uuid) -> Result<AccessKey, AppError> {
    let update = AccessKeyUpdate {
        status: Some(KeyStatus::Revoked),
        ..Default::default()
    };
    let key = store
        .update_access_key(id, &update)
        .await?
        .ok_or(AppError::KeyNotFound)?;

    tracing::info!(key = %fingerprint(&key.access_key), "access key revoked");
    audit_service::record(store, clock, AuditAction::RevokeKey, json!({ "key": key.access_key })).await;

    Ok(key)
}

/// Permanently remove a key.
pub async fn delete_key(store: &dyn Store, clock: &dyn Clock, id: Uuid) -> Result<(), AppError> {
    let key = store
        .delete_access_key(id)
        .await?
        .ok_or(AppError::KeyNotFound)?;

    tracing::info!(key = %fingerprint(&key.access_key), "access key deleted");
    audit_service::record(store, clock, AuditAction::DeleteKey, json!({ "key": key.access_key })).await;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::models::access_key::Role;
    use crate::store::MemoryStore;
    use chrono::{Duration, TimeZone, Utc};
    use std::sync::atomic::Ordering;

    fn clock() -> ManualClock {
        ManualClock::new(Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap())
    }

    #[test]
    fn generated_codes_use_declared_length_and_alphabet() {
        for _ in 0..500 {
            let code = generate_access_code();
            assert_eq!(code.len(), ACCESS_CODE_LENGTH);
            assert!(code.bytes().all(|b| ACCESS_CODE_ALPHABET.contains(&b)), "{code}");
            assert!(!code.contains(['I', 'O', '0', '1']));
        }
    }

    #[tokio::test]
    async fn create_key_defaults_and_audits() {
        let store = MemoryStore::new();
        let clock = clock();

        let key = create_key(
            &store,
            &clock,
            CreateKeyRequest {
                assigned_user_name: Some("   ".to_string()),
                role: Role::Agent,
            },
        )
        .await
        .unwrap();

        assert_eq!(key.assigned_user_name, "Unassigned");
        assert_eq!(key.role, Role::Agent);
        assert_eq!(key.status, KeyStatus::Active);
        assert_eq!(key.date_issued, clock.now());
        assert!(key.last_login.is_none());

        let log = store.audit_log.lock().await;
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].action, "add_key");
        assert_eq!(log[0].details["key"], key.access_key.as_str());
        assert_eq!(log[0].details["role"], "agent");
    }

    #[tokio::test]
    async fn audit_failure_does_not_undo_mutation() {
        let store = MemoryStore::new();
        let clock = clock();
        store.fail_audit_writes.store(true, Ordering::Relaxed);

        let key = create_key(&store, &clock, CreateKeyRequest::default())
            .await
            .unwrap();
        let revoked = revoke_key(&store, &clock, key.id).await.unwrap();

        assert_eq!(revoked.status, KeyStatus::Revoked);
        let stored = store.find_access_key(&key.access_key).await.unwrap().unwrap();
        assert_eq!(stored.status, KeyStatus::Revoked);
        assert!(store.audit_log.lock().await.is_empty());
    }

    #[tokio::test]
    async fn update_key_applies_partial_changes() {
        let store = MemoryStore::new();
        let clock = clock();
        let key = create_key(
            &store,
            &clock,
            CreateKeyRequest {
                assigned_user_name: Some("Old Name".to_string()),
                role: Role::Layperson,
            },
        )
        .await
        .unwrap();

        let updated = update_key(
            &store,
            &clock,
            key.id,
            AccessKeyUpdate {
                assigned_user_name: Some(" New Name ".to_string()),
                role: Some(Role::Agent),
                status: None,
            },
        )
        .await
        .unwrap();

        assert_eq!(updated.assigned_user_name, "New Name");
        assert_eq!(updated.role, Role::Agent);
        assert_eq!(updated.status, KeyStatus::Active);

        let log = store.audit_log.lock().await;
        assert_eq!(log.last().unwrap().action, "edit_key");
        assert_eq!(log.last().unwrap().details["changes"]["role"], "agent");
    }

    #[tokio::test]
    async fn update_key_rejects_empty_and_unknown() {
        let store = MemoryStore::new();
        let clock = clock();

        let err = update_key(&store, &clock, Uuid::new_v4(), AccessKeyUpdate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidRequest(_)));

        let err = update_key(
            &store,
            &clock,
            Uuid::new_v4(),
            AccessKeyUpdate {
                role: Some(Role::Agent),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::KeyNotFound));
    }

    #[tokio::test]
    async fn delete_and_list() {
        let store = MemoryStore::new();
        let clock = clock();

        let first = create_key(&store, &clock, CreateKeyRequest::default()).await.unwrap();
        clock.advance(Duration::minutes(1));
        let second = create_key(&store, &clock, CreateKeyRequest::default()).await.unwrap();
        revoke_key(&store, &clock, first.id).await.unwrap();

        let all = list_keys(&store, None).await.unwrap();
        assert_eq!(all.iter().map(|k| k.id).collect::<Vec<_>>(), vec![second.id, first.id]);

        let revoked = list_keys(&store, Some(KeyStatus::Revoked)).await.unwrap();
        assert_eq!(revoked.len(), 1);
        assert_eq!(revoked[0].id, first.id);

        delete_key(&store, &clock, first.id).await.unwrap();
        assert!(matches!(
            delete_key(&store, &clock, first.id).await.unwrap_err(),
            AppError::KeyNotFound
        ));
        assert_eq!(list_keys(&store, None).await.unwrap().len(), 1);

        let actions: Vec<String> = store
            .audit_log
            .lock()
            .await
            .iter()
            .map(|e| e.action.clone())
            .collect();
        assert_eq!(actions, ["add_key", "add_key", "revoke_key", "delete_key"]);
    }
}
