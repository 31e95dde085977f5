//! Access-key and admin-secret validation.
//!
//! This service handles:
//! - Member code validation (lookup, revocation check, last-login stamp)
//! - Active-key checks for endpoints that only serve current members
//! - Comparison of the shared admin secret
//!
//! There is no throttling or lockout: repeated guesses are answered as fast
//! as the store allows.

use sha2::{Digest, Sha256};

use crate::{
    clock::Clock,
    error::AppError,
    models::access_key::{AccessKey, KeyStatus, ValidatedKey},
    store::Store,
};

/// Short, non-reversible tag for an access code, safe to put in logs.
pub fn fingerprint(code: &str) -> String {
    let digest = Sha256::digest(code.as_bytes());
    hex::encode(&digest[..6])
}

/// Validate a member access code.
///
/// # Process
///
/// 1. Reject a missing or blank code
/// 2. Trim and look the code up
/// 3. Reject unknown and revoked codes
/// 4. Stamp `last_login` with the current time
///
/// # Errors
///
/// - `AccessKeyRequired`: code missing or blank
/// - `InvalidKey`: no key has this code (the caller cannot tell this apart
///   from any other denial)
/// - `Revoked`: the key exists but was revoked
/// - `Database`: store failure during lookup
pub async fn validate_access_key(
    store: &dyn Store,
    clock: &dyn Clock,
    candidate: Option<&str>,
) -> Result<ValidatedKey, AppError> {
    let code = candidate
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .ok_or(AppError::AccessKeyRequired)?;

    let key = store.find_access_key(code).await?.ok_or_else(|| {
        tracing::debug!(key = %fingerprint(code), "unknown access key");
        AppError::InvalidKey
    })?;

    if key.status == KeyStatus::Revoked {
        tracing::debug!(key = %fingerprint(code), "revoked access key presented");
        return Err(AppError::Revoked);
    }

    // The stamp is informational; a failed write does not deny entry
    if let Err(e) = store.record_login(key.id, clock.now()).await {
        tracing::warn!(key = %fingerprint(code), error = %e, "failed to record last login");
    }

    tracing::info!(key = %fingerprint(code), role = ?key.role, "access key validated");
    Ok(key.into())
}

/// Resolve a code to an active key, or fail with `Unauthorized`.
///
/// Unlike [`validate_access_key`] this does not trim, does not stamp
/// `last_login`, and collapses every failure into one error.
pub async fn require_active_key(
    store: &dyn Store,
    candidate: Option<&str>,
) -> Result<AccessKey, AppError> {
    let code = candidate
        .filter(|c| !c.is_empty())
        .ok_or(AppError::Unauthorized)?;

    match store.find_access_key(code).await? {
        Some(key) if key.is_active() => Ok(key),
        _ => Err(AppError::Unauthorized),
    }
}

/// Compare a submitted admin secret with the configured one.
///
/// The comparison is exact: no trimming, no case folding. Both sides are
/// hashed first so the time taken does not depend on how long a matching
/// prefix is.
///
/// # Errors
///
/// - `AdminKeyRequired`: secret missing or blank
/// - `InvalidKey`: secret does not match
pub fn verify_admin_key(configured: &str, candidate: Option<&str>) -> Result<(), AppError> {
    let candidate = candidate
        .filter(|c| !c.trim().is_empty())
        .ok_or(AppError::AdminKeyRequired)?;

    if Sha256::digest(candidate.as_bytes()) == Sha256::digest(configured.as_bytes()) {
        Ok(())
    } else {
        Err(AppError::InvalidKey)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::models::access_key::{AccessKeyUpdate, NewAccessKey, Role};
    use crate::store::MemoryStore;
    use chrono::{Duration, TimeZone, Utc};
    use std::sync::atomic::Ordering;

    const ADMIN_SECRET: &str = "admin_aB3$x9Qm#lZ2@pR5!kL8*jH6^vN4&tY7wEsD1~gF0";

    fn clock() -> ManualClock {
        ManualClock::new(Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap())
    }

    async fn seed(store: &MemoryStore, clock: &ManualClock, code: &str, name: &str, role: Role) -> AccessKey {
        store
            .insert_access_key(NewAccessKey {
                access_key: code.to_string(),
                assigned_user_name: name.to_string(),
                role,
                date_issued: clock.now(),
            })
            .await
            .unwrap()
            .unwrap()
    }

    #[tokio::test]
    async fn blank_code_is_required_error() {
        let store = MemoryStore::new();
        let clock = clock();

        for candidate in [None, Some(""), Some("   \t")] {
            let err = validate_access_key(&store, &clock, candidate).await.unwrap_err();
            assert!(matches!(err, AppError::AccessKeyRequired));
        }
    }

    #[tokio::test]
    async fn unknown_code_is_denied_without_touching_logins() {
        let store = MemoryStore::new();
        let clock = clock();
        let existing = seed(&store, &clock, "MEMBER2345AB", "Ada", Role::Layperson).await;

        for candidate in ["TESTCODE123", "member2345ab", "MEMBER2345A", "XXXXXXXXXXXX"] {
            let err = validate_access_key(&store, &clock, Some(candidate))
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::InvalidKey), "{candidate}");
        }

        assert_eq!(store.login_writes.load(Ordering::Relaxed), 0);
        let stored = store.get_access_key(existing.id).await.unwrap().unwrap();
        assert_eq!(stored.last_login, None);
    }

    #[tokio::test]
    async fn active_code_stamps_login_and_returns_stored_identity() {
        let store = MemoryStore::new();
        let clock = clock();
        let key = seed(&store, &clock, "AGENT2345XYZ", "Jane Doe", Role::Agent).await;

        clock.advance(Duration::hours(3));
        let identity = validate_access_key(&store, &clock, Some("  AGENT2345XYZ "))
            .await
            .unwrap();

        assert_eq!(identity.key, "AGENT2345XYZ");
        assert_eq!(identity.role, Role::Agent);
        assert_eq!(identity.user_name, "Jane Doe");

        let stored = store.get_access_key(key.id).await.unwrap().unwrap();
        assert_eq!(stored.last_login, Some(clock.now()));
        assert_eq!(stored.assigned_user_name, key.assigned_user_name);
        assert_eq!(stored.role, key.role);
    }

    #[tokio::test]
    async fn revoked_code_is_always_revoked() {
        let store = MemoryStore::new();
        let clock = clock();
        let key = seed(&store, &clock, "REVOKE2345AB", "Bo", Role::Layperson).await;

        // valid once
        validate_access_key(&store, &clock, Some("REVOKE2345AB"))
            .await
            .unwrap();
        let first_login = store.get_access_key(key.id).await.unwrap().unwrap().last_login;

        store
            .update_access_key(
                key.id,
                &AccessKeyUpdate {
                    status: Some(KeyStatus::Revoked),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        clock.advance(Duration::minutes(5));
        for _ in 0..3 {
            let err = validate_access_key(&store, &clock, Some("REVOKE2345AB"))
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::Revoked));
        }

        let stored = store.get_access_key(key.id).await.unwrap().unwrap();
        assert_eq!(stored.last_login, first_login);
    }

    #[tokio::test]
    async fn require_active_key_rejects_revoked_and_unknown() {
        let store = MemoryStore::new();
        let clock = clock();
        let key = seed(&store, &clock, "ACTIVE2345AB", "Cy", Role::Layperson).await;

        assert_eq!(
            require_active_key(&store, Some("ACTIVE2345AB")).await.unwrap().id,
            key.id
        );
        assert!(matches!(
            require_active_key(&store, Some("NOPE2345ABCD")).await.unwrap_err(),
            AppError::Unauthorized
        ));
        assert!(matches!(
            require_active_key(&store, None).await.unwrap_err(),
            AppError::Unauthorized
        ));

        store
            .update_access_key(
                key.id,
                &AccessKeyUpdate {
                    status: Some(KeyStatus::Revoked),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(matches!(
            require_active_key(&store, Some("ACTIVE2345AB")).await.unwrap_err(),
            AppError::Unauthorized
        ));
    }

    #[test]
    fn admin_secret_must_match_exactly() {
        assert!(verify_admin_key(ADMIN_SECRET, Some(ADMIN_SECRET)).is_ok());

        let upper = ADMIN_SECRET.to_uppercase();
        let padded = format!(" {ADMIN_SECRET} ");
        let trailing_newline = format!("{ADMIN_SECRET}\n");
        let truncated = &ADMIN_SECRET[..ADMIN_SECRET.len() - 1];
        let extended = format!("{ADMIN_SECRET}x");

        for candidate in [
            upper.as_str(),
            padded.as_str(),
            trailing_newline.as_str(),
            truncated,
            extended.as_str(),
        ] {
            assert!(
                matches!(verify_admin_key(ADMIN_SECRET, Some(candidate)), Err(AppError::InvalidKey)),
                "{candidate:?}"
            );
        }
    }

    #[test]
    fn blank_admin_secret_is_required_error() {
        for candidate in [None, Some(""), Some("  ")] {
            assert!(matches!(
                verify_admin_key(ADMIN_SECRET, candidate),
                Err(AppError::AdminKeyRequired)
            ));
        }
    }

    #[test]
    fn fingerprint_is_stable_and_short() {
        assert_eq!(fingerprint("ABC"), fingerprint("ABC"));
        assert_ne!(fingerprint("ABC"), fingerprint("ABD"));
        assert_eq!(fingerprint("ABC").len(), 12);
    }
}
