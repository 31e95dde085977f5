//! Admin audit trail.
//!
//! Audit entries are written after the primary mutation has already been
//! stored. The two writes are not transactional: when the audit insert fails
//! the mutation stands and the failure is only logged.

use serde_json::Value;

use crate::{
    clock::Clock,
    error::AppError,
    models::audit::{AuditAction, AuditEntry, NewAuditEntry},
    store::Store,
};

/// Append an audit entry, logging instead of failing.
pub async fn record(store: &dyn Store, clock: &dyn Clock, action: AuditAction, details: Value) {
    let entry = NewAuditEntry {
        action,
        details,
        created_at: clock.now(),
    };

    if let Err(e) = store.insert_audit_entry(entry).await {
        tracing::warn!(action = action.as_str(), error = %e, "failed to write audit entry");
    }
}

/// Most recent audit entries, newest first.
pub async fn recent(store: &dyn Store, limit: i64) -> Result<Vec<AuditEntry>, AppError> {
    if limit <= 0 {
        return Err(AppError::InvalidRequest(
            "Limit must be positive".to_string(),
        ));
    }
    store.list_audit_entries(limit).await
}
