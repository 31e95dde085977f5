//! Admin audit trail entries.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Mutating admin actions that leave an audit entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    AddKey,
    EditKey,
    RevokeKey,
    DeleteKey,
    SendMessage,
    ApproveApplication,
    DenyApplication,
}

impl AuditAction {
    pub fn as_str(self) -> &'static str {
        match self {
            AuditAction::AddKey => "add_key",
            AuditAction::EditKey => "edit_key",
            AuditAction::RevokeKey => "revoke_key",
            AuditAction::DeleteKey => "delete_key",
            AuditAction::SendMessage => "send_message",
            AuditAction::ApproveApplication => "approve_application",
            AuditAction::DenyApplication => "deny_application",
        }
    }
}

/// Represents a row of the `admin_audit_log` table.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize)]
pub struct AuditEntry {
    pub id: Uuid,
    pub action: String,
    pub details: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewAuditEntry {
    pub action: AuditAction,
    pub details: serde_json::Value,
    pub created_at: DateTime<Utc>,
}
