//! Access key model and the request/response types built around it.
//!
//! An access key is a short shared code that lets a member into the
//! member area. Each key is bound to a role and can be revoked by an admin
//! without deleting the record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::string_or_none;

/// Access tier granted by a key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "key_role", rename_all = "lowercase")]
pub enum Role {
    #[default]
    Layperson,
    Agent,
}

impl Role {
    /// Label shown on the member dashboard.
    pub fn label(self) -> &'static str {
        match self {
            Role::Layperson => "Layperson",
            Role::Agent => "Agent",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "key_status", rename_all = "lowercase")]
pub enum KeyStatus {
    Active,
    Revoked,
}

/// Represents an access key record from the database.
///
/// # Database Table
///
/// Maps to the `access_keys` table. `access_key` is unique and between
/// 8 and 20 characters (enforced by a CHECK constraint).
#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize)]
pub struct AccessKey {
    pub id: Uuid,

    /// The code members type into the access gate
    pub access_key: String,

    pub assigned_user_name: String,

    pub role: Role,

    pub status: KeyStatus,

    pub date_issued: DateTime<Utc>,

    /// Stamped on every successful validation, `None` until the first one
    pub last_login: Option<DateTime<Utc>>,
}

impl AccessKey {
    pub fn is_active(&self) -> bool {
        self.status == KeyStatus::Active
    }
}

/// Values for a key about to be inserted.
#[derive(Debug, Clone)]
pub struct NewAccessKey {
    pub access_key: String,
    pub assigned_user_name: String,
    pub role: Role,
    pub date_issued: DateTime<Utc>,
}

/// Partial update applied by the admin edit dialog.
///
/// `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccessKeyUpdate {
    #[serde(default)]
    pub assigned_user_name: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub status: Option<KeyStatus>,
}

impl AccessKeyUpdate {
    pub fn is_empty(&self) -> bool {
        self.assigned_user_name.is_none() && self.role.is_none() && self.status.is_none()
    }
}

/// Request body for issuing a new key.
///
/// # JSON Example
///
/// ```json
/// { "assigned_user_name": "Jane Doe", "role": "agent" }
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct CreateKeyRequest {
    /// Defaults to "Unassigned" when absent or blank
    #[serde(default)]
    pub assigned_user_name: Option<String>,

    #[serde(default)]
    pub role: Role,
}

/// Query string for listing keys: `?status=active`.
#[derive(Debug, Default, Deserialize)]
pub struct KeyFilter {
    #[serde(default)]
    pub status: Option<KeyStatus>,
}

/// Request body for `POST /validate-key` and `POST /get-messages`.
///
/// A missing or non-string `access_key` deserializes to `None` so the
/// handler can answer with the proper "required" error instead of a
/// generic body rejection.
#[derive(Debug, Default, Deserialize)]
pub struct AccessKeyRequest {
    #[serde(default, deserialize_with = "string_or_none")]
    pub access_key: Option<String>,
}

/// Request body for `POST /validate-admin-key`.
#[derive(Debug, Default, Deserialize)]
pub struct AdminKeyRequest {
    #[serde(default, deserialize_with = "string_or_none")]
    pub admin_key: Option<String>,
}

/// Identity handed back after a successful validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatedKey {
    pub key: String,
    pub role: Role,
    pub user_name: String,
}

impl From<AccessKey> for ValidatedKey {
    fn from(key: AccessKey) -> Self {
        Self {
            key: key.access_key,
            role: key.role,
            user_name: key.assigned_user_name,
        }
    }
}

/// Response body for `POST /validate-key`.
///
/// ```json
/// { "success": true, "key": "ABCD2345EFGH", "role": "agent", "user_name": "Jane Doe" }
/// ```
#[derive(Debug, Serialize, Deserialize)]
pub struct ValidateKeyResponse {
    pub success: bool,
    #[serde(flatten)]
    pub identity: ValidatedKey,
}
