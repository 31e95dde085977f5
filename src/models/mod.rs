//! Data models representing database entities.
//!
//! This module contains all data structures that map to database tables,
//! plus the JSON request/response bodies built from them.

use serde::{Deserialize, Deserializer};

/// Access keys and the validation request/response types
pub mod access_key;
/// Membership applications
pub mod application;
/// Admin audit trail
pub mod audit;
/// Broadcast and targeted member notices
pub mod message;

/// Deserialize a field that should be a string, treating anything else as absent.
pub(crate) fn string_or_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        _ => None,
    })
}
