//! Member notices ("silent communications").
//!
//! A message is either a broadcast (`target_key` is NULL) or addressed to a
//! single access key. Messages are immutable once created.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize)]
pub struct Message {
    pub id: Uuid,

    /// Access code this message is addressed to, `None` for a broadcast
    pub target_key: Option<String>,

    pub title: String,

    pub body: String,

    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Whether a holder of `access_key` may read this message.
    pub fn is_visible_to(&self, access_key: &str) -> bool {
        match &self.target_key {
            None => true,
            Some(target) => target == access_key,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewMessage {
    pub target_key: Option<String>,
    pub title: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// Request body for `POST /api/v1/admin/messages`.
///
/// # JSON Example
///
/// ```json
/// { "target_key": null, "title": "Assembly", "body": "The circle meets at dusk." }
/// ```
///
/// A missing or null `target_key` sends a broadcast.
#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    #[serde(default)]
    pub target_key: Option<String>,
    pub title: String,
    pub body: String,
}

/// Message as exposed to members (the target is never echoed back).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub id: Uuid,
    pub title: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl From<Message> for MessageResponse {
    fn from(message: Message) -> Self {
        Self {
            id: message.id,
            title: message.title,
            body: message.body,
            created_at: message.created_at,
        }
    }
}

/// Response body for `POST /get-messages`.
#[derive(Debug, Serialize, Deserialize)]
pub struct MessagesResponse {
    pub messages: Vec<MessageResponse>,
}
