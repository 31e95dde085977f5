//! Persistence boundary.
//!
//! Handlers and services only talk to the [`Store`] trait. [`PgStore`] backs
//! it with PostgreSQL; [`MemoryStore`] keeps everything in process and is
//! what the tests run against.
//!
//! The store offers per-row atomicity only. Concurrent admin edits to the
//! same key are last-write-wins.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{
    access_key::{AccessKey, AccessKeyUpdate, KeyStatus, NewAccessKey},
    application::{Application, ApplicationStatus, NewApplication},
    audit::{AuditEntry, NewAuditEntry},
    message::{Message, NewMessage},
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait Store: Send + Sync {
    /// Short name for logs and the health endpoint.
    fn backend_tag(&self) -> &'static str;

    /// Check that the backend is reachable.
    async fn ping(&self) -> Result<(), AppError>;

    /// Look up a key by its code (exact match).
    async fn find_access_key(&self, access_key: &str) -> Result<Option<AccessKey>, AppError>;

    async fn get_access_key(&self, id: Uuid) -> Result<Option<AccessKey>, AppError>;

    /// Insert a key. Returns `None` when the code is already taken.
    async fn insert_access_key(&self, key: NewAccessKey) -> Result<Option<AccessKey>, AppError>;

    /// All keys, newest first, optionally filtered by status.
    async fn list_access_keys(&self, status: Option<KeyStatus>)
    -> Result<Vec<AccessKey>, AppError>;

    /// Apply a partial update. Returns `None` when no key has this id.
    async fn update_access_key(
        &self,
        id: Uuid,
        update: &AccessKeyUpdate,
    ) -> Result<Option<AccessKey>, AppError>;

    /// Stamp `last_login` on a key.
    async fn record_login(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), AppError>;

    /// Hard-delete a key. Returns the deleted row, `None` when it did not exist.
    async fn delete_access_key(&self, id: Uuid) -> Result<Option<AccessKey>, AppError>;

    async fn insert_message(&self, message: NewMessage) -> Result<Message, AppError>;

    /// Broadcasts plus messages addressed to `access_key`, newest first.
    async fn visible_messages(&self, access_key: &str, limit: i64)
    -> Result<Vec<Message>, AppError>;

    async fn insert_application(&self, application: NewApplication)
    -> Result<Application, AppError>;

    /// Applications, newest first, optionally filtered by status.
    async fn list_applications(
        &self,
        status: Option<ApplicationStatus>,
    ) -> Result<Vec<Application>, AppError>;

    /// Returns `None` when no application has this id.
    async fn set_application_status(
        &self,
        id: Uuid,
        status: ApplicationStatus,
    ) -> Result<Option<Application>, AppError>;

    async fn insert_audit_entry(&self, entry: NewAuditEntry) -> Result<(), AppError>;

    /// Most recent audit entries first.
    async fn list_audit_entries(&self, limit: i64) -> Result<Vec<AuditEntry>, AppError>;
}
