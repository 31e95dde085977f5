//! In-process implementation of [`Store`].
//!
//! Used by the test suite and by the server when no `DATABASE_URL` is set.
//! Nothing survives a restart.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::Store;
use crate::error::AppError;
use crate::models::{
    access_key::{AccessKey, AccessKeyUpdate, KeyStatus, NewAccessKey},
    application::{Application, ApplicationStatus, NewApplication},
    audit::{AuditEntry, NewAuditEntry},
    message::{Message, NewMessage},
};

#[derive(Default)]
pub struct MemoryStore {
    pub keys: Mutex<Vec<AccessKey>>,
    pub messages: Mutex<Vec<Message>>,
    pub applications: Mutex<Vec<Application>>,
    pub audit_log: Mutex<Vec<AuditEntry>>,
    /// Makes every audit insert fail, to exercise best-effort logging.
    pub fail_audit_writes: AtomicBool,
    /// Number of `record_login` calls seen.
    pub login_writes: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first<T>(rows: &mut [T], created_at: impl Fn(&T) -> DateTime<Utc>) {
    rows.sort_by_key(|row| std::cmp::Reverse(created_at(row)));
}

#[async_trait]
impl Store for MemoryStore {
    fn backend_tag(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }

    async fn find_access_key(&self, access_key: &str) -> Result<Option<AccessKey>, AppError> {
        let keys = self.keys.lock().await;
        Ok(keys.iter().find(|k| k.access_key == access_key).cloned())
    }

    async fn get_access_key(&self, id: Uuid) -> Result<Option<AccessKey>, AppError> {
        let keys = self.keys.lock().await;
        Ok(keys.iter().find(|k| k.id == id).cloned())
    }

    async fn insert_access_key(&self, key: NewAccessKey) -> Result<Option<AccessKey>, AppError> {
        let mut keys = self.keys.lock().await;
        if keys.iter().any(|k| k.access_key == key.access_key) {
            return Ok(None);
        }

        let record = AccessKey {
            id: Uuid::new_v4(),
            access_key: key.access_key,
            assigned_user_name: key.assigned_user_name,
            role: key.role,
            status: KeyStatus::Active,
            date_issued: key.date_issued,
            last_login: None,
        };
        keys.push(record.clone());
        Ok(Some(record))
    }

    async fn list_access_keys(
        &self,
        status: Option<KeyStatus>,
    ) -> Result<Vec<AccessKey>, AppError> {
        let keys = self.keys.lock().await;
        let mut rows: Vec<AccessKey> = keys
            .iter()
            .filter(|k| status.is_none_or(|s| k.status == s))
            .cloned()
            .collect();
        newest_first(&mut rows, |k| k.date_issued);
        Ok(rows)
    }

    async fn update_access_key(
        &self,
        id: Uuid,
        update: &AccessKeyUpdate,
    ) -> Result<Option<AccessKey>, AppError> {
        let mut keys = self.keys.lock().await;
        let Some(key) = keys.iter_mut().find(|k| k.id == id) else {
            return Ok(None);
        };

        if let Some(name) = &update.assigned_user_name {
            key.assigned_user_name = name.clone();
        }
        if let Some(role) = update.role {
            key.role = role;
        }
        if let Some(status) = update.status {
            key.status = status;
        }
        Ok(Some(key.clone()))
    }

    async fn record_login(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), AppError> {
        self.login_writes.fetch_add(1, Ordering::Relaxed);
        let mut keys = self.keys.lock().await;
        if let Some(key) = keys.iter_mut().find(|k| k.id == id) {
            key.last_login = Some(at);
        }
        Ok(())
    }

    async fn delete_access_key(&self, id: Uuid) -> Result<Option<AccessKey>, AppError> {
        let mut keys = self.keys.lock().await;
        let position = keys.iter().position(|k| k.id == id);
        Ok(position.map(|index| keys.remove(index)))
    }

    async fn insert_message(&self, message: NewMessage) -> Result<Message, AppError> {
        let record = Message {
            id: Uuid::new_v4(),
            target_key: message.target_key,
            title: message.title,
            body: message.body,
            created_at: message.created_at,
        };
        self.messages.lock().await.push(record.clone());
        Ok(record)
    }

    async fn visible_messages(
        &self,
        access_key: &str,
        limit: i64,
    ) -> Result<Vec<Message>, AppError> {
        let messages = self.messages.lock().await;
        let mut rows: Vec<Message> = messages
            .iter()
            .filter(|m| m.is_visible_to(access_key))
            .cloned()
            .collect();
        newest_first(&mut rows, |m| m.created_at);
        rows.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(rows)
    }

    async fn insert_application(
        &self,
        application: NewApplication,
    ) -> Result<Application, AppError> {
        let form = application.form;
        let record = Application {
            id: Uuid::new_v4(),
            full_name: form.full_name,
            gender: form.gender,
            age: form.age,
            country: form.country,
            state: form.state,
            city: form.city,
            address: form.address,
            occupation: form.occupation,
            monthly_income: form.monthly_income,
            marital_status: form.marital_status,
            parent_name: form.parent_name,
            phone: form.phone,
            email: form.email,
            purpose: form.purpose,
            agent_id: form.agent_id,
            photo_url: form.photo_url,
            status: ApplicationStatus::Pending,
            created_at: application.created_at,
        };
        self.applications.lock().await.push(record.clone());
        Ok(record)
    }

    async fn list_applications(
        &self,
        status: Option<ApplicationStatus>,
    ) -> Result<Vec<Application>, AppError> {
        let applications = self.applications.lock().await;
        let mut rows: Vec<Application> = applications
            .iter()
            .filter(|a| status.is_none_or(|s| a.status == s))
            .cloned()
            .collect();
        newest_first(&mut rows, |a| a.created_at);
        Ok(rows)
    }

    async fn set_application_status(
        &self,
        id: Uuid,
        status: ApplicationStatus,
    ) -> Result<Option<Application>, AppError> {
        let mut applications = self.applications.lock().await;
        Ok(applications.iter_mut().find(|a| a.id == id).map(|a| {
            a.status = status;
            a.clone()
        }))
    }

    async fn insert_audit_entry(&self, entry: NewAuditEntry) -> Result<(), AppError> {
        if self.fail_audit_writes.load(Ordering::Relaxed) {
            return Err(AppError::Internal("audit log unavailable".to_string()));
        }

        self.audit_log.lock().await.push(AuditEntry {
            id: Uuid::new_v4(),
            action: entry.action.as_str().to_string(),
            details: entry.details,
            created_at: entry.created_at,
        });
        Ok(())
    }

    async fn list_audit_entries(&self, limit: i64) -> Result<Vec<AuditEntry>, AppError> {
        let log = self.audit_log.lock().await;
        let mut rows = log.clone();
        newest_first(&mut rows, |e| e.created_at);
        rows.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(rows)
    }
}
