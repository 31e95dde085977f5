//! PostgreSQL implementation of [`Store`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::Store;
use crate::db::DbPool;
use crate::error::AppError;
use crate::models::{
    access_key::{AccessKey, AccessKeyUpdate, KeyStatus, NewAccessKey},
    application::{Application, ApplicationStatus, NewApplication},
    audit::{AuditEntry, NewAuditEntry},
    message::{Message, NewMessage},
};

const KEY_COLUMNS: &str =
    "id, access_key, assigned_user_name, role, status, date_issued, last_login";

const APPLICATION_COLUMNS: &str = "id, full_name, gender, age, country, state, city, address, \
     occupation, monthly_income, marital_status, parent_name, phone, email, purpose, agent_id, \
     photo_url, status, created_at";

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    fn backend_tag(&self) -> &'static str {
        "postgres"
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn find_access_key(&self, access_key: &str) -> Result<Option<AccessKey>, AppError> {
        let key = sqlx::query_as::<_, AccessKey>(&format!(
            "SELECT {KEY_COLUMNS} FROM access_keys WHERE access_key = $1"
        ))
        .bind(access_key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(key)
    }

    async fn get_access_key(&self, id: Uuid) -> Result<Option<AccessKey>, AppError> {
        let key = sqlx::query_as::<_, AccessKey>(&format!(
            "SELECT {KEY_COLUMNS} FROM access_keys WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(key)
    }

    async fn insert_access_key(&self, key: NewAccessKey) -> Result<Option<AccessKey>, AppError> {
        // A colliding code yields no row rather than a unique-violation error
        let inserted = sqlx::query_as::<_, AccessKey>(&format!(
            r#"
            INSERT INTO access_keys (access_key, assigned_user_name, role, status, date_issued)
            VALUES ($1, $2, $3, 'active', $4)
            ON CONFLICT (access_key) DO NOTHING
            RETURNING {KEY_COLUMNS}
            "#
        ))
        .bind(&key.access_key)
        .bind(&key.assigned_user_name)
        .bind(key.role)
        .bind(key.date_issued)
        .fetch_optional(&self.pool)
        .await?;

        Ok(inserted)
    }

    async fn list_access_keys(
        &self,
        status: Option<KeyStatus>,
    ) -> Result<Vec<AccessKey>, AppError> {
        let keys = sqlx::query_as::<_, AccessKey>(&format!(
            r#"
            SELECT {KEY_COLUMNS}
            FROM access_keys
            WHERE ($1::key_status IS NULL OR status = $1)
            ORDER BY date_issued DESC
            "#
        ))
        .bind(status)
        .fetch_all(&self.pool)
        .await?;

        Ok(keys)
    }

    async fn update_access_key(
        &self,
        id: Uuid,
        update: &AccessKeyUpdate,
    ) -> Result<Option<AccessKey>, AppError> {
        let key = sqlx::query_as::<_, AccessKey>(&format!(
            r#"
            UPDATE access_keys
            SET assigned_user_name = COALESCE($2, assigned_user_name),
                role = COALESCE($3, role),
                status = COALESCE($4, status)
            WHERE id = $1
            RETURNING {KEY_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(update.assigned_user_name.as_deref())
        .bind(update.role)
        .bind(update.status)
        .fetch_optional(&self.pool)
        .await?;

        Ok(key)
    }

    async fn record_login(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), AppError> {
        sqlx::query("UPDATE access_keys SET last_login = $1 WHERE id = $2")
            .bind(at)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete_access_key(&self, id: Uuid) -> Result<Option<AccessKey>, AppError> {
        let deleted = sqlx::query_as::<_, AccessKey>(&format!(
            "DELETE FROM access_keys WHERE id = $1 RETURNING {KEY_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(deleted)
    }

    async fn insert_message(&self, message: NewMessage) -> Result<Message, AppError> {
        let message = sqlx::query_as::<_, Message>(
            r#"
            INSERT INTO messages (target_key, title, body, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, target_key, title, body, created_at
            "#,
        )
        .bind(message.target_key)
        .bind(message.title)
        .bind(message.body)
        .bind(message.created_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(message)
    }

    async fn visible_messages(
        &self,
        access_key: &str,
        limit: i64,
    ) -> Result<Vec<Message>, AppError> {
        let messages = sqlx::query_as::<_, Message>(
            r#"
            SELECT id, target_key, title, body, created_at
            FROM messages
            WHERE target_key IS NULL OR target_key = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(access_key)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(messages)
    }

    async fn insert_application(
        &self,
        application: NewApplication,
    ) -> Result<Application, AppError> {
        let form = application.form;
        let inserted = sqlx::query_as::<_, Application>(&format!(
            r#"
            INSERT INTO applications (
                full_name, gender, age, country, state, city, address, occupation,
                monthly_income, marital_status, parent_name, phone, email, purpose,
                agent_id, photo_url, status, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, 'pending', $17)
            RETURNING {APPLICATION_COLUMNS}
            "#
        ))
        .bind(form.full_name)
        .bind(form.gender)
        .bind(form.age)
        .bind(form.country)
        .bind(form.state)
        .bind(form.city)
        .bind(form.address)
        .bind(form.occupation)
        .bind(form.monthly_income)
        .bind(form.marital_status)
        .bind(form.parent_name)
        .bind(form.phone)
        .bind(form.email)
        .bind(form.purpose)
        .bind(form.agent_id)
        .bind(form.photo_url)
        .bind(application.created_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(inserted)
    }

    async fn list_applications(
        &self,
        status: Option<ApplicationStatus>,
    ) -> Result<Vec<Application>, AppError> {
        let applications = sqlx::query_as::<_, Application>(&format!(
            r#"
            SELECT {APPLICATION_COLUMNS}
            FROM applications
            WHERE ($1::application_status IS NULL OR status = $1)
            ORDER BY created_at DESC
            "#
        ))
        .bind(status)
        .fetch_all(&self.pool)
        .await?;

        Ok(applications)
    }

    async fn set_application_status(
        &self,
        id: Uuid,
        status: ApplicationStatus,
    ) -> Result<Option<Application>, AppError> {
        let application = sqlx::query_as::<_, Application>(&format!(
            "UPDATE applications SET status = $2 WHERE id = $1 RETURNING {APPLICATION_COLUMNS}"
        ))
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?;

        Ok(application)
    }

    async fn insert_audit_entry(&self, entry: NewAuditEntry) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO admin_audit_log (admin_id, action, details, created_at) VALUES (NULL, $1, $2, $3)",
        )
        .bind(entry.action.as_str())
        .bind(entry.details)
        .bind(entry.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_audit_entries(&self, limit: i64) -> Result<Vec<AuditEntry>, AppError> {
        let entries = sqlx::query_as::<_, AuditEntry>(
            r#"
            SELECT id, action, details, created_at
            FROM admin_audit_log
            ORDER BY created_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }
}
