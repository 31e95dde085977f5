//! PostgreSQL pool, migrations and storage backend selection.

use std::sync::Arc;

use sqlx::{Pool, Postgres};

use crate::store::{MemoryStore, PgStore, Store};

pub type DbPool = Pool<Postgres>;

/// At most 5 connections, opened lazily.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await
}

/// Apply `migrations/` (access_keys, messages, applications, admin_audit_log,
/// user_roles). Already-applied files are skipped.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Pick the backend for this process.
///
/// With a database URL the pool is opened and migrated before use. Without
/// one, keys and messages live in process memory and vanish on restart.
pub async fn open_store(database_url: Option<&str>) -> Result<Arc<dyn Store>, sqlx::Error> {
    let Some(database_url) = database_url else {
        tracing::warn!("DATABASE_URL not set, keeping all data in memory");
        return Ok(Arc::new(MemoryStore::new()));
    };

    let pool = create_pool(database_url).await?;
    tracing::info!("Database pool created");

    run_migrations(&pool).await?;
    tracing::info!("Database migrations complete");

    Ok(Arc::new(PgStore::new(pool)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn no_url_falls_back_to_memory() {
        let store = open_store(None).await.unwrap();
        assert_eq!(store.backend_tag(), "memory");
        store.ping().await.unwrap();
    }
}
