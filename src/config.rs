//! Application configuration management.
//!
//! This module handles loading configuration from environment variables.
//! It uses the `envy` crate to automatically deserialize environment variables into a type-safe struct.

use serde::Deserialize;

/// Application configuration loaded from environment variables.
///
/// # Environment Variables
///
/// - `ADMIN_KEY` (required): shared secret that unlocks the admin console
/// - `DATABASE_URL` (optional): PostgreSQL connection string. When unset the
///   server keeps everything in memory, which is only useful for local demos.
/// - `SERVER_PORT` (optional): HTTP server port, defaults to 3000
/// - `MESSAGE_LIMIT` (optional): maximum messages returned per fetch, defaults to 50
#[derive(Clone, Deserialize)]
pub struct Config {
    pub admin_key: String,

    #[serde(default)]
    pub database_url: Option<String>,

    #[serde(default = "default_port")]
    pub server_port: u16,

    #[serde(default = "default_message_limit")]
    pub message_limit: i64,
}

/// Default port if SERVER_PORT environment variable is not set.
fn default_port() -> u16 {
    3000
}

fn default_message_limit() -> i64 {
    50
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// This method first attempts to load a `.env` file (which is optional),
    /// then reads environment variables and deserializes them into a Config struct.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Required environment variables are missing (e.g., ADMIN_KEY)
    /// - Environment variable values cannot be parsed into expected types
    pub fn from_env() -> Result<Self, envy::Error> {
        // Try to load .env file if it exists (does nothing if not found)
        dotenvy::dotenv().ok();

        // Field names are automatically converted: admin_key -> ADMIN_KEY
        envy::from_env::<Config>()
    }

    /// Configuration with defaults for everything except the admin secret.
    pub fn with_admin_key(admin_key: impl Into<String>) -> Self {
        Self {
            admin_key: admin_key.into(),
            database_url: None,
            server_port: default_port(),
            message_limit: default_message_limit(),
        }
    }
}

// The admin secret and connection string stay out of logs.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("admin_key", &"<redacted>")
            .field("database_url", &self.database_url.as_ref().map(|_| "<redacted>"))
            .field("server_port", &self.server_port)
            .field("message_limit", &self.message_limit)
            .finish()
    }
}
