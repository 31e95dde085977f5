//! HTTP client for the three public access endpoints.

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use thiserror::Error;
use url::Url;

use crate::models::access_key::{ValidateKeyResponse, ValidatedKey};
use crate::models::message::{MessageResponse, MessagesResponse};

/// Errors a member or admin can see in the portal.
#[derive(Debug, Error)]
pub enum PortalError {
    /// Rejected before or by the server because the input is unusable (400)
    #[error("{0}")]
    InputValidation(String),

    /// The server refused the code or secret (401/403)
    #[error("{0}")]
    Denied(String),

    /// Any 5xx or unexpected response
    #[error("Server error. Please try again.")]
    Server,

    #[error("Connection error. Please check your network and try again.")]
    Connection(#[source] reqwest::Error),

    #[error("Invalid portal base URL: {0}")]
    BaseUrl(#[from] url::ParseError),
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: String,
}

#[derive(Serialize)]
struct AccessKeyBody<'a> {
    access_key: &'a str,
}

#[derive(Serialize)]
struct AdminKeyBody<'a> {
    admin_key: &'a str,
}

/// Talks to a running access gate server.
#[derive(Debug, Clone)]
pub struct PortalClient {
    http: reqwest::Client,
    base_url: Url,
}

impl PortalClient {
    pub fn new(base_url: &str) -> Result<Self, PortalError> {
        let mut base_url = Url::parse(base_url)?;
        // Url::join drops the last segment unless the path ends with '/'
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .map_err(PortalError::Connection)?;

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `POST /validate-key`
    pub async fn validate_key(&self, code: &str) -> Result<ValidatedKey, PortalError> {
        let response: ValidateKeyResponse = self
            .post("validate-key", &AccessKeyBody { access_key: code })
            .await?;
        Ok(response.identity)
    }

    /// `POST /validate-admin-key`
    pub async fn validate_admin_key(&self, secret: &str) -> Result<(), PortalError> {
        let _: serde_json::Value = self
            .post("validate-admin-key", &AdminKeyBody { admin_key: secret })
            .await?;
        Ok(())
    }

    /// `POST /get-messages`, newest first.
    pub async fn fetch_messages(&self, code: &str) -> Result<Vec<MessageResponse>, PortalError> {
        let response: MessagesResponse = self
            .post("get-messages", &AccessKeyBody { access_key: code })
            .await?;
        Ok(response.messages)
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, PortalError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.base_url.join(path)?;

        let response = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(PortalError::Connection)?;

        let status = response.status();
        if status.is_success() {
            return response.json::<T>().await.map_err(|e| {
                tracing::error!(%status, "Unreadable response from {}: {}", path, e);
                PortalError::Server
            });
        }

        let message = response
            .json::<ErrorBody>()
            .await
            .map(|body| body.error)
            .unwrap_or_default();

        match status.as_u16() {
            400 => Err(PortalError::InputValidation(message)),
            401 | 403 => Err(PortalError::Denied(message)),
            _ => {
                tracing::error!(%status, "Request to {} failed: {}", path, message);
                Err(PortalError::Server)
            }
        }
    }
}
