//! Member-side portal: access gate, admin login and dashboard.
//!
//! [`Portal`] plays the part of the browser. It checks codes locally,
//! asks the server to validate them, keeps the resulting session in a
//! [`SessionContext`] and decides whether the dashboard can be shown or
//! the member must be sent back to the access gate.

pub mod client;
pub mod session;

use std::sync::Arc;

pub use client::{PortalClient, PortalError};
pub use session::{Session, SessionContext};

use crate::clock::Clock;
use crate::models::access_key::Role;
use crate::models::message::MessageResponse;

/// Where logged-out and timed-out members are sent.
pub const ACCESS_GATE_PATH: &str = "/access";
pub const ADMIN_LOGIN_PATH: &str = "/admin-login";
pub const ADMIN_CONSOLE_PATH: &str = "/admin";

pub const MIN_CODE_LENGTH: usize = 8;
pub const MAX_CODE_LENGTH: usize = 20;

/// What the dashboard renders for a live session.
#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    pub user_name: String,
    pub role: Role,
    pub role_label: &'static str,
    pub messages: Vec<MessageResponse>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DashboardView {
    Ready(Dashboard),
    Redirect(&'static str),
}

pub struct Portal {
    client: PortalClient,
    session: SessionContext,
}

impl Portal {
    pub fn new(client: PortalClient, clock: Arc<dyn Clock>) -> Self {
        Self {
            client,
            session: SessionContext::new(clock),
        }
    }

    pub fn with_session(client: PortalClient, session: SessionContext) -> Self {
        Self { client, session }
    }

    pub fn session(&mut self) -> &mut SessionContext {
        &mut self.session
    }

    /// Submit a code at the access gate.
    ///
    /// Blank codes and codes outside 8-20 characters never reach the server.
    pub async fn enter(&mut self, code: &str) -> Result<&Session, PortalError> {
        let code = code.trim();
        if code.is_empty() {
            return Err(PortalError::InputValidation(
                "Access Key Required.".to_string(),
            ));
        }
        let length = code.chars().count();
        if !(MIN_CODE_LENGTH..=MAX_CODE_LENGTH).contains(&length) {
            return Err(PortalError::InputValidation(format!(
                "Access Code must be between {} and {} characters.",
                MIN_CODE_LENGTH, MAX_CODE_LENGTH
            )));
        }

        let identity = self.client.validate_key(code).await?;
        tracing::info!(user = %identity.user_name, role = identity.role.label(), "Member entered");

        Ok(self.session.login(identity))
    }

    /// Check the admin secret and, on success, return the console path.
    pub async fn admin_login(&mut self, secret: &str) -> Result<&'static str, PortalError> {
        if secret.trim().is_empty() {
            return Err(PortalError::InputValidation(
                "Admin Key Required.".to_string(),
            ));
        }

        self.client.validate_admin_key(secret).await?;
        self.session.set_admin_authenticated(true);

        Ok(ADMIN_CONSOLE_PATH)
    }

    /// Admin console guard: where to go if the console may not be shown.
    pub fn admin_console(&self) -> Option<&'static str> {
        if self.session.is_admin_authenticated() {
            None
        } else {
            Some(ADMIN_LOGIN_PATH)
        }
    }

    pub fn admin_logout(&mut self) {
        self.session.set_admin_authenticated(false);
    }

    /// Mouse or keyboard activity on any member page.
    pub fn record_activity(&mut self) -> bool {
        self.session.record_activity()
    }

    pub async fn dashboard(&mut self) -> Result<DashboardView, PortalError> {
        let Some(session) = self.session.current() else {
            return Ok(DashboardView::Redirect(ACCESS_GATE_PATH));
        };
        let (code, user_name, role) = (session.code.clone(), session.user_name.clone(), session.role);

        let messages = self.client.fetch_messages(&code).await?;

        Ok(DashboardView::Ready(Dashboard {
            user_name,
            role,
            role_label: role.label(),
            messages,
        }))
    }

    /// Clear the member session and return to the access gate.
    pub fn logout(&mut self) -> &'static str {
        self.session.logout();
        ACCESS_GATE_PATH
    }
}
