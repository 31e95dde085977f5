//! Member session held by the client.
//!
//! ```text
//! LoggedOut --login--> Active --15 min without activity--> LoggedOut
//!                        |  ^
//!                        +--+ activity resets the idle timer
//! ```
//!
//! Expiry is advisory and client-side only. The server keeps no session
//! table, so revoking a key does not end a session that is already active.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use crate::clock::Clock;
use crate::models::access_key::{Role, ValidatedKey};

/// Minutes of inactivity after which a session ends.
pub const IDLE_TIMEOUT_MINUTES: i64 = 15;

/// Client storage key for the access code.
pub const STORAGE_ACCESS_KEY: &str = "ie_access_key";
pub const STORAGE_ROLE: &str = "ie_role";
pub const STORAGE_USER_NAME: &str = "ie_user_name";
pub const STORAGE_LAST_ACTIVITY: &str = "ie_last_activity";
pub const STORAGE_ADMIN_AUTHENTICATED: &str = "ie_admin_authenticated";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub code: String,
    pub role: Role,
    pub user_name: String,
    pub last_activity: DateTime<Utc>,
}

/// Everything the client remembers between page views.
pub struct SessionContext {
    clock: Arc<dyn Clock>,
    idle_timeout: Duration,
    session: Option<Session>,
    admin_authenticated: bool,
}

impl SessionContext {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            idle_timeout: Duration::minutes(IDLE_TIMEOUT_MINUTES),
            session: None,
            admin_authenticated: false,
        }
    }

    pub fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    /// Start a session for a freshly validated key, replacing any previous one.
    pub fn login(&mut self, identity: ValidatedKey) -> &Session {
        self.session.insert(Session {
            code: identity.key,
            role: identity.role,
            user_name: identity.user_name,
            last_activity: self.clock.now(),
        })
    }

    /// Record a mouse move or key press.
    ///
    /// Returns `false` when there was no live session to refresh.
    pub fn record_activity(&mut self) -> bool {
        self.expire_if_idle();
        let now = self.clock.now();
        match self.session.as_mut() {
            Some(session) => {
                session.last_activity = now;
                true
            }
            None => false,
        }
    }

    /// The live session, if any. An idle session is cleared on access.
    pub fn current(&mut self) -> Option<&Session> {
        self.expire_if_idle();
        self.session.as_ref()
    }

    pub fn is_active(&mut self) -> bool {
        self.current().is_some()
    }

    /// End the member session. The admin flag is left alone.
    pub fn logout(&mut self) {
        self.session = None;
    }

    pub fn set_admin_authenticated(&mut self, authenticated: bool) {
        self.admin_authenticated = authenticated;
    }

    pub fn is_admin_authenticated(&self) -> bool {
        self.admin_authenticated
    }

    /// The key/value pairs a browser would keep in tab-scoped storage.
    pub fn storage_entries(&mut self) -> Vec<(&'static str, String)> {
        let admin = self.admin_authenticated;
        let mut entries = Vec::new();
        if let Some(session) = self.current() {
            entries.push((STORAGE_ACCESS_KEY, session.code.clone()));
            entries.push((
                STORAGE_ROLE,
                match session.role {
                    Role::Layperson => "layperson".to_string(),
                    Role::Agent => "agent".to_string(),
                },
            ));
            entries.push((STORAGE_USER_NAME, session.user_name.clone()));
            entries.push((
                STORAGE_LAST_ACTIVITY,
                session.last_activity.timestamp_millis().to_string(),
            ));
        }
        if admin {
            entries.push((STORAGE_ADMIN_AUTHENTICATED, "true".to_string()));
        }
        entries
    }

    fn expire_if_idle(&mut self) {
        let now = self.clock.now();
        if let Some(session) = &self.session {
            if now - session.last_activity >= self.idle_timeout {
                tracing::debug!(user = %session.user_name, "member session timed out");
                self.session = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use chrono::TimeZone;

    fn context() -> (SessionContext, ManualClock) {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2025, 7, 1, 20, 0, 0).unwrap());
        (SessionContext::new(Arc::new(clock.clone())), clock)
    }

    fn identity() -> ValidatedKey {
        ValidatedKey {
            key: "AGENT2345XYZ".to_string(),
            role: Role::Agent,
            user_name: "Jane Doe".to_string(),
        }
    }

    #[test]
    fn starts_logged_out() {
        let (mut session, _) = context();
        assert!(!session.is_active());
        assert!(!session.record_activity());
        assert!(session.storage_entries().is_empty());
    }

    #[test]
    fn expires_after_fifteen_idle_minutes() {
        let (mut session, clock) = context();
        session.login(identity());

        clock.advance(Duration::minutes(14) + Duration::seconds(59));
        assert!(session.is_active());

        clock.advance(Duration::seconds(1));
        assert!(!session.is_active());
        assert!(session.current().is_none());
    }

    #[test]
    fn activity_resets_the_idle_timer() {
        let (mut session, clock) = context();
        session.login(identity());

        for _ in 0..4 {
            clock.advance(Duration::minutes(10));
            assert!(session.record_activity());
        }
        clock.advance(Duration::minutes(14));
        assert!(session.is_active());

        clock.advance(Duration::minutes(1));
        assert!(!session.is_active());
    }

    #[test]
    fn activity_after_expiry_does_not_revive() {
        let (mut session, clock) = context();
        session.login(identity());

        clock.advance(Duration::minutes(20));
        assert!(!session.record_activity());
        assert!(!session.is_active());
    }

    #[test]
    fn logout_clears_session_fields() {
        let (mut session, _) = context();
        session.login(identity());
        session.set_admin_authenticated(true);

        session.logout();

        assert!(!session.is_active());
        assert_eq!(
            session.storage_entries(),
            vec![(STORAGE_ADMIN_AUTHENTICATED, "true".to_string())]
        );
    }

    #[test]
    fn storage_entries_reflect_session() {
        let (mut session, clock) = context();
        session.login(identity());

        let entries = session.storage_entries();
        assert_eq!(entries[0], (STORAGE_ACCESS_KEY, "AGENT2345XYZ".to_string()));
        assert_eq!(entries[1], (STORAGE_ROLE, "agent".to_string()));
        assert_eq!(entries[2], (STORAGE_USER_NAME, "Jane Doe".to_string()));
        assert_eq!(
            entries[3],
            (STORAGE_LAST_ACTIVITY, clock.now().timestamp_millis().to_string())
        );
    }

    #[test]
    fn custom_timeout() {
        let (session, clock) = context();
        let mut session = session.with_idle_timeout(Duration::minutes(1));
        session.login(identity());

        clock.advance(Duration::minutes(1));
        assert!(!session.is_active());
    }
}
