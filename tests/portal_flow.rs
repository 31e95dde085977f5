//! Drives the member portal against a live server on a loopback port.

use std::sync::Arc;

use access_gate_server::{
    clock::ManualClock,
    config::Config,
    portal::{ACCESS_GATE_PATH, ADMIN_CONSOLE_PATH, DashboardView, Portal, PortalClient, PortalError},
    routes,
    state::AppState,
    store::MemoryStore,
};
use chrono::{Duration, TimeZone, Utc};
use serde_json::{Value, json};

const ADMIN_SECRET: &str = "portal-flow-admin-secret";

struct TestServer {
    base_url: String,
    clock: ManualClock,
    http: reqwest::Client,
}

impl TestServer {
    async fn start() -> Self {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2025, 7, 1, 20, 0, 0).unwrap());
        let state = AppState::new(
            Arc::new(MemoryStore::new()),
            Config::with_admin_key(ADMIN_SECRET),
        )
        .with_clock(Arc::new(clock.clone()));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, routes::router(state)).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            clock,
            http: reqwest::Client::new(),
        }
    }

    fn portal(&self) -> Portal {
        Portal::new(
            PortalClient::new(&self.base_url).unwrap(),
            Arc::new(self.clock.clone()),
        )
    }

    async fn admin_post(&self, path: &str, body: Value) -> Value {
        let response = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .bearer_auth(ADMIN_SECRET)
            .json(&body)
            .send()
            .await
            .unwrap();
        assert!(response.status().is_success(), "{path}: {}", response.status());
        response.json().await.unwrap()
    }

    async fn issue_key(&self, name: &str, role: &str) -> String {
        let key = self
            .admin_post(
                "/api/v1/admin/keys",
                json!({ "assigned_user_name": name, "role": role }),
            )
            .await;
        key["access_key"].as_str().unwrap().to_string()
    }
}

#[tokio::test]
async fn unknown_code_is_denied() {
    let server = TestServer::start().await;
    let mut portal = server.portal();

    let err = portal.enter("TESTCODE123").await.unwrap_err();

    assert!(
        matches!(&err, PortalError::Denied(msg) if msg == "Invalid Key. Access Denied."),
        "{err:?}"
    );
    assert_eq!(
        portal.dashboard().await.unwrap(),
        DashboardView::Redirect(ACCESS_GATE_PATH)
    );
}

#[tokio::test]
async fn agent_sees_dashboard_until_idle_timeout() {
    let server = TestServer::start().await;
    let code = server.issue_key("Jane Doe", "agent").await;
    server
        .admin_post(
            "/api/v1/admin/messages",
            json!({ "title": "Gathering", "body": "Friday at nine." }),
        )
        .await;

    let mut portal = server.portal();
    let session = portal.enter(&format!("  {code} ")).await.unwrap();
    assert_eq!(session.code, code);

    let DashboardView::Ready(dashboard) = portal.dashboard().await.unwrap() else {
        panic!("expected dashboard");
    };
    assert_eq!(dashboard.user_name, "Jane Doe");
    assert_eq!(dashboard.role_label, "Agent");
    assert_eq!(dashboard.messages.len(), 1);
    assert_eq!(dashboard.messages[0].title, "Gathering");

    server.clock.advance(Duration::minutes(10));
    assert!(portal.record_activity());
    server.clock.advance(Duration::minutes(10));
    assert!(matches!(
        portal.dashboard().await.unwrap(),
        DashboardView::Ready(_)
    ));

    server.clock.advance(Duration::minutes(15));
    assert_eq!(
        portal.dashboard().await.unwrap(),
        DashboardView::Redirect(ACCESS_GATE_PATH)
    );
}

#[tokio::test]
async fn layperson_label_and_logout() {
    let server = TestServer::start().await;
    let code = server.issue_key("John Roe", "layperson").await;

    let mut portal = server.portal();
    portal.enter(&code).await.unwrap();

    let DashboardView::Ready(dashboard) = portal.dashboard().await.unwrap() else {
        panic!("expected dashboard");
    };
    assert_eq!(dashboard.role_label, "Layperson");
    assert!(dashboard.messages.is_empty());

    assert_eq!(portal.logout(), ACCESS_GATE_PATH);
    assert!(portal.session().storage_entries().is_empty());
    assert_eq!(
        portal.dashboard().await.unwrap(),
        DashboardView::Redirect(ACCESS_GATE_PATH)
    );
}

#[tokio::test]
async fn revoked_code_cannot_enter() {
    let server = TestServer::start().await;
    let code = server.issue_key("Jane Doe", "agent").await;

    let keys: Value = server
        .http
        .get(format!("{}/api/v1/admin/keys", server.base_url))
        .bearer_auth(ADMIN_SECRET)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let id = keys[0]["id"].as_str().unwrap().to_string();
    server
        .admin_post(&format!("/api/v1/admin/keys/{id}/revoke"), json!({}))
        .await;

    let err = server.portal().enter(&code).await.unwrap_err();
    assert!(
        matches!(&err, PortalError::Denied(msg) if msg == "Access Revoked. Contact Administration."),
        "{err:?}"
    );
}

#[tokio::test]
async fn admin_login_with_secret() {
    let server = TestServer::start().await;
    let mut portal = server.portal();

    let err = portal.admin_login("wrong-secret").await.unwrap_err();
    assert!(matches!(err, PortalError::Denied(_)));
    assert!(portal.admin_console().is_some());

    assert_eq!(portal.admin_login(ADMIN_SECRET).await.unwrap(), ADMIN_CONSOLE_PATH);
    assert_eq!(portal.admin_console(), None);

    portal.admin_logout();
    assert!(portal.admin_console().is_some());
}
