//! HTTP router assembly.

use axum::{
    Router,
    http::{
        HeaderName,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    middleware as axum_middleware,
    routing::{get, patch, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{handlers, middleware, state::AppState};

/// Permissive CORS: the member pages are served from another origin.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers([
            AUTHORIZATION,
            CONTENT_TYPE,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
        ])
}

/// Build the full application router.
pub fn router(state: AppState) -> Router {
    use handlers::{access, admin, applications, health};

    // Admin console, gated by the shared admin secret
    let admin_routes = Router::new()
        .route(
            "/api/v1/admin/keys",
            get(admin::list_keys).post(admin::create_key),
        )
        .route(
            "/api/v1/admin/keys/{id}",
            patch(admin::update_key).delete(admin::delete_key),
        )
        .route("/api/v1/admin/keys/{id}/revoke", post(admin::revoke_key))
        .route("/api/v1/admin/messages", post(admin::send_message))
        .route("/api/v1/admin/applications", get(admin::list_applications))
        .route(
            "/api/v1/admin/applications/{id}/approve",
            post(admin::approve_application),
        )
        .route(
            "/api/v1/admin/applications/{id}/deny",
            post(admin::deny_application),
        )
        .route("/api/v1/admin/audit-log", get(admin::list_audit_log))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::admin_auth_middleware,
        ));

    Router::new()
        .route("/health", get(health::health_check))
        // Access endpoints
        .route(
            "/validate-key",
            post(access::validate_key).options(access::preflight),
        )
        .route(
            "/validate-admin-key",
            post(access::validate_admin_key).options(access::preflight),
        )
        .route(
            "/get-messages",
            post(access::get_messages).options(access::preflight),
        )
        // Public application form
        .route(
            "/api/v1/applications",
            post(applications::submit_application),
        )
        .merge(admin_routes)
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
