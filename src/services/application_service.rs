//! Membership applications: public submission and admin review.

use serde_json::json;
use uuid::Uuid;

use crate::{
    clock::Clock,
    error::AppError,
    models::{
        application::{Application, ApplicationStatus, NewApplication, SubmitApplicationRequest},
        audit::AuditAction,
    },
    services::audit_service,
    store::Store,
};

/// Minimum applicant age.
pub const MINIMUM_AGE: i32 = 18;

/// Outcome of an admin review.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Deny,
}

impl Decision {
    fn status(self) -> ApplicationStatus {
        match self {
            Decision::Approve => ApplicationStatus::Approved,
            Decision::Deny => ApplicationStatus::Denied,
        }
    }

    fn audit_action(self) -> AuditAction {
        match self {
            Decision::Approve => AuditAction::ApproveApplication,
            Decision::Deny => AuditAction::DenyApplication,
        }
    }
}

/// Blank optional text fields are stored as NULL.
fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Check and normalise a submitted form.
///
/// # Rules
///
/// - `full_name` and `agent_id` must not be blank
/// - `age` must be at least 18
/// - `monthly_income` must not be negative
/// - `email`, when given, must contain `@`
/// - `photo_url`, when given, must be an absolute http or https URL
pub fn validate_form(
    mut form: SubmitApplicationRequest,
) -> Result<SubmitApplicationRequest, AppError> {
    form.full_name = form.full_name.trim().to_string();
    if form.full_name.is_empty() {
        return Err(AppError::InvalidRequest("Full name is required.".to_string()));
    }

    if form.age < MINIMUM_AGE {
        return Err(AppError::InvalidRequest(
            "You must be at least 18 years of age.".to_string(),
        ));
    }

    form.agent_id = form.agent_id.trim().to_string();
    if form.agent_id.is_empty() {
        return Err(AppError::InvalidRequest("Agent ID is required.".to_string()));
    }

    if form.monthly_income.is_some_and(|income| income < 0) {
        return Err(AppError::InvalidRequest(
            "Monthly income cannot be negative.".to_string(),
        ));
    }

    form.country = blank_to_none(form.country);
    form.state = blank_to_none(form.state);
    form.city = blank_to_none(form.city);
    form.address = blank_to_none(form.address);
    form.occupation = blank_to_none(form.occupation);
    form.parent_name = blank_to_none(form.parent_name);
    form.phone = blank_to_none(form.phone);

    form.email = blank_to_none(form.email);
    if form.email.as_deref().is_some_and(|email| !email.contains('@')) {
        return Err(AppError::InvalidRequest(
            "Email address is not valid.".to_string(),
        ));
    }

    form.photo_url = blank_to_none(form.photo_url);
    if let Some(photo_url) = &form.photo_url {
        let parsed = url::Url::parse(photo_url)
            .map_err(|_| AppError::InvalidRequest("Photo URL is not valid.".to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(AppError::InvalidRequest(
                "Photo URL must use HTTP or HTTPS.".to_string(),
            ));
        }
    }

    Ok(form)
}

/// Store a new pending application.
pub async fn submit_application(
    store: &dyn Store,
    clock: &dyn Clock,
    form: SubmitApplicationRequest,
) -> Result<Application, AppError> {
    let form = validate_form(form)?;
    let application = store
        .insert_application(NewApplication {
            form,
            created_at: clock.now(),
        })
        .await?;

    tracing::info!(application_id = %application.id, purpose = ?application.purpose, "application received");
    Ok(application)
}

/// List applications, newest first.
pub async fn list_applications(
    store: &dyn Store,
    status: Option<ApplicationStatus>,
) -> Result<Vec<Application>, AppError> {
    store.list_applications(status).await
}

/// Approve or deny an application.
///
/// # Errors
///
/// - `ApplicationNotFound`: no application with this id
pub async fn review_application(
    store: &dyn Store,
    clock: &dyn Clock,
    id: Uuid,
    decision: Decision,
) -> Result<Application, AppError> {
    let application = store
        .set_application_status(id, decision.status())
        .await?
        .ok_or(AppError::ApplicationNotFound)?;

    audit_service::record(
        store,
        clock,
        decision.audit_action(),
        json!({
            "application_id": application.id,
            "full_name": application.full_name,
        }),
    )
    .await;

    Ok(application)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::models::application::Purpose;
    use crate::store::MemoryStore;
    use chrono::{Duration, TimeZone, Utc};

    fn form(name: &str, age: i32) -> SubmitApplicationRequest {
        SubmitApplicationRequest {
            full_name: name.to_string(),
            age,
            agent_id: "AG-1042".to_string(),
            ..Default::default()
        }
    }

    fn clock() -> ManualClock {
        ManualClock::new(Utc.with_ymd_and_hms(2025, 4, 1, 10, 0, 0).unwrap())
    }

    #[test]
    fn underage_applicants_are_rejected() {
        let err = validate_form(form("Kid", 17)).unwrap_err();
        assert_eq!(err.to_string(), "You must be at least 18 years of age.");
        assert!(validate_form(form("Adult", 18)).is_ok());
    }

    #[test]
    fn required_fields_and_formats() {
        assert!(validate_form(form("  ", 30)).is_err());

        let mut missing_agent = form("Jane", 30);
        missing_agent.agent_id = " ".to_string();
        assert!(validate_form(missing_agent).is_err());

        let mut bad_email = form("Jane", 30);
        bad_email.email = Some("jane.example.com".to_string());
        assert!(validate_form(bad_email).is_err());

        let mut bad_photo = form("Jane", 30);
        bad_photo.photo_url = Some("ftp://files.example.com/jane.jpg".to_string());
        assert!(validate_form(bad_photo).is_err());

        let mut negative_income = form("Jane", 30);
        negative_income.monthly_income = Some(-1);
        assert!(validate_form(negative_income).is_err());
    }

    #[test]
    fn blank_optional_fields_become_none() {
        let mut submitted = form(" Jane Doe ", 30);
        submitted.city = Some("  ".to_string());
        submitted.email = Some("".to_string());
        submitted.photo_url = Some("https://cdn.example.com/jane.jpg".to_string());

        let cleaned = validate_form(submitted).unwrap();
        assert_eq!(cleaned.full_name, "Jane Doe");
        assert_eq!(cleaned.city, None);
        assert_eq!(cleaned.email, None);
        assert_eq!(cleaned.purpose, Purpose::Spiritual);
        assert!(cleaned.photo_url.is_some());
    }

    #[tokio::test]
    async fn submit_then_review() {
        let store = MemoryStore::new();
        let clock = clock();

        let first = submit_application(&store, &clock, form("First", 40)).await.unwrap();
        clock.advance(Duration::minutes(1));
        let second = submit_application(&store, &clock, form("Second", 22)).await.unwrap();
        assert_eq!(first.status, ApplicationStatus::Pending);

        let approved = review_application(&store, &clock, first.id, Decision::Approve)
            .await
            .unwrap();
        assert_eq!(approved.status, ApplicationStatus::Approved);
        review_application(&store, &clock, second.id, Decision::Deny)
            .await
            .unwrap();

        let pending = list_applications(&store, Some(ApplicationStatus::Pending)).await.unwrap();
        assert!(pending.is_empty());
        let all = list_applications(&store, None).await.unwrap();
        assert_eq!(all[0].id, second.id);
        assert_eq!(all[0].status, ApplicationStatus::Denied);

        let err = review_application(&store, &clock, uuid::Uuid::new_v4(), Decision::Approve)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ApplicationNotFound));

        let actions: Vec<String> = store
            .audit_log
            .lock()
            .await
            .iter()
            .map(|e| e.action.clone())
            .collect();
        assert_eq!(actions, ["approve_application", "deny_application"]);
    }
}
