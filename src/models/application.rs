//! Membership applications submitted through the public form.
//!
//! This module defines:
//! - `Application`: Database entity for a submitted application
//! - `SubmitApplicationRequest`: Request body of the public form
//! - the enumerations used by the form fields

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "application_status", rename_all = "lowercase")]
pub enum ApplicationStatus {
    Pending,
    Approved,
    Denied,
}

/// Why the applicant is asking for entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "application_purpose", rename_all = "lowercase")]
pub enum Purpose {
    #[default]
    Spiritual,
    Fame,
    Loan,
    Financial,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "applicant_gender", rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "marital_status", rename_all = "lowercase")]
pub enum MaritalStatus {
    Single,
    Married,
    Other,
}

/// Represents an application record from the database.
///
/// # Database Table
///
/// Maps to the `applications` table. Only `status` ever changes after
/// insertion, and only through the admin console.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize)]
pub struct Application {
    pub id: Uuid,
    pub full_name: String,
    pub gender: Option<Gender>,
    pub age: i32,
    pub country: Option<String>,
    pub state: Option<String>,
    pub city: Option<String>,
    pub address: Option<String>,
    pub occupation: Option<String>,
    /// Whole US dollars per month
    pub monthly_income: Option<i64>,
    pub marital_status: Option<MaritalStatus>,
    pub parent_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub purpose: Purpose,
    /// Referral code typed by the applicant; not checked against any table
    pub agent_id: String,
    pub photo_url: Option<String>,
    pub status: ApplicationStatus,
    pub created_at: DateTime<Utc>,
}

/// Request body for `POST /api/v1/applications`.
///
/// # JSON Example
///
/// ```json
/// {
///   "full_name": "Jane Doe",
///   "age": 34,
///   "country": "Portugal",
///   "purpose": "financial",
///   "agent_id": "AG-1042",
///   "photo_url": "https://cdn.example.com/photos/jane.jpg"
/// }
/// ```
///
/// # Validation
///
/// - `full_name`, `agent_id`: required, non-blank
/// - `age`: required, at least 18
/// - `monthly_income`: optional, non-negative
/// - `email`: optional, must contain `@`
/// - `photo_url`: optional, absolute http(s) URL
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmitApplicationRequest {
    pub full_name: String,
    #[serde(default)]
    pub gender: Option<Gender>,
    pub age: i32,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub occupation: Option<String>,
    #[serde(default)]
    pub monthly_income: Option<i64>,
    #[serde(default)]
    pub marital_status: Option<MaritalStatus>,
    #[serde(default)]
    pub parent_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub purpose: Purpose,
    pub agent_id: String,
    #[serde(default)]
    pub photo_url: Option<String>,
}

/// A validated application ready to be stored.
#[derive(Debug, Clone)]
pub struct NewApplication {
    pub form: SubmitApplicationRequest,
    pub created_at: DateTime<Utc>,
}

/// Response after a successful submission.
#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitApplicationResponse {
    pub id: Uuid,
    pub status: ApplicationStatus,
}

/// Query string for listing applications: `?status=pending`.
#[derive(Debug, Default, Deserialize)]
pub struct ApplicationFilter {
    #[serde(default)]
    pub status: Option<ApplicationStatus>,
}
