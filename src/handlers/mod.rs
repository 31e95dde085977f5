//! HTTP request handlers (route handlers).
//!
//! Each handler is an async function that:
//! 1. Receives HTTP request data (JSON body, URL params, etc.)
//! 2. Delegates to a service
//! 3. Returns HTTP response (JSON, status code)

/// Member gate, admin login and message endpoints
pub mod access;
/// Admin console endpoints
pub mod admin;
/// Public application form
pub mod applications;
pub mod health;
