//! HTTP middleware components.

/// Admin secret authentication middleware
pub mod auth;
