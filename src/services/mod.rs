//! Business logic services.
//!
//! Services contain the rules of the access gate separated from HTTP
//! handlers. They only talk to storage through the `Store` trait.

pub mod access_service;
pub mod application_service;
pub mod audit_service;
pub mod key_service;
pub mod message_service;
