//! Access Gate - backend for an invitation-only member site.
//!
//! Members enter with an access code issued by an admin. The crate provides
//! the HTTP service that validates codes, serves member notices, accepts
//! applications and exposes the admin console API, plus the member-side
//! session handling and HTTP client.
//!
//! # Architecture
//!
//! - **Web Framework**: Axum
//! - **Storage**: PostgreSQL with sqlx, behind the [`store::Store`] trait
//! - **Admin authentication**: one shared secret from configuration
//! - **Member sessions**: held by the client, expired after inactivity

pub mod clock;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod portal;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;
