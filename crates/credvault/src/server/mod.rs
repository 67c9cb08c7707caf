//! Axum HTTP server, routing, and layers.
//!
//! # Responsibilities
//! - Define the Axum router with all routes and shared middleware.
//! - Inject shared application state (`AppState`) into handlers.
//! - Translate [`crate::error::CredentialError`] into JSON error bodies.

pub mod handlers;
pub mod router;
pub mod state;
