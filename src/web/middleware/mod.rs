//! Middleware for the REST API.

pub mod auth;
pub mod cors;

pub use auth::{session_auth, AuthSession, AuthState};
pub use cors::create_cors_layer;
