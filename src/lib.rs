//! VehicleDB — a multi-tenant vehicle record service.
//!
//! Users own vehicles, vehicles own maintenance-schedule items. Sessions
//! are signed JWTs carried in an `auth` cookie; request bodies are checked
//! against cached compiled JSON Schemas before they reach domain logic;
//! partial updates distinguish omitted fields from explicit nulls.

pub mod auth;
pub mod config;
pub mod db;
pub mod logging;
pub mod web;

pub use auth::{hash_password, verify_password, AuthError, Claims, PasswordError, TokenCodec};
pub use config::Config;
pub use db::{Database, DbError, Patch, ScheduleItem, User, Vehicle};
pub use web::{ApiError, SchemaCache, SchemaError, Violation, WebServer};
