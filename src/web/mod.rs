//! REST API: routing, middleware, request validation, and error mapping.

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod schema;
pub mod server;

pub use error::ApiError;
pub use router::{create_health_router, create_router};
pub use schema::{SchemaCache, SchemaError, Violation};
pub use server::WebServer;
