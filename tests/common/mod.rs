//! Shared helpers for API integration tests.

use std::sync::Arc;

use axum_extra::extract::cookie::Cookie;
use axum_test::TestServer;
use serde_json::{json, Value};
use vehicledb::auth::TokenCodec;
use vehicledb::web::handlers::AppState;
use vehicledb::web::{create_health_router, create_router};
use vehicledb::Database;

pub const TEST_SECRET: &str = "test-secret-key-for-testing-only";
pub const TEST_TTL_SECS: i64 = 24 * 3600;

/// Build a test server over an in-memory database.
pub async fn create_test_server() -> TestServer {
    let db = Database::open_in_memory()
        .await
        .expect("failed to create test database");

    let codec = Arc::new(TokenCodec::new(TEST_SECRET, TEST_TTL_SECS));
    let state = Arc::new(AppState::new(db, codec, "auth"));

    let router = create_router(state, &[]).merge(create_health_router());
    TestServer::new(router).expect("failed to create test server")
}

/// Register a user and return the issued session cookie.
pub async fn register(server: &TestServer, email: &str, password: &str) -> Cookie<'static> {
    let response = server
        .post("/v1/users")
        .json(&json!({
            "email_address": email,
            "password": password,
        }))
        .await;

    response.assert_status_ok();
    response.cookie("auth")
}

/// Create a vehicle for an authenticated user; returns the response body.
pub async fn create_vehicle(
    server: &TestServer,
    session: &Cookie<'static>,
    year: i64,
    make: &str,
    model: &str,
) -> Value {
    let response = server
        .post("/v1/vehicles")
        .add_cookie(session.clone())
        .json(&json!({"year": year, "make": make, "model": model}))
        .await;

    response.assert_status_ok();
    response.json::<Value>()
}
