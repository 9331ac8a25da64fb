//! Session endpoints: login, logout, and session introspection.

use std::sync::Arc;

use axum::{body::Bytes, extract::State, http::StatusCode, Json};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use serde_json::json;

use super::AppState;
use crate::auth::verify_password;
use crate::db::{DbError, User, UserRepository};
use crate::web::error::ApiError;
use crate::web::middleware::AuthSession;

const LOGIN_SCHEMA: &str = r#"{
  "type": "object",
  "additionalProperties": false,
  "properties": {
    "email_address": {"type": "string"},
    "password": {"type": "string"}
  },
  "required": ["email_address", "password"]
}"#;

#[derive(Debug, Deserialize)]
struct LoginRequest {
    email_address: String,
    password: String,
}

/// POST /v1/session — verify credentials and set the session cookie.
pub async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    body: Bytes,
) -> Result<(CookieJar, Json<User>), ApiError> {
    let req: LoginRequest = state.schemas.validate_and_decode(LOGIN_SCHEMA, &body)?;

    let user = UserRepository::new(state.db.pool())
        .find_by_email(&req.email_address)
        .await
        .map_err(|e| match e {
            // An unknown address reads the same as a wrong password.
            DbError::EmailNotFound(_) => ApiError::unauthorized(),
            other => ApiError::from(other),
        })?;

    verify_password(&req.password, &user.password_hash)?;

    let token = state.codec.issue(&user)?;
    Ok((jar.add(state.session_cookie(token)), Json(user)))
}

/// DELETE /v1/session — instruct the client to discard its cookie.
///
/// No server-side revocation: the token stays valid until expiry.
pub async fn logout(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> (CookieJar, StatusCode) {
    (
        jar.remove(state.session_cookie_name()),
        StatusCode::NO_CONTENT,
    )
}

/// GET /v1/session — identity as recovered from the presented token.
pub async fn current_session(AuthSession(claims): AuthSession) -> Json<serde_json::Value> {
    Json(json!({
        "email_address": claims.email_address,
        "user_id": claims.sub,
    }))
}
