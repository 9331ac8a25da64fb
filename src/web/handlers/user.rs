//! User endpoints.

use std::sync::Arc;

use axum::{body::Bytes, extract::State, Json};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;

use super::AppState;
use crate::auth::hash_password;
use crate::db::{Patch, User, UserRepository, UserUpdate};
use crate::web::error::ApiError;
use crate::web::middleware::AuthSession;

const CREATE_USER_SCHEMA: &str = r#"{
  "type": "object",
  "additionalProperties": false,
  "properties": {
    "email_address": {"type": "string"},
    "password": {"type": "string"}
  },
  "required": ["email_address", "password"]
}"#;

const UPDATE_USER_SCHEMA: &str = r#"{
  "type": "object",
  "additionalProperties": false,
  "properties": {
    "email_address": {"type": "string"}
  }
}"#;

#[derive(Debug, Deserialize)]
struct CreateUserRequest {
    email_address: String,
    password: String,
}

#[derive(Debug, Deserialize)]
struct UpdateUserRequest {
    #[serde(default)]
    email_address: Patch<String>,
}

/// POST /v1/users — register, and log the new user straight in.
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    body: Bytes,
) -> Result<(CookieJar, Json<User>), ApiError> {
    let req: CreateUserRequest = state.schemas.validate_and_decode(CREATE_USER_SCHEMA, &body)?;

    let password_hash = hash_password(&req.password)?;

    let user = UserRepository::new(state.db.pool())
        .create(&req.email_address, &password_hash)
        .await?;

    let token = state.codec.issue(&user)?;
    Ok((jar.add(state.session_cookie(token)), Json(user)))
}

/// GET /v1/users/me
pub async fn get_me(
    State(state): State<Arc<AppState>>,
    AuthSession(claims): AuthSession,
) -> Result<Json<User>, ApiError> {
    let user = UserRepository::new(state.db.pool()).get(claims.sub).await?;
    Ok(Json(user))
}

/// PATCH /v1/users/me
pub async fn update_me(
    State(state): State<Arc<AppState>>,
    AuthSession(claims): AuthSession,
    body: Bytes,
) -> Result<Json<User>, ApiError> {
    let req: UpdateUserRequest = state.schemas.validate_and_decode(UPDATE_USER_SCHEMA, &body)?;

    let user = UserRepository::new(state.db.pool())
        .update(
            claims.sub,
            UserUpdate {
                email_address: req.email_address,
            },
        )
        .await?;
    Ok(Json(user))
}

/// DELETE /v1/users/me — returns the deleted record.
pub async fn delete_me(
    State(state): State<Arc<AppState>>,
    AuthSession(claims): AuthSession,
) -> Result<Json<User>, ApiError> {
    let repo = UserRepository::new(state.db.pool());
    let user = repo.get(claims.sub).await?;
    repo.delete(claims.sub).await?;
    Ok(Json(user))
}
