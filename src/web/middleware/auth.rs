//! Session authentication middleware.
//!
//! The auth gate: handlers that take an [`AuthSession`] argument only run
//! once the `auth` cookie has been validated, and they receive the decoded
//! claims as their identity. Handlers never re-derive identity themselves.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::FromRequestParts,
    http::{request::Parts, Request},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;

use crate::auth::{AuthError, Claims, TokenCodec};
use crate::web::error::ApiError;

/// Process-wide authentication state: the token codec plus the name of the
/// cookie carrying the session token. Constructed once at startup and
/// injected into every request.
pub struct AuthState {
    pub codec: Arc<TokenCodec>,
    pub cookie_name: String,
}

impl AuthState {
    pub fn new(codec: Arc<TokenCodec>, cookie_name: impl Into<String>) -> Self {
        Self {
            codec,
            cookie_name: cookie_name.into(),
        }
    }
}

/// Extractor gating a handler on a valid session.
///
/// Rejections: no cookie or a structurally broken token → 401
/// `unauthorized`; a well-formed token with a bad signature or past expiry
/// → 403 `forbidden`.
#[derive(Debug, Clone)]
pub struct AuthSession(pub Claims);

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthSession
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let auth = parts.extensions.get::<Arc<AuthState>>().ok_or_else(|| {
            tracing::error!("auth state missing from request extensions");
            ApiError::server_error()
        })?;

        let jar = CookieJar::from_headers(&parts.headers);
        let cookie = jar.get(&auth.cookie_name).ok_or(AuthError::Missing)?;

        let claims = auth.codec.validate(cookie.value()).map_err(|e| {
            tracing::debug!("session token rejected: {e}");
            e
        })?;

        Ok(AuthSession(claims))
    }
}

/// Middleware injecting the auth state into request extensions.
pub async fn session_auth(
    auth_state: Arc<AuthState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    request.extensions_mut().insert(auth_state);
    next.run(request).await
}
