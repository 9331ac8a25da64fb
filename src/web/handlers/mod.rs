//! REST handlers.

pub mod schedule;
pub mod session;
pub mod user;
pub mod vehicle;

use std::sync::Arc;

use axum_extra::extract::cookie::{Cookie, SameSite};

use crate::auth::TokenCodec;
use crate::db::Database;
use crate::web::schema::SchemaCache;

/// Application state shared across handlers.
///
/// The schema cache and token codec are built once here and passed by
/// handle; nothing in the request path reaches for ambient globals.
pub struct AppState {
    pub db: Database,
    pub schemas: SchemaCache,
    pub codec: Arc<TokenCodec>,
    pub cookie_name: String,
}

impl AppState {
    pub fn new(db: Database, codec: Arc<TokenCodec>, cookie_name: impl Into<String>) -> Self {
        Self {
            db,
            schemas: SchemaCache::new(),
            codec,
            cookie_name: cookie_name.into(),
        }
    }

    /// Session cookie carrying a freshly issued token.
    pub(crate) fn session_cookie(&self, token: String) -> Cookie<'static> {
        Cookie::build((self.cookie_name.clone(), token))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .build()
    }

    /// Cookie matcher used to instruct the client to discard its session.
    pub(crate) fn session_cookie_name(&self) -> Cookie<'static> {
        Cookie::build(self.cookie_name.clone()).path("/").build()
    }
}
