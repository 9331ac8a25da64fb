//! Route table.

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use super::handlers::{
    schedule::{
        create_schedule_item, delete_schedule_item, get_schedule_item, list_schedule_items,
        update_schedule_item,
    },
    session::{current_session, login, logout},
    user::{create_user, delete_me, get_me, update_me},
    vehicle::{create_vehicle, delete_vehicle, get_vehicle, list_vehicles, update_vehicle},
    AppState,
};
use super::middleware::{create_cors_layer, session_auth, AuthState};

/// Build the `/v1` API router.
///
/// Protection is enforced per handler through the `AuthSession` extractor;
/// only user registration and login are reachable without a session.
pub fn create_router(state: Arc<AppState>, cors_origins: &[String]) -> Router {
    let auth_state = Arc::new(AuthState::new(state.codec.clone(), &state.cookie_name));

    let v1 = Router::new()
        .route("/users", post(create_user))
        .route(
            "/users/me",
            get(get_me).patch(update_me).delete(delete_me),
        )
        .route(
            "/session",
            get(current_session).post(login).delete(logout),
        )
        .route("/vehicles", get(list_vehicles).post(create_vehicle))
        .route(
            "/vehicles/:vehicle_id",
            get(get_vehicle).patch(update_vehicle).delete(delete_vehicle),
        )
        .route(
            "/vehicles/:vehicle_id/schedule",
            get(list_schedule_items).post(create_schedule_item),
        )
        .route(
            "/vehicles/:vehicle_id/schedule/:schedule_item_id",
            get(get_schedule_item)
                .patch(update_schedule_item)
                .delete(delete_schedule_item),
        );

    Router::new()
        .nest("/v1", v1)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(cors_origins))
                .layer(middleware::from_fn(move |req, next| {
                    let auth_state = auth_state.clone();
                    session_auth(auth_state, req, next)
                })),
        )
        .with_state(state)
}

/// Health check router, outside the versioned API.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(|| async { "OK" }))
}
