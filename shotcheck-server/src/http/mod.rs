//! HTTP server module

mod api;

use std::sync::Arc;

use axum::{
    Router,
    routing::{delete, get, post},
};
use tower_http::cors::CorsLayer;

use crate::AppState;

pub use api::{AssessBody, DeleteResponse, HealthResponse, OrientationBody};

/// Create the HTTP router with all routes configured
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(api::health))
        .route("/api/assess", post(api::assess))
        .route(
            "/api/shoots/:shoot_id/rooms/:room_type",
            get(api::get_session),
        )
        .route("/api/shoots/:shoot_id", delete(api::delete_shoot))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
