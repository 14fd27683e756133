//! REST API handlers

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use shotcheck_core::{
    AssessError, AssessRequest, AssessResponse, ImagePayload, Orientation, ShootSession,
};

use crate::AppState;
use crate::error::ApiError;

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status of the server
    pub status: String,
    /// Server version
    pub version: String,
    /// Seconds since server started
    pub uptime_seconds: i64,
}

/// Health check endpoint
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.uptime_seconds(),
    })
}

/// Orientation as carried in request bodies
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OrientationBody {
    pub pitch: f64,
    pub yaw: f64,
    pub roll: f64,
}

impl From<OrientationBody> for Orientation {
    fn from(body: OrientationBody) -> Self {
        Orientation::new(body.pitch, body.yaw, body.roll)
    }
}

/// Request body for POST /api/assess
///
/// Every field is optional at the wire level so missing ones surface as
/// field-level validation errors instead of opaque deserialization
/// failures.
#[derive(Debug, Deserialize)]
pub struct AssessBody {
    /// Base64-encoded image data.
    pub image: Option<String>,
    /// Mime type of the image; defaults to image/jpeg.
    pub mime_type: Option<String>,
    pub room_type: Option<String>,
    pub shoot_id: Option<String>,
    pub stack_index: Option<u32>,
    pub orientation: Option<OrientationBody>,
}

impl AssessBody {
    /// Validate required fields and convert into a core request
    ///
    /// Rejecting here guarantees no session is created for a key that
    /// never passed validation.
    fn into_request(self) -> Result<AssessRequest, ApiError> {
        let image = self
            .image
            .filter(|data| !data.trim().is_empty())
            .ok_or_else(|| AssessError::MissingField("image".to_string()))?;
        let room_type = self
            .room_type
            .filter(|room| !room.trim().is_empty())
            .ok_or_else(|| AssessError::MissingField("room_type".to_string()))?;
        let shoot_id = self
            .shoot_id
            .filter(|shoot| !shoot.trim().is_empty())
            .ok_or_else(|| AssessError::MissingField("shoot_id".to_string()))?;

        let mut payload = ImagePayload::new(image);
        if let Some(mime_type) = self.mime_type {
            payload = payload.with_mime_type(mime_type);
        }

        Ok(AssessRequest {
            image: payload,
            room_type,
            shoot_id,
            stack_index: self.stack_index,
            orientation: self.orientation.map(Orientation::from),
        })
    }
}

/// POST /api/assess - Run one assessment
pub async fn assess(
    State(state): State<Arc<AppState>>,
    Json(body): Json<AssessBody>,
) -> Result<Json<AssessResponse>, ApiError> {
    let request = body.into_request()?;
    let response = state.engine.assess(request).await?;
    Ok(Json(response))
}

/// GET /api/shoots/:shoot_id/rooms/:room_type - Session snapshot
pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path((shoot_id, room_type)): Path<(String, String)>,
) -> Result<Json<ShootSession>, ApiError> {
    state
        .engine
        .session(&shoot_id, &room_type)
        .await?
        .map(Json)
        .ok_or(ApiError::SessionNotFound {
            shoot_id,
            room_type,
        })
}

/// Response for bulk session deletion
#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteResponse {
    /// How many sessions were removed
    pub removed: usize,
}

/// DELETE /api/shoots/:shoot_id - Remove every session for a shoot
pub async fn delete_shoot(
    State(state): State<Arc<AppState>>,
    Path(shoot_id): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let removed = state.engine.delete_shoot(&shoot_id).await?;
    Ok(Json(DeleteResponse { removed }))
}
