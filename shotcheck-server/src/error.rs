//! Server error types

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use shotcheck_core::AssessError;
use thiserror::Error;

/// Errors raised while starting the server
#[derive(Debug, Error)]
pub enum ServerError {
    /// Failed to bind to the specified address
    #[error("failed to bind to {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// Internal server error
    #[error("internal error: {0}")]
    Internal(String),
}

/// Per-request error with an HTTP mapping
///
/// Validation failures keep their field-level detail; upstream, timeout,
/// and transport failures return a generic message while the diagnostic
/// detail goes to the logs.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Assess(#[from] AssessError),

    #[error("no session for shoot '{shoot_id}' room '{room_type}'")]
    SessionNotFound {
        shoot_id: String,
        room_type: String,
    },
}

/// Structured error body returned for every failed request
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind, message) = match &self {
            ApiError::Assess(AssessError::MissingField(field)) => (
                StatusCode::BAD_REQUEST,
                "validation",
                format!("missing required field: {field}"),
            ),
            ApiError::Assess(AssessError::InvalidField { field, reason }) => (
                StatusCode::BAD_REQUEST,
                "validation",
                format!("invalid field {field}: {reason}"),
            ),
            ApiError::Assess(AssessError::Upstream(e)) => {
                tracing::error!(error = %e, "vision service failure");
                (
                    StatusCode::BAD_GATEWAY,
                    "upstream",
                    "vision service failed".to_string(),
                )
            }
            ApiError::Assess(AssessError::Timeout { .. }) => (
                StatusCode::GATEWAY_TIMEOUT,
                "timeout",
                "vision service timed out".to_string(),
            ),
            ApiError::Assess(AssessError::Transport(e)) => {
                tracing::error!(error = %e, "bridge transport failure");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "transport",
                    "assessment backend unavailable".to_string(),
                )
            }
            ApiError::SessionNotFound {
                shoot_id,
                room_type,
            } => (
                StatusCode::NOT_FOUND,
                "not_found",
                format!("no session for shoot '{shoot_id}' room '{room_type}'"),
            ),
        };

        (status, Json(ErrorBody { error: kind, message })).into_response()
    }
}
