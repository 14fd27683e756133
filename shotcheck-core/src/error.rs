//! Error types for shotcheck-core

use thiserror::Error;

/// Top-level error type for assessment operations
///
/// Every request-path failure maps onto one of these; transports convert
/// them into structured responses at the boundary rather than letting
/// them escape as panics.
#[derive(Error, Debug)]
pub enum AssessError {
    /// A required request field was absent or empty. No session is
    /// touched and no upstream call is made.
    #[error("missing required field: {0}")]
    MissingField(String),

    /// A request field was present but unusable.
    #[error("invalid field {field}: {reason}")]
    InvalidField { field: String, reason: String },

    /// The vision service call failed. Session state is left exactly as
    /// it was before the call.
    #[error("vision service error: {0}")]
    Upstream(#[from] VisionError),

    /// The vision service call exceeded its bound. Treated like an
    /// upstream failure for state purposes.
    #[error("vision service call exceeded {seconds}s")]
    Timeout { seconds: u64 },

    /// The bridge relay itself failed: infrastructure, not model.
    #[error("bridge transport error: {0}")]
    Transport(#[from] BridgeError),
}

impl AssessError {
    /// Whether this error is a request-validation failure (4xx-equivalent).
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            AssessError::MissingField(_) | AssessError::InvalidField { .. }
        )
    }
}

/// Errors from vision backends
#[derive(Error, Debug)]
pub enum VisionError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("vision API returned {status}: {detail}")]
    Api { status: u16, detail: String },

    #[error("vision API returned no candidates")]
    EmptyResponse,

    #[error("no API key configured for provider '{0}'")]
    MissingApiKey(String),

    #[error("vision backend failure: {0}")]
    Failed(String),
}

/// Errors from the bridge transport
#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("failed to spawn bridge process: {0}")]
    SpawnFailed(#[source] std::io::Error),

    #[error("bridge binary not found. Is shotcheck on PATH?")]
    BinaryNotFound,

    #[error("bridge process exited unexpectedly: code {code:?}")]
    ProcessExited { code: Option<i32> },

    #[error("bridge i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unparseable bridge message: {0}")]
    Parse(String),

    #[error("remote bridge failure: {0}")]
    Remote(String),

    #[error("bridge stream closed")]
    Closed,
}
