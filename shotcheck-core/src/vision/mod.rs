//! Vision backend abstraction
//!
//! The model call is a black box: system text, user text, and one image
//! in; generated text out. Implementations are injected so transports
//! and tests can swap providers freely. No visual judgment happens
//! locally.

mod gemini;
mod mock;

pub use gemini::GeminiVision;
pub use mock::{MockVision, SlowMockVision};

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};

use crate::error::VisionError;

/// A photo as carried in transit: base64 data plus mime type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImagePayload {
    /// Base64-encoded image bytes.
    pub data: String,
    /// Mime type, e.g. "image/jpeg".
    #[serde(default = "default_mime_type")]
    pub mime_type: String,
}

fn default_mime_type() -> String {
    "image/jpeg".to_string()
}

impl ImagePayload {
    pub fn new(data: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            mime_type: default_mime_type(),
        }
    }

    #[must_use]
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = mime_type.into();
        self
    }

    /// Encode raw image bytes into a payload
    pub fn from_bytes(bytes: &[u8], mime_type: impl Into<String>) -> Self {
        Self {
            data: BASE64.encode(bytes),
            mime_type: mime_type.into(),
        }
    }

    /// Check that the payload decodes as base64
    pub fn validate(&self) -> Result<(), base64::DecodeError> {
        BASE64.decode(&self.data).map(|_| ())
    }
}

/// Text-in/text-out vision model with image input
///
/// The caller imposes the timeout; implementations just make the call.
#[async_trait]
pub trait VisionBackend: Send + Sync {
    /// Generate feedback text for one image.
    async fn describe(
        &self,
        system: &str,
        prompt: &str,
        image: &ImagePayload,
    ) -> Result<String, VisionError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_defaults_to_jpeg() {
        let payload = ImagePayload::new("aGVsbG8=");
        assert_eq!(payload.mime_type, "image/jpeg");
    }

    #[test]
    fn payload_from_bytes_roundtrips() {
        let payload = ImagePayload::from_bytes(b"hello", "image/png");
        assert_eq!(payload.data, "aGVsbG8=");
        assert_eq!(payload.mime_type, "image/png");
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn validate_rejects_non_base64() {
        let payload = ImagePayload::new("not base64!!!");
        assert!(payload.validate().is_err());
    }

    #[test]
    fn payload_deserializes_without_mime_type() {
        let payload: ImagePayload = serde_json::from_str(r#"{"data":"aGVsbG8="}"#).unwrap();
        assert_eq!(payload.mime_type, "image/jpeg");
    }
}
