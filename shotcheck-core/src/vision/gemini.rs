//! Gemini vision provider
//!
//! Talks to the Gemini `generateContent` REST endpoint: one text part
//! plus the image as inline base64 data, with a system instruction and
//! a generation config carrying the temperature and token budget. The
//! API key comes from config or the `GEMINI_API_KEY` environment
//! variable. Call timeouts are the orchestrator's job, not this
//! client's.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{ImagePayload, VisionBackend};
use crate::config::VisionConfig;
use crate::error::VisionError;

/// Environment variable consulted when no API key is configured
const API_KEY_ENV: &str = "GEMINI_API_KEY";

// ────────────────────────────────────────────────────────────────────────────
// Gemini API Request/Response Types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    system_instruction: Content,
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

impl Content {
    fn text(text: impl Into<String>) -> Self {
        Self {
            parts: vec![Part {
                text: Some(text.into()),
                inline_data: None,
            }],
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Serialize, Deserialize)]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}

// ────────────────────────────────────────────────────────────────────────────
// GeminiVision
// ────────────────────────────────────────────────────────────────────────────

/// Gemini-backed vision client
pub struct GeminiVision {
    client: reqwest::Client,
    config: VisionConfig,
    api_key: String,
}

impl GeminiVision {
    /// Create a client, resolving the API key from config or environment
    pub fn new(config: VisionConfig) -> Result<Self, VisionError> {
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var(API_KEY_ENV).ok())
            .ok_or_else(|| VisionError::MissingApiKey(config.provider.clone()))?;

        Ok(Self {
            client: reqwest::Client::new(),
            config,
            api_key,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }
}

#[async_trait]
impl VisionBackend for GeminiVision {
    async fn describe(
        &self,
        system: &str,
        prompt: &str,
        image: &ImagePayload,
    ) -> Result<String, VisionError> {
        let request = GenerateContentRequest {
            system_instruction: Content::text(system),
            contents: vec![Content {
                parts: vec![
                    Part {
                        text: Some(prompt.to_string()),
                        inline_data: None,
                    },
                    Part {
                        text: None,
                        inline_data: Some(InlineData {
                            mime_type: image.mime_type.clone(),
                            data: image.data.clone(),
                        }),
                    },
                ],
            }],
            generation_config: GenerationConfig {
                temperature: self.config.temperature,
                max_output_tokens: self.config.max_output_tokens,
            },
        };

        tracing::debug!(model = %self.config.model, "sending generateContent request");

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(VisionError::Api {
                status: status.as_u16(),
                detail,
            });
        }

        let body: GenerateContentResponse = response.json().await?;
        let text: String = body
            .candidates
            .first()
            .ok_or(VisionError::EmptyResponse)?
            .content
            .parts
            .iter()
            .filter_map(|part| part.text.as_deref())
            .collect::<Vec<_>>()
            .join("");

        let text = text.trim().to_string();
        if text.is_empty() {
            return Err(VisionError::EmptyResponse);
        }
        Ok(text)
    }
}
