//! Assessment configuration types

use serde::{Deserialize, Serialize};

use crate::orientation::DEFAULT_RESET_THRESHOLD;
use crate::scoring::AcceptancePolicy;

/// Tunables for the assessment orchestrator
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssessConfig {
    /// Angle dissimilarity above which the session resets.
    pub angle_reset_threshold: f64,
    /// Bound on the vision call, in seconds.
    pub upstream_timeout_seconds: u64,
    /// Word cap stated to the model.
    pub feedback_word_limit: u32,
    /// Acceptability rule for this deployment.
    pub policy: AcceptancePolicy,
    /// Vision provider settings.
    pub vision: VisionConfig,
}

impl Default for AssessConfig {
    fn default() -> Self {
        Self {
            angle_reset_threshold: DEFAULT_RESET_THRESHOLD,
            upstream_timeout_seconds: 30,
            feedback_word_limit: 40,
            policy: AcceptancePolicy::AttemptCount,
            vision: VisionConfig::default(),
        }
    }
}

/// Vision provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VisionConfig {
    /// Provider name; "gemini" is the only shipped provider.
    pub provider: String,
    /// Model to use for assessments.
    pub model: String,
    /// API base URL.
    pub base_url: String,
    /// API key; falls back to the GEMINI_API_KEY environment variable.
    pub api_key: Option<String>,
    /// Sampling temperature.
    pub temperature: f32,
    /// Token budget for the generated feedback.
    pub max_output_tokens: u32,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
            model: "gemini-2.0-flash".to_string(),
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            api_key: None,
            temperature: 0.4,
            max_output_tokens: 256,
        }
    }
}
