//! Progressive acceptance scoring
//!
//! The score staircase and the acceptability rule exist to keep a shoot
//! moving: the longer a photographer retries one room, the closer the
//! system gets to waving the shot through.

use serde::{Deserialize, Serialize};

/// Attempt number from which the prompt asks for leniency and the
/// attempt-count policy accepts the shot
pub const LENIENCY_ATTEMPT: u32 = 3;

/// Attempt number from which the keyword policy accepts unconditionally
const KEYWORD_BACKSTOP_ATTEMPT: u32 = 5;

/// Words treated as the model approving the shot
const POSITIVE_VOCABULARY: &[&str] = &["good", "great", "perfect", "snap", "capture"];

/// Staircase score for an attempt number (1-based)
///
/// Monotonic non-decreasing: 75, 82, 88, then 90 from attempt 4 on.
pub fn score_for_attempt(attempt: u32) -> u8 {
    match attempt {
        0 | 1 => 75,
        2 => 82,
        3 => 88,
        _ => 90,
    }
}

/// Which acceptability rule a deployment uses
///
/// The two variants are alternatives, not layers: a deployment picks
/// exactly one in config. They are deliberately never merged into a
/// single rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AcceptancePolicy {
    /// Acceptable once the attempt number reaches 3.
    #[default]
    AttemptCount,
    /// Acceptable when the feedback uses approving language, with an
    /// unconditional backstop from attempt 5.
    Keyword,
}

impl AcceptancePolicy {
    pub fn is_acceptable(&self, attempt: u32, feedback: &str) -> bool {
        match self {
            Self::AttemptCount => attempt >= LENIENCY_ATTEMPT,
            Self::Keyword => {
                if attempt >= KEYWORD_BACKSTOP_ATTEMPT {
                    return true;
                }
                let lowered = feedback.to_lowercase();
                POSITIVE_VOCABULARY.iter().any(|word| lowered.contains(word))
            }
        }
    }
}

/// Score and acceptability for one attempt
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShotScore {
    pub value: u8,
    pub acceptable: bool,
}

/// Evaluate one attempt under the configured policy
pub fn evaluate(policy: AcceptancePolicy, attempt: u32, feedback: &str) -> ShotScore {
    ShotScore {
        value: score_for_attempt(attempt),
        acceptable: policy.is_acceptable(attempt, feedback),
    }
}
