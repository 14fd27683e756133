//! Assessment orchestration
//!
//! `Assessor` owns the per-call algorithm: resolve the session, decide
//! the angle reset, build the prompt, call the vision backend, fold the
//! result back into session memory, respond. Session mutation happens on
//! an owned copy and is persisted only after the vision call succeeds,
//! so failed calls leave the store exactly as it was.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::AssessConfig;
use crate::error::AssessError;
use crate::orientation::{self, Orientation};
use crate::prompt::{self, PromptContext};
use crate::scoring;
use crate::session::{
    AssessmentRecord, KeyLocks, MemorySessionStore, SessionKey, SessionStore, ShootSession,
};
use crate::vision::{ImagePayload, VisionBackend};

/// One inbound assessment request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessRequest {
    pub image: ImagePayload,
    pub room_type: String,
    pub shoot_id: String,
    /// Position within a bracketed stack, if the client shoots stacks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack_index: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orientation: Option<Orientation>,
}

impl AssessRequest {
    /// Check required fields before any session or upstream work
    pub fn validate(&self) -> Result<(), AssessError> {
        if self.image.data.trim().is_empty() {
            return Err(AssessError::MissingField("image".to_string()));
        }
        if self.room_type.trim().is_empty() {
            return Err(AssessError::MissingField("room_type".to_string()));
        }
        if self.shoot_id.trim().is_empty() {
            return Err(AssessError::MissingField("shoot_id".to_string()));
        }
        if let Err(e) = self.image.validate() {
            return Err(AssessError::InvalidField {
                field: "image".to_string(),
                reason: e.to_string(),
            });
        }
        Ok(())
    }

    fn key(&self) -> SessionKey {
        SessionKey::new(&self.shoot_id, &self.room_type)
    }
}

/// Structured assessment result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessResponse {
    pub feedback: String,
    pub attempt_number: u32,
    pub angle_reset: bool,
    pub score: u8,
    pub is_acceptable: bool,
    /// Every constraint known for the session, in first-learned order.
    pub constraints: Vec<String>,
    /// Suggested improvements; empty when the shot is acceptable.
    pub improvements: Vec<String>,
}

/// The inbound contract both deployment variants satisfy
///
/// The direct `Assessor` and the subprocess `BridgeClient` both
/// implement this, so callers cannot tell the transports apart.
#[async_trait]
pub trait Assess: Send + Sync {
    /// Run one assessment.
    async fn assess(&self, request: AssessRequest) -> Result<AssessResponse, AssessError>;

    /// Session snapshot, or None when the key has never been assessed.
    async fn session(
        &self,
        shoot_id: &str,
        room_type: &str,
    ) -> Result<Option<ShootSession>, AssessError>;

    /// Remove every session for a shoot; returns how many were removed.
    async fn delete_shoot(&self, shoot_id: &str) -> Result<usize, AssessError>;
}

/// Direct, in-process assessment engine
pub struct Assessor {
    store: Arc<dyn SessionStore>,
    vision: Arc<dyn VisionBackend>,
    locks: KeyLocks,
    config: AssessConfig,
}

impl Assessor {
    /// Create an assessor with an injected store and vision backend
    pub fn new(
        store: Arc<dyn SessionStore>,
        vision: Arc<dyn VisionBackend>,
        config: AssessConfig,
    ) -> Self {
        Self {
            store,
            vision,
            locks: KeyLocks::new(),
            config,
        }
    }

    /// Create an assessor over a fresh in-memory store
    pub fn with_memory_store(vision: Arc<dyn VisionBackend>, config: AssessConfig) -> Self {
        Self::new(Arc::new(MemorySessionStore::new()), vision, config)
    }

    pub fn config(&self) -> &AssessConfig {
        &self.config
    }
}

#[async_trait]
impl Assess for Assessor {
    async fn assess(&self, request: AssessRequest) -> Result<AssessResponse, AssessError> {
        request.validate()?;

        let key = request.key();
        let call_id = Uuid::new_v4();

        // Same-key calls serialize here; distinct keys proceed freely.
        let _guard = self.locks.acquire(&key).await;

        let mut session = self.store.get(&key).await.unwrap_or_default();

        let last_orientation = session.last_orientation();
        let dissimilarity =
            orientation::dissimilarity(last_orientation.as_ref(), request.orientation.as_ref());
        let angle_reset =
            orientation::exceeds_reset_threshold(dissimilarity, self.config.angle_reset_threshold);
        if angle_reset {
            tracing::debug!(%key, %call_id, dissimilarity, "camera angle changed, clearing attempt history");
            session.reset_angle();
        }

        let attempt = session.attempts() + 1;
        let prompt_text = prompt::build(&PromptContext {
            room_type: &request.room_type,
            attempt,
            angle_reset,
            recent_feedback: session.recent_feedback(2),
            constraints: session.constraints().as_slice(),
            word_limit: self.config.feedback_word_limit,
        });

        let bound = Duration::from_secs(self.config.upstream_timeout_seconds);
        let describe = self
            .vision
            .describe(prompt::SYSTEM_INSTRUCTION, &prompt_text, &request.image);
        let feedback = match tokio::time::timeout(bound, describe).await {
            Ok(Ok(text)) => text,
            Ok(Err(e)) => {
                tracing::warn!(%key, %call_id, error = %e, "vision call failed");
                return Err(AssessError::Upstream(e));
            }
            Err(_) => {
                tracing::warn!(%key, %call_id, timeout_seconds = self.config.upstream_timeout_seconds, "vision call timed out");
                return Err(AssessError::Timeout {
                    seconds: self.config.upstream_timeout_seconds,
                });
            }
        };

        let learned = session.constraints_mut().extend_from_feedback(&feedback);
        if learned > 0 {
            tracing::debug!(%key, %call_id, learned, "learned new constraints");
        }

        let score = scoring::evaluate(self.config.policy, attempt, &feedback);

        session.record(AssessmentRecord {
            timestamp: Utc::now(),
            attempt,
            feedback: feedback.clone(),
            orientation: request.orientation,
            after_reset: angle_reset,
        });
        session.set_last_orientation(request.orientation);
        if score.acceptable {
            session.mark_accepted();
        }

        let constraints = session.constraints().to_vec();
        self.store.put(key.clone(), session).await;

        tracing::info!(
            %key,
            %call_id,
            attempt,
            angle_reset,
            score = score.value,
            acceptable = score.acceptable,
            "assessment complete"
        );

        let improvements = if score.acceptable {
            Vec::new()
        } else {
            vec![feedback.clone()]
        };

        Ok(AssessResponse {
            feedback,
            attempt_number: attempt,
            angle_reset,
            score: score.value,
            is_acceptable: score.acceptable,
            constraints,
            improvements,
        })
    }

    async fn session(
        &self,
        shoot_id: &str,
        room_type: &str,
    ) -> Result<Option<ShootSession>, AssessError> {
        Ok(self.store.get(&SessionKey::new(shoot_id, room_type)).await)
    }

    async fn delete_shoot(&self, shoot_id: &str) -> Result<usize, AssessError> {
        let removed = self.store.delete_shoot(shoot_id).await;
        self.locks.remove_shoot(shoot_id).await;
        tracing::info!(shoot_id, removed, "deleted shoot sessions");
        Ok(removed)
    }
}
