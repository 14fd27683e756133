//! Mock vision backends for testing
//!
//! MockVision allows scripting model responses for unit tests, enabling
//! fast, deterministic testing of orchestration logic. It also records
//! the prompts it receives so tests can assert on prompt content.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::{ImagePayload, VisionBackend};
use crate::error::VisionError;

/// Mock implementation of VisionBackend
///
/// Queue responses with `queue_feedback()` / `queue_failure()` before
/// calling `describe()`. Each call consumes one queued entry.
#[derive(Default)]
pub struct MockVision {
    responses: Mutex<VecDeque<Result<String, VisionError>>>,
    prompts: Mutex<Vec<String>>,
}

impl MockVision {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful feedback text for the next call
    pub fn queue_feedback(&self, feedback: impl Into<String>) {
        self.responses
            .lock()
            .expect("mock lock poisoned")
            .push_back(Ok(feedback.into()));
    }

    /// Queue a failure for the next call
    pub fn queue_failure(&self, message: impl Into<String>) {
        self.responses
            .lock()
            .expect("mock lock poisoned")
            .push_back(Err(VisionError::Failed(message.into())));
    }

    /// Prompts received so far, in call order
    pub fn received_prompts(&self) -> Vec<String> {
        self.prompts.lock().expect("mock lock poisoned").clone()
    }

    /// Number of describe calls made
    pub fn call_count(&self) -> usize {
        self.prompts.lock().expect("mock lock poisoned").len()
    }
}

#[async_trait]
impl VisionBackend for MockVision {
    async fn describe(
        &self,
        _system: &str,
        prompt: &str,
        _image: &ImagePayload,
    ) -> Result<String, VisionError> {
        self.prompts
            .lock()
            .expect("mock lock poisoned")
            .push(prompt.to_string());

        self.responses
            .lock()
            .expect("mock lock poisoned")
            .pop_front()
            .unwrap_or_else(|| Err(VisionError::Failed("no queued response in MockVision".to_string())))
    }
}

/// MockVision wrapper that adds a configurable delay
///
/// Useful for timeout handling and concurrency tests.
pub struct SlowMockVision {
    inner: MockVision,
    delay: Duration,
}

impl SlowMockVision {
    /// Create with the specified delay
    pub fn new(delay: Duration) -> Self {
        Self {
            inner: MockVision::new(),
            delay,
        }
    }

    /// Queue a successful feedback text (delegates to inner)
    pub fn queue_feedback(&self, feedback: impl Into<String>) {
        self.inner.queue_feedback(feedback);
    }
}

#[async_trait]
impl VisionBackend for SlowMockVision {
    async fn describe(
        &self,
        system: &str,
        prompt: &str,
        image: &ImagePayload,
    ) -> Result<String, VisionError> {
        tokio::time::sleep(self.delay).await;
        self.inner.describe(system, prompt, image).await
    }
}
