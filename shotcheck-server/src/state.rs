//! Shared application state for the shotcheck server

use std::sync::Arc;

use chrono::{DateTime, Utc};
use shotcheck_core::Assess;

/// Shared application state accessible by all handlers
///
/// Holds the assessment engine behind the `Assess` trait, so the server
/// serves the direct in-process engine and the bridge client
/// identically.
#[derive(Clone)]
pub struct AppState {
    /// Assessment engine (direct or bridged)
    pub engine: Arc<dyn Assess>,
    /// When the server started
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Create state around an assessment engine
    pub fn new(engine: Arc<dyn Assess>) -> Self {
        Self {
            engine,
            started_at: Utc::now(),
        }
    }

    /// Returns how long the server has been running
    pub fn uptime_seconds(&self) -> i64 {
        (Utc::now() - self.started_at).num_seconds()
    }
}
