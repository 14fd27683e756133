//! shotcheck-core: context-aware photo assessment
//!
//! This crate provides the assessment engine behind shotcheck:
//!
//! - **Orchestration** - [`Assessor`] runs the per-call algorithm behind
//!   the [`Assess`] contract shared by every transport
//! - **Session memory** - [`ShootSession`] tracks attempts, feedback
//!   history, learned constraints, and camera orientation per
//!   (shoot, room) key, persisted through an injected [`SessionStore`]
//! - **Policy** - angle comparison, constraint extraction, progressive
//!   acceptance scoring, and prompt assembly as standalone modules
//! - **Vision backends** - [`VisionBackend`] trait with a Gemini client
//!   and scriptable mocks
//! - **Bridge transport** - the same contract relayed to a child
//!   process over line-delimited JSON
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use shotcheck_core::{Assess, AssessConfig, Assessor, GeminiVision, VisionConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let vision = Arc::new(GeminiVision::new(VisionConfig::default())?);
//! let assessor = Assessor::with_memory_store(vision, AssessConfig::default());
//! # Ok(())
//! # }
//! ```

pub mod assessor;
pub mod bridge;
pub mod config;
pub mod constraint;
pub mod error;
pub mod orientation;
pub mod prompt;
pub mod scoring;
pub mod session;
pub mod vision;

// Re-export key types for convenience
pub use assessor::{Assess, AssessRequest, AssessResponse, Assessor};
pub use bridge::{BridgeClient, BridgeConfig, BridgeRequest, BridgeResponse};
pub use config::{AssessConfig, VisionConfig};
pub use constraint::ConstraintSet;
pub use error::{AssessError, BridgeError, VisionError};
pub use orientation::Orientation;
pub use scoring::{AcceptancePolicy, ShotScore};
pub use session::{
    AssessmentRecord, KeyLocks, MemorySessionStore, SessionKey, SessionStore, ShootSession,
};
pub use vision::{GeminiVision, ImagePayload, MockVision, SlowMockVision, VisionBackend};
