//! Session state for a (shoot, room) pair
//!
//! A session is the unit of assessment memory: attempt counter, history
//! of completed evaluations, learned constraints, and the last-seen
//! camera orientation. The counter and the history only ever move
//! together, so `attempts() == history().len()` holds after every call,
//! including immediately after an angle reset.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constraint::ConstraintSet;
use crate::orientation::Orientation;

/// Composite session key: exact shoot id plus room type
///
/// No normalization is applied; callers must be consistent about case
/// and format.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionKey {
    pub shoot_id: String,
    pub room_type: String,
}

impl SessionKey {
    pub fn new(shoot_id: impl Into<String>, room_type: impl Into<String>) -> Self {
        Self {
            shoot_id: shoot_id.into(),
            room_type: room_type.into(),
        }
    }
}

impl std::fmt::Display for SessionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.shoot_id, self.room_type)
    }
}

/// One completed evaluation. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentRecord {
    pub timestamp: DateTime<Utc>,
    /// 1-based attempt number this record was produced on.
    pub attempt: u32,
    pub feedback: String,
    /// Orientation in effect for this attempt, if reported.
    pub orientation: Option<Orientation>,
    /// Whether this attempt directly followed an angle reset.
    pub after_reset: bool,
}

/// Per-(shoot, room) assessment memory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShootSession {
    attempts: u32,
    history: Vec<AssessmentRecord>,
    constraints: ConstraintSet,
    last_orientation: Option<Orientation>,
    accepted: bool,
    created_at: DateTime<Utc>,
}

impl ShootSession {
    pub fn new() -> Self {
        Self {
            attempts: 0,
            history: Vec::new(),
            constraints: ConstraintSet::new(),
            last_orientation: None,
            accepted: false,
            created_at: Utc::now(),
        }
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn history(&self) -> &[AssessmentRecord] {
        &self.history
    }

    pub fn constraints(&self) -> &ConstraintSet {
        &self.constraints
    }

    pub fn constraints_mut(&mut self) -> &mut ConstraintSet {
        &mut self.constraints
    }

    pub fn last_orientation(&self) -> Option<Orientation> {
        self.last_orientation
    }

    pub fn set_last_orientation(&mut self, orientation: Option<Orientation>) {
        self.last_orientation = orientation;
    }

    /// Whether any attempt in this session has been acceptable. Sticky:
    /// never reverts, not even across angle resets.
    pub fn accepted(&self) -> bool {
        self.accepted
    }

    pub fn mark_accepted(&mut self) {
        self.accepted = true;
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Clear the attempt history for a new camera angle
    ///
    /// Counter and history are reinitialized together; constraints are
    /// physical facts about the space and survive.
    pub fn reset_angle(&mut self) {
        self.attempts = 0;
        self.history.clear();
    }

    /// Append one completed evaluation
    ///
    /// The counter is incremented and the record appended in one
    /// mutation, which is what keeps the counter == history invariant.
    pub fn record(&mut self, record: AssessmentRecord) {
        self.attempts += 1;
        self.history.push(record);
    }

    /// Most-recent-first feedback strings, at most `limit`
    pub fn recent_feedback(&self, limit: usize) -> Vec<&str> {
        self.history
            .iter()
            .rev()
            .take(limit)
            .map(|record| record.feedback.as_str())
            .collect()
    }
}

impl Default for ShootSession {
    fn default() -> Self {
        Self::new()
    }
}
