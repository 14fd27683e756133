//! Per-(shoot, room) assessment memory and its storage

mod state;
mod store;

pub use state::{AssessmentRecord, SessionKey, ShootSession};
pub use store::{KeyLocks, MemorySessionStore, SessionStore};
