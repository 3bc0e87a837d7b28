//! Match reconciliation
//!
//! Turns submitted drafts into persisted, rated matches and keeps every
//! starter's rating history consistent across creates and edits.

pub mod roster;
pub mod service;
pub mod validation;

// Re-export commonly used types
pub use roster::{HistoryPlan, RosterDiff, SideDiff};
pub use service::{MatchService, MatchSubmission};
pub use validation::{DraftValidator, ValidatedMatch, ValidatedSide};
