//! Odds-based rating engine
//!
//! Pure arithmetic turning bookmaker odds and a final score into rating
//! deltas, plus the calculator seam used by the reconciliation service.

pub mod calculator;
pub mod engine;

// Re-export commonly used types
pub use calculator::{OddsRatingCalculator, RatingCalculator};
pub use engine::{
    actual_points, expected_points, rate_match, rating_delta, MatchRatingOutcome,
    OutcomeProbabilities, SideRating,
};
