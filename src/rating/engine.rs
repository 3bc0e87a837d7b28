//! Odds-based rating arithmetic
//!
//! Bookmaker probabilities give the points a side was expected to take
//! (win = 3, draw = 1, loss = 0); the final score gives the points it
//! actually took. The difference is the rating delta applied to the side
//! and to every one of its starters.

use crate::types::{Odds, Side};
use crate::utils::round_to;
use serde::{Deserialize, Serialize};

pub const POINTS_FOR_WIN: u8 = 3;
pub const POINTS_FOR_DRAW: u8 = 1;
pub const POINTS_FOR_LOSS: u8 = 0;

/// Default number of decimal places kept on rating deltas
pub const DEFAULT_DECIMAL_PLACES: u32 = 4;

/// Outcome probabilities from one side's point of view
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutcomeProbabilities {
    pub win: f64,
    pub draw: f64,
    pub lose: f64,
}

impl OutcomeProbabilities {
    /// Probabilities for `side`; the away view swaps win and lose
    pub fn for_side(odds: &Odds, side: Side) -> Self {
        match side {
            Side::Home => Self {
                win: odds.home_win,
                draw: odds.draw,
                lose: odds.away_win,
            },
            Side::Away => Self::for_side(odds, Side::Home).swapped(),
        }
    }

    /// The same outcome seen from the opponent's side
    pub fn swapped(&self) -> Self {
        Self {
            win: self.lose,
            draw: self.draw,
            lose: self.win,
        }
    }
}

/// Points a side is expected to take. Inputs are not clamped.
pub fn expected_points(probabilities: &OutcomeProbabilities) -> f64 {
    probabilities.win * POINTS_FOR_WIN as f64
        + probabilities.draw * POINTS_FOR_DRAW as f64
        + probabilities.lose * POINTS_FOR_LOSS as f64
}

/// Points a side took from the final score
pub fn actual_points(goals_for: u32, goals_against: u32) -> u8 {
    match goals_for.cmp(&goals_against) {
        std::cmp::Ordering::Greater => POINTS_FOR_WIN,
        std::cmp::Ordering::Equal => POINTS_FOR_DRAW,
        std::cmp::Ordering::Less => POINTS_FOR_LOSS,
    }
}

/// Performance against expectation, rounded to `decimal_places`
pub fn rating_delta(actual: u8, expected: f64, decimal_places: u32) -> f64 {
    round_to(actual as f64 - expected, decimal_places)
}

/// Rating breakdown for one side
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SideRating {
    pub expected_points: f64,
    pub actual_points: u8,
    pub rating_change: f64,
}

/// Rating breakdown for both sides of a match
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchRatingOutcome {
    pub home: SideRating,
    pub away: SideRating,
}

impl MatchRatingOutcome {
    pub fn side(&self, side: Side) -> &SideRating {
        match side {
            Side::Home => &self.home,
            Side::Away => &self.away,
        }
    }
}

/// Rate one side of a match
pub fn rate_side(
    odds: &Odds,
    side: Side,
    goals_for: u32,
    goals_against: u32,
    decimal_places: u32,
) -> SideRating {
    let expected = expected_points(&OutcomeProbabilities::for_side(odds, side));
    let actual = actual_points(goals_for, goals_against);
    SideRating {
        expected_points: expected,
        actual_points: actual,
        rating_change: rating_delta(actual, expected, decimal_places),
    }
}

/// Rate both sides of a match
pub fn rate_match(
    odds: &Odds,
    home_score: u32,
    away_score: u32,
    decimal_places: u32,
) -> MatchRatingOutcome {
    MatchRatingOutcome {
        home: rate_side(odds, Side::Home, home_score, away_score, decimal_places),
        away: rate_side(odds, Side::Away, away_score, home_score, decimal_places),
    }
}
