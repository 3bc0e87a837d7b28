//! Rating calculator trait and implementations
//!
//! The reconciliation service rates matches through this trait so the
//! precision policy lives in one place.

use crate::config::RatingSettings;
use crate::rating::engine::{self, MatchRatingOutcome};
use crate::types::Odds;

/// Trait for rating a finished match
pub trait RatingCalculator: Send + Sync {
    /// Rate both sides of a match from its odds and final score
    fn rate_match(&self, odds: &Odds, home_score: u32, away_score: u32) -> MatchRatingOutcome;

    /// Decimal places kept on every stored rating delta
    fn decimal_places(&self) -> u32;

    /// Get current configuration as JSON
    fn config(&self) -> serde_json::Value;
}

/// Expected-versus-actual points calculator driven by bookmaker odds
#[derive(Debug, Clone)]
pub struct OddsRatingCalculator {
    decimal_places: u32,
}

impl OddsRatingCalculator {
    pub fn new(decimal_places: u32) -> Self {
        Self { decimal_places }
    }

    pub fn from_settings(settings: &RatingSettings) -> Self {
        Self::new(settings.decimal_places)
    }
}

impl Default for OddsRatingCalculator {
    fn default() -> Self {
        Self::new(engine::DEFAULT_DECIMAL_PLACES)
    }
}

impl RatingCalculator for OddsRatingCalculator {
    fn rate_match(&self, odds: &Odds, home_score: u32, away_score: u32) -> MatchRatingOutcome {
        engine::rate_match(odds, home_score, away_score, self.decimal_places)
    }

    fn decimal_places(&self) -> u32 {
        self.decimal_places
    }

    fn config(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "odds_expected_points",
            "decimal_places": self.decimal_places,
            "points": {
                "win": engine::POINTS_FOR_WIN,
                "draw": engine::POINTS_FOR_DRAW,
                "loss": engine::POINTS_FOR_LOSS
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_precision_is_four_places() {
        let calculator = OddsRatingCalculator::default();
        assert_eq!(calculator.decimal_places(), 4);

        let odds = Odds {
            home_win: 0.4567,
            draw: 0.2811,
            away_win: 0.2622,
        };
        let outcome = calculator.rate_match(&odds, 0, 0);
        assert_eq!(outcome.home.rating_change, -0.6512);
        assert_eq!(outcome.away.rating_change, -0.0677);
    }

    #[test]
    fn test_from_settings() {
        let settings = RatingSettings {
            decimal_places: 2,
            ..RatingSettings::default()
        };
        let calculator = OddsRatingCalculator::from_settings(&settings);
        assert_eq!(calculator.decimal_places(), 2);
        assert_eq!(calculator.config()["decimal_places"], 2);
    }
}
