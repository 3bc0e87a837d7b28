//! Rating and match validation configuration

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

/// Tunables for rating deltas and submission validation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RatingSettings {
    /// Decimal places kept on rating deltas (preview, response and storage)
    pub decimal_places: u32,
    /// Starters each side needs for a valid submission
    pub min_starters_per_side: usize,
    /// Lowest accepted sum of the three outcome probabilities
    pub min_odds_total: f64,
    /// Highest accepted sum of the three outcome probabilities
    pub max_odds_total: f64,
}

impl Default for RatingSettings {
    fn default() -> Self {
        Self {
            decimal_places: 4,
            min_starters_per_side: 2,
            min_odds_total: 0.9,
            max_odds_total: 1.1,
        }
    }
}

impl RatingSettings {
    pub fn validate(&self) -> Result<()> {
        if self.decimal_places > 10 {
            return Err(anyhow!(
                "Rating decimal places must be at most 10, got {}",
                self.decimal_places
            ));
        }
        if self.min_starters_per_side == 0 {
            return Err(anyhow!("Minimum starters per side must be greater than 0"));
        }
        if !(self.min_odds_total < self.max_odds_total) {
            return Err(anyhow!(
                "Odds total bounds must satisfy min < max, got {} and {}",
                self.min_odds_total,
                self.max_odds_total
            ));
        }
        Ok(())
    }
}
