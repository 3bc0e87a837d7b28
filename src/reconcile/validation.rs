//! Submission checks that need no store access
//!
//! Checks run in a fixed order so a payload with several problems always
//! reports the same one: date, type, odds, then (after the store-backed day
//! conflict check in the service) teams, venue and rosters.

use crate::config::RatingSettings;
use crate::error::{MatchError, Result};
use crate::types::{MatchDraft, MatchType, Odds, PlayerId, PlayerSelection, Side, TeamRef};
use chrono::{DateTime, Utc};
use std::collections::HashSet;

/// One side of a draft that passed every check
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedSide {
    pub team: TeamRef,
    pub score: u32,
    pub players: Vec<PlayerSelection>,
}

/// A draft that passed every check, with its type parsed and venue trimmed
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedMatch {
    pub match_type: MatchType,
    pub date: DateTime<Utc>,
    pub venue: String,
    pub home: ValidatedSide,
    pub away: ValidatedSide,
    pub odds: Odds,
}

impl ValidatedMatch {
    pub fn side(&self, side: Side) -> &ValidatedSide {
        match side {
            Side::Home => &self.home,
            Side::Away => &self.away,
        }
    }

    /// Every player listed on either side
    pub fn player_ids(&self) -> Vec<PlayerId> {
        self.home
            .players
            .iter()
            .chain(self.away.players.iter())
            .map(|selection| selection.player)
            .collect()
    }
}

/// Validator for submitted matches
#[derive(Debug, Clone)]
pub struct DraftValidator {
    settings: RatingSettings,
}

impl DraftValidator {
    pub fn new(settings: RatingSettings) -> Self {
        Self { settings }
    }

    /// Date, type and odds checks; returns the parsed match type
    pub fn check_header(&self, draft: &MatchDraft, now: DateTime<Utc>) -> Result<MatchType> {
        check_date(draft.date, now)?;
        let match_type = parse_match_type(&draft.match_type)?;
        check_odds(&draft.odds, &self.settings)?;
        Ok(match_type)
    }

    /// Team, venue and roster checks on a draft whose header already passed
    pub fn check_body(&self, draft: &MatchDraft, match_type: MatchType) -> Result<ValidatedMatch> {
        if draft.home_team.team == draft.away_team.team {
            return Err(MatchError::SameTeam.into());
        }

        let venue = normalize_venue(&draft.venue)?;
        check_rosters(
            &draft.home_team.players,
            &draft.away_team.players,
            self.settings.min_starters_per_side,
        )?;

        Ok(ValidatedMatch {
            match_type,
            date: draft.date,
            venue,
            home: ValidatedSide {
                team: TeamRef::new(match_type, draft.home_team.team),
                score: draft.home_team.score,
                players: draft.home_team.players.clone(),
            },
            away: ValidatedSide {
                team: TeamRef::new(match_type, draft.away_team.team),
                score: draft.away_team.score,
                players: draft.away_team.players.clone(),
            },
            odds: draft.odds,
        })
    }

    /// Every store-independent check in order
    pub fn validate(&self, draft: &MatchDraft, now: DateTime<Utc>) -> Result<ValidatedMatch> {
        let match_type = self.check_header(draft, now)?;
        self.check_body(draft, match_type)
    }
}

/// Matches cannot be recorded before they are played
pub fn check_date(date: DateTime<Utc>, now: DateTime<Utc>) -> Result<()> {
    if date > now {
        return Err(MatchError::InvalidDate.into());
    }
    Ok(())
}

pub fn parse_match_type(raw: &str) -> Result<MatchType> {
    Ok(raw.parse::<MatchType>()?)
}

/// Each probability in [0, 1] and the total within the configured bounds
pub fn check_odds(odds: &Odds, settings: &RatingSettings) -> Result<()> {
    let values = [
        ("homeWin", odds.home_win),
        ("draw", odds.draw),
        ("awayWin", odds.away_win),
    ];

    for (name, value) in values {
        if !value.is_finite() || !(0.0..=1.0).contains(&value) {
            return Err(MatchError::InvalidOdds {
                reason: format!("{} must be between 0 and 1, got {}", name, value),
            }
            .into());
        }
    }

    let total = odds.total();
    if total < settings.min_odds_total || total > settings.max_odds_total {
        return Err(MatchError::InvalidOdds {
            reason: format!(
                "probabilities should roughly sum to 1, got {:.4}",
                total
            ),
        }
        .into());
    }

    Ok(())
}

/// Trimmed venue; blank venues are rejected
pub fn normalize_venue(venue: &str) -> Result<String> {
    let trimmed = venue.trim();
    if trimmed.is_empty() {
        return Err(MatchError::Validation {
            reason: "venue is required".to_string(),
        }
        .into());
    }
    Ok(trimmed.to_string())
}

/// Minimum starters per side and no player listed twice across the match
pub fn check_rosters(
    home: &[PlayerSelection],
    away: &[PlayerSelection],
    min_starters: usize,
) -> Result<()> {
    for (side, players) in [(Side::Home, home), (Side::Away, away)] {
        let starters = players.iter().filter(|p| p.starter).count();
        if starters < min_starters {
            return Err(MatchError::InvalidRoster {
                reason: format!(
                    "{} side needs at least {} starters, got {}",
                    side, min_starters, starters
                ),
            }
            .into());
        }
    }

    let mut seen = HashSet::new();
    for selection in home.iter().chain(away.iter()) {
        if !seen.insert(selection.player) {
            return Err(MatchError::InvalidRoster {
                reason: format!("player {} is listed more than once", selection.player),
            }
            .into());
        }
    }

    Ok(())
}
