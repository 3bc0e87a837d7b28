//! Starter roster diffs and rating-history planning
//!
//! Pure functions: given the previous state of a match (if any) and the new
//! one, work out which history entries to pull and which to upsert.

use crate::store::UnitOfWork;
use crate::types::{Match, MatchId, PlayerId, RatingHistoryEntry, TeamEntry};
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;

/// How one side's starting lineup changed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SideDiff {
    pub removed: BTreeSet<PlayerId>,
    pub added: BTreeSet<PlayerId>,
    pub retained: BTreeSet<PlayerId>,
}

impl SideDiff {
    pub fn between(before: &BTreeSet<PlayerId>, after: &BTreeSet<PlayerId>) -> Self {
        Self {
            removed: before.difference(after).copied().collect(),
            added: after.difference(before).copied().collect(),
            retained: before.intersection(after).copied().collect(),
        }
    }

    fn of_entries(before: Option<&TeamEntry>, after: &TeamEntry) -> Self {
        let before: BTreeSet<PlayerId> = before
            .map(|entry| entry.starters().collect())
            .unwrap_or_default();
        Self::between(&before, &after.starters().collect())
    }
}

/// Starter changes on both sides of a match
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RosterDiff {
    pub home: SideDiff,
    pub away: SideDiff,
}

impl RosterDiff {
    /// Diff the starters of `previous` against those of `next`
    pub fn between(previous: &Match, next: &Match) -> Self {
        Self {
            home: SideDiff::of_entries(Some(&previous.home_team), &next.home_team),
            away: SideDiff::of_entries(Some(&previous.away_team), &next.away_team),
        }
    }

    /// Lineups of a brand new match: everyone is added
    pub fn fresh(next: &Match) -> Self {
        Self {
            home: SideDiff::of_entries(None, &next.home_team),
            away: SideDiff::of_entries(None, &next.away_team),
        }
    }

    /// Players who lost starter status on a side and start on neither side now
    pub fn dropped_starters(&self) -> BTreeSet<PlayerId> {
        let starting_now: BTreeSet<PlayerId> = self
            .home
            .added
            .iter()
            .chain(&self.home.retained)
            .chain(&self.away.added)
            .chain(&self.away.retained)
            .copied()
            .collect();

        self.home
            .removed
            .iter()
            .chain(&self.away.removed)
            .filter(|player| !starting_now.contains(player))
            .copied()
            .collect()
    }
}

/// History writes needed to bring every player in line with a match
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryPlan {
    pub pulls: Vec<PlayerId>,
    pub upserts: Vec<(PlayerId, f64)>,
}

impl HistoryPlan {
    /// Plan the history writes for `next`, optionally replacing `previous`
    pub fn for_match(previous: Option<&Match>, next: &Match) -> Self {
        let diff = match previous {
            Some(previous) => RosterDiff::between(previous, next),
            None => RosterDiff::fresh(next),
        };

        let upserts: Vec<(PlayerId, f64)> = [&next.home_team, &next.away_team]
            .into_iter()
            .flat_map(|entry| entry.starters().map(move |player| (player, entry.rating_change)))
            .collect();

        Self {
            pulls: diff.dropped_starters().into_iter().collect(),
            upserts,
        }
    }

    /// Add the planned writes to a unit of work
    pub fn stage(&self, unit: &mut UnitOfWork, match_id: MatchId, date: DateTime<Utc>) {
        for player in &self.pulls {
            unit.pull_history(*player, match_id);
        }
        for (player, rating_change) in &self.upserts {
            unit.upsert_history(
                *player,
                RatingHistoryEntry::for_match(match_id, date, *rating_change),
            );
        }
    }

    pub fn len(&self) -> usize {
        self.pulls.len() + self.upserts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pulls.is_empty() && self.upserts.is_empty()
    }
}
