//! Match reconciliation service
//!
//! Orchestrates a submission end to end: validation, the same-day conflict
//! check, reference lookups, rating, roster diffing and one atomic commit.
//! Read paths resolve team and player references for display.

use crate::config::RatingSettings;
use crate::error::{error_kind, MatchError, Result};
use crate::metrics::MetricsCollector;
use crate::rating::RatingCalculator;
use crate::reconcile::roster::HistoryPlan;
use crate::reconcile::validation::{DraftValidator, ValidatedMatch};
use crate::store::{CommitSummary, MatchStore, UnitOfWork};
use crate::types::{
    ExistingMatchDetails, Match, MatchDraft, MatchId, MatchRating, MatchType, Player, PlayerId,
    PlayerSummary, RatingChanges, ResolvedMatch, ResolvedSelection, ResolvedTeamEntry, Side,
    TeamAvailability, TeamEntry, TeamId, TeamRef, TeamSummary, UNKNOWN_TEAM,
};
use crate::utils::{current_timestamp, generate_match_id};
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Display name used when a listed player no longer exists
pub const UNKNOWN_PLAYER: &str = "Unknown Player";

/// Outcome of a committed create or edit
#[derive(Debug, Clone, PartialEq)]
pub struct MatchSubmission {
    pub resolved: ResolvedMatch,
    pub rating_changes: RatingChanges,
    pub history: CommitSummary,
}

/// The reconciliation service
#[derive(Clone)]
pub struct MatchService {
    /// Persistence collaborator
    store: Arc<dyn MatchStore>,
    /// Rating calculator for submitted results
    calculator: Arc<dyn RatingCalculator>,
    /// Store-independent submission checks
    validator: DraftValidator,
    /// Metrics collector for submissions and rejections
    metrics_collector: Arc<MetricsCollector>,
}

impl MatchService {
    pub fn new(
        store: Arc<dyn MatchStore>,
        calculator: Arc<dyn RatingCalculator>,
        settings: RatingSettings,
        metrics_collector: Arc<MetricsCollector>,
    ) -> Self {
        Self {
            store,
            calculator,
            validator: DraftValidator::new(settings),
            metrics_collector,
        }
    }

    pub fn store(&self) -> Arc<dyn MatchStore> {
        self.store.clone()
    }

    pub fn calculator(&self) -> Arc<dyn RatingCalculator> {
        self.calculator.clone()
    }

    /// Validate, rate and persist a new match together with one history
    /// entry per starter
    pub async fn create_match(&self, draft: MatchDraft) -> Result<MatchSubmission> {
        let timer = self.metrics_collector.start_timer();
        let result = self.create_inner(draft).await;

        match &result {
            Ok(submission) => {
                self.metrics_collector
                    .record_match_created(submission.resolved.match_type, timer.stop());
                info!(
                    "Match {} created - {} vs {}, rating changes: {:+} / {:+}",
                    submission.resolved.id,
                    submission.resolved.home_team.team_name,
                    submission.resolved.away_team.team_name,
                    submission.rating_changes.home,
                    submission.rating_changes.away
                );
            }
            Err(e) => self.record_failure("create", e),
        }

        result
    }

    async fn create_inner(&self, draft: MatchDraft) -> Result<MatchSubmission> {
        let now = current_timestamp();
        let match_type = self.validator.check_header(&draft, now)?;
        self.ensure_teams_free(
            match_type,
            [draft.home_team.team, draft.away_team.team],
            draft.date.date_naive(),
            None,
        )
        .await?;
        let validated = self.validator.check_body(&draft, match_type)?;
        self.ensure_references_exist(&validated).await?;

        let document = self.rate(generate_match_id(), &validated, now, now);
        let plan = HistoryPlan::for_match(None, &document);

        let mut unit = UnitOfWork::begin();
        unit.insert_match(document.clone());
        plan.stage(&mut unit, document.id, document.date);

        let history = self.commit(unit).await?;
        self.finish(document, history).await
    }

    /// Validate and rate new data for an existing match, then replace it
    /// and reconcile every affected history entry in one commit
    pub async fn edit_match(&self, match_id: MatchId, draft: MatchDraft) -> Result<MatchSubmission> {
        let timer = self.metrics_collector.start_timer();
        let result = self.edit_inner(match_id, draft).await;

        match &result {
            Ok(submission) => {
                self.metrics_collector
                    .record_match_edited(submission.resolved.match_type, timer.stop());
                info!(
                    "Match {} edited - {} history pulls, {} upserts",
                    match_id, submission.history.history_pulled, submission.history.history_upserted
                );
            }
            Err(e) => self.record_failure("edit", e),
        }

        result
    }

    async fn edit_inner(&self, match_id: MatchId, draft: MatchDraft) -> Result<MatchSubmission> {
        let now = current_timestamp();
        let validated = self.validator.validate(&draft, now)?;

        let existing = self
            .store
            .find_match(match_id)
            .await?
            .ok_or_else(|| MatchError::MatchNotFound {
                match_id: match_id.to_string(),
            })?;

        self.ensure_teams_free(
            validated.match_type,
            [validated.home.team.id(), validated.away.team.id()],
            validated.date.date_naive(),
            Some(match_id),
        )
        .await?;
        self.ensure_references_exist(&validated).await?;

        let document = self.rate(match_id, &validated, existing.created_at, now);
        let plan = HistoryPlan::for_match(Some(&existing), &document);
        debug!(
            "Edit plan for match {}: {} pulls, {} upserts",
            match_id,
            plan.pulls.len(),
            plan.upserts.len()
        );

        let mut unit = UnitOfWork::begin();
        unit.replace_match(document.clone());
        plan.stage(&mut unit, document.id, document.date);

        let history = self.commit(unit).await?;
        self.finish(document, history).await
    }

    /// A match with its references resolved
    pub async fn get_match(&self, match_id: MatchId) -> Result<ResolvedMatch> {
        let result = self.get_match_inner(match_id).await;
        if let Err(e) = &result {
            self.record_failure("get_match", e);
        }
        result
    }

    async fn get_match_inner(&self, match_id: MatchId) -> Result<ResolvedMatch> {
        let document = self
            .store
            .find_match(match_id)
            .await?
            .ok_or_else(|| MatchError::MatchNotFound {
                match_id: match_id.to_string(),
            })?;
        self.resolve(&document).await
    }

    /// Whether a team already plays a match of `match_type` on `day`
    pub async fn check_team_availability(
        &self,
        team_id: TeamId,
        day: NaiveDate,
        match_type: MatchType,
    ) -> Result<TeamAvailability> {
        let team = self
            .store
            .find_team(TeamRef::new(match_type, team_id))
            .await?
            .ok_or_else(|| MatchError::TeamNotFound {
                team_id: team_id.to_string(),
            })?;

        let existing = self
            .store
            .find_match_on_day(match_type, team_id, day, None)
            .await?;

        Ok(TeamAvailability {
            has_match: existing.is_some(),
            team_name: team.name,
            existing_match_details: existing.map(|document| ExistingMatchDetails {
                is_home_team: document.side_of(team_id) == Some(Side::Home),
                venue: document.venue,
                date: document.date,
            }),
        })
    }

    /// Every match the team played, newest first
    pub async fn matches_for_team(&self, team_id: TeamId) -> Result<Vec<Match>> {
        self.store.find_matches_for_team(team_id).await
    }

    /// A player with their full rating history
    pub async fn get_player(&self, player_id: PlayerId) -> Result<Player> {
        Ok(self
            .store
            .find_player(player_id)
            .await?
            .ok_or_else(|| MatchError::PlayerNotFound {
                player_id: player_id.to_string(),
            })?)
    }

    /// Reject when either team already has a match of this type on `day`.
    /// The home team is reported when both conflict.
    async fn ensure_teams_free(
        &self,
        match_type: MatchType,
        teams: [TeamId; 2],
        day: NaiveDate,
        excluding: Option<MatchId>,
    ) -> Result<()> {
        for team_id in teams {
            if let Some(conflict) = self
                .store
                .find_match_on_day(match_type, team_id, day, excluding)
                .await?
            {
                let team_name = self
                    .store
                    .find_team(TeamRef::new(match_type, team_id))
                    .await?
                    .map(|team| team.name)
                    .unwrap_or_else(|| UNKNOWN_TEAM.to_string());

                debug!(
                    "Team {} already plays match {} on {}",
                    team_id, conflict.id, day
                );
                return Err(MatchError::TeamUnavailable {
                    team_name,
                    date: day.format("%Y-%m-%d").to_string(),
                }
                .into());
            }
        }
        Ok(())
    }

    async fn ensure_references_exist(&self, validated: &ValidatedMatch) -> Result<()> {
        for team in [validated.home.team, validated.away.team] {
            if self.store.find_team(team).await?.is_none() {
                return Err(MatchError::TeamNotFound {
                    team_id: team.id().to_string(),
                }
                .into());
            }
        }

        let ids = validated.player_ids();
        let known = self.store.find_players(&ids).await?;
        if let Some(missing) = ids.iter().find(|id| !known.contains_key(id)) {
            return Err(MatchError::PlayerNotFound {
                player_id: missing.to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// Build the match document with server-computed rating changes
    fn rate(
        &self,
        match_id: MatchId,
        validated: &ValidatedMatch,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Match {
        let timer = self.metrics_collector.start_timer();
        let outcome =
            self.calculator
                .rate_match(&validated.odds, validated.home.score, validated.away.score);
        self.metrics_collector.record_rating_calculation(timer.stop());

        debug!(
            "Rated match {} - home expected {:.4} actual {}, away expected {:.4} actual {}",
            match_id,
            outcome.home.expected_points,
            outcome.home.actual_points,
            outcome.away.expected_points,
            outcome.away.actual_points
        );

        let entry = |side: Side| {
            let validated_side = validated.side(side);
            TeamEntry {
                team: validated_side.team,
                score: validated_side.score,
                players: validated_side.players.clone(),
                rating_change: outcome.side(side).rating_change,
            }
        };

        Match {
            id: match_id,
            match_type: validated.match_type,
            date: validated.date,
            venue: validated.venue.clone(),
            home_team: entry(Side::Home),
            away_team: entry(Side::Away),
            odds: validated.odds,
            rating: MatchRating {
                home_team_rating: outcome.home.rating_change,
                away_team_rating: outcome.away.rating_change,
            },
            created_at,
            updated_at,
        }
    }

    async fn commit(&self, unit: UnitOfWork) -> Result<CommitSummary> {
        let unit_id = unit.id();
        let staged = unit.len();
        let timer = self.metrics_collector.start_timer();

        let summary = self.store.commit(unit).await.map_err(|e| {
            warn!(
                "Commit of unit {} ({} mutations) failed: {}",
                unit_id, staged, e
            );
            e
        })?;

        self.metrics_collector.record_commit(&summary, timer.stop());
        Ok(summary)
    }

    async fn finish(&self, document: Match, history: CommitSummary) -> Result<MatchSubmission> {
        let rating_changes = RatingChanges {
            home: document.home_team.rating_change,
            away: document.away_team.rating_change,
        };
        let resolved = self.resolve(&document).await?;
        Ok(MatchSubmission {
            resolved,
            rating_changes,
            history,
        })
    }

    /// Populate team and player references of a match
    pub async fn resolve(&self, document: &Match) -> Result<ResolvedMatch> {
        let player_ids: Vec<PlayerId> = document
            .home_team
            .players
            .iter()
            .chain(document.away_team.players.iter())
            .map(|selection| selection.player)
            .collect();
        let players = self.store.find_players(&player_ids).await?;

        Ok(ResolvedMatch {
            id: document.id,
            match_type: document.match_type,
            date: document.date,
            venue: document.venue.clone(),
            home_team: self.resolve_entry(&document.home_team, &players).await?,
            away_team: self.resolve_entry(&document.away_team, &players).await?,
            odds: document.odds,
            rating: document.rating,
            created_at: document.created_at,
            updated_at: document.updated_at,
        })
    }

    async fn resolve_entry(
        &self,
        entry: &TeamEntry,
        players: &HashMap<PlayerId, Player>,
    ) -> Result<ResolvedTeamEntry> {
        let team = self
            .store
            .find_team(entry.team)
            .await?
            .unwrap_or_else(|| TeamSummary {
                id: entry.team.id(),
                kind: entry.team.match_type(),
                name: UNKNOWN_TEAM.to_string(),
            });

        let selections = entry
            .players
            .iter()
            .map(|selection| ResolvedSelection {
                player: players
                    .get(&selection.player)
                    .map(PlayerSummary::from)
                    .unwrap_or_else(|| PlayerSummary {
                        id: selection.player,
                        name: UNKNOWN_PLAYER.to_string(),
                        position: None,
                    }),
                starter: selection.starter,
            })
            .collect();

        Ok(ResolvedTeamEntry {
            team_name: team.name.clone(),
            team,
            score: entry.score,
            players: selections,
            rating_change: entry.rating_change,
        })
    }

    fn record_failure(&self, operation: &str, error: &anyhow::Error) {
        let kind = error_kind(error);
        self.metrics_collector.record_rejection(operation, kind);

        if kind.status_code() >= 500 {
            error!("{} failed: {:#}", operation, error);
        } else {
            debug!("{} rejected with {}: {}", operation, kind, error);
        }
    }
}
