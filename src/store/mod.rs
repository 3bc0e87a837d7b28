//! Persistence interface for matches, teams and players
//!
//! The reconciliation service only talks to the `MatchStore` trait: lookups
//! by id, the queries the submission rules need, and atomic commits of a
//! `UnitOfWork`.

pub mod memory;
pub mod seed;
pub mod unit_of_work;

use crate::error::Result;
use crate::types::{Match, MatchId, MatchType, Player, PlayerId, TeamId, TeamRef, TeamSummary};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// Re-export commonly used types
pub use memory::InMemoryStore;
pub use seed::SeedData;
pub use unit_of_work::{CommitSummary, Mutation, UnitOfWork};

/// Document counts reported by health checks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStats {
    pub matches: usize,
    pub players: usize,
    pub clubs: usize,
    pub national_teams: usize,
}

/// Trait for match persistence operations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MatchStore: Send + Sync {
    /// Get a match by id
    async fn find_match(&self, id: MatchId) -> Result<Option<Match>>;

    /// All matches the team played home or away, newest first
    async fn find_matches_for_team(&self, team_id: TeamId) -> Result<Vec<Match>>;

    /// A match of `match_type` on `day` involving the team on either side,
    /// ignoring the match `excluding`
    async fn find_match_on_day(
        &self,
        match_type: MatchType,
        team_id: TeamId,
        day: NaiveDate,
        excluding: Option<MatchId>,
    ) -> Result<Option<Match>>;

    /// Resolve a team reference against the collection its variant names
    async fn find_team(&self, team: TeamRef) -> Result<Option<TeamSummary>>;

    /// Get a player by id
    async fn find_player(&self, id: PlayerId) -> Result<Option<Player>>;

    /// Get the players that exist among `ids`
    async fn find_players(&self, ids: &[PlayerId]) -> Result<HashMap<PlayerId, Player>>;

    /// Apply every mutation of the unit, or none of them
    async fn commit(&self, unit: UnitOfWork) -> Result<CommitSummary>;

    /// Cheap liveness check returning document counts
    async fn health_check(&self) -> Result<StoreStats>;
}
