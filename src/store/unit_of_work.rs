//! Staged mutations committed atomically by a `MatchStore`
//!
//! A submission stages its match write and every rating-history change in
//! one `UnitOfWork`; the store applies all of them or none.

use crate::types::{Match, MatchId, PlayerId, RatingHistoryEntry};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single staged write
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Mutation {
    /// Insert a new match document
    InsertMatch(Match),
    /// Overwrite an existing match document
    ReplaceMatch(Match),
    /// Remove every history entry of `player` that points at `match_id`
    PullHistory { player: PlayerId, match_id: MatchId },
    /// Update the player's entry for `entry.match_id` in place, or append it
    UpsertHistory {
        player: PlayerId,
        entry: RatingHistoryEntry,
    },
}

impl Mutation {
    /// Label used in logs and metrics
    pub fn label(&self) -> &'static str {
        match self {
            Mutation::InsertMatch(_) => "insert_match",
            Mutation::ReplaceMatch(_) => "replace_match",
            Mutation::PullHistory { .. } => "pull_history",
            Mutation::UpsertHistory { .. } => "upsert_history",
        }
    }
}

/// Ordered set of mutations applied as one transaction
#[derive(Debug, Clone, PartialEq)]
pub struct UnitOfWork {
    id: Uuid,
    mutations: Vec<Mutation>,
}

impl UnitOfWork {
    /// Start an empty unit of work
    pub fn begin() -> Self {
        Self {
            id: Uuid::new_v4(),
            mutations: Vec::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn insert_match(&mut self, document: Match) -> &mut Self {
        self.mutations.push(Mutation::InsertMatch(document));
        self
    }

    pub fn replace_match(&mut self, document: Match) -> &mut Self {
        self.mutations.push(Mutation::ReplaceMatch(document));
        self
    }

    pub fn pull_history(&mut self, player: PlayerId, match_id: MatchId) -> &mut Self {
        self.mutations
            .push(Mutation::PullHistory { player, match_id });
        self
    }

    pub fn upsert_history(&mut self, player: PlayerId, entry: RatingHistoryEntry) -> &mut Self {
        self.mutations
            .push(Mutation::UpsertHistory { player, entry });
        self
    }

    pub fn mutations(&self) -> &[Mutation] {
        &self.mutations
    }

    pub fn into_mutations(self) -> Vec<Mutation> {
        self.mutations
    }

    pub fn len(&self) -> usize {
        self.mutations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mutations.is_empty()
    }

    /// Discard everything staged so far
    pub fn rollback(self) {
        tracing::debug!(
            "Rolled back unit of work {} with {} staged mutations",
            self.id,
            self.mutations.len()
        );
    }
}

/// Counts of what a commit applied
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitSummary {
    pub matches_written: usize,
    pub history_pulled: usize,
    pub history_upserted: usize,
}
