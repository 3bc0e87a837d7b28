//! In-memory document store
//!
//! Holds every collection behind one `RwLock`. Commits pre-check all staged
//! mutations under the write lock and only then apply them, so a rejected
//! unit leaves no trace. Match constraints (unique key, one match per team
//! per day and type) are enforced here against the stored state.

use crate::error::{MatchError, Result};
use crate::store::seed::SeedData;
use crate::store::unit_of_work::{CommitSummary, Mutation, UnitOfWork};
use crate::store::{MatchStore, StoreStats};
use crate::types::{
    ClubTeam, Match, MatchId, MatchType, NationalTeam, Player, PlayerId, RatingHistoryEntry,
    TeamId, TeamRef, TeamSummary, UNKNOWN_TEAM,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info, warn};

/// Key of the unique match index: calendar day, venue (trimmed,
/// case-insensitive), unordered team pair and match type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct MatchKey {
    day: NaiveDate,
    venue: String,
    teams: (TeamId, TeamId),
    match_type: MatchType,
}

impl MatchKey {
    fn of(document: &Match) -> Self {
        let home = document.home_team.team.id();
        let away = document.away_team.team.id();
        let teams = if home <= away { (home, away) } else { (away, home) };
        Self {
            day: document.calendar_day(),
            venue: document.venue.trim().to_lowercase(),
            teams,
            match_type: document.match_type,
        }
    }
}

#[derive(Debug, Default)]
struct Documents {
    matches: HashMap<MatchId, Match>,
    players: HashMap<PlayerId, Player>,
    clubs: HashMap<TeamId, ClubTeam>,
    national_teams: HashMap<TeamId, NationalTeam>,
}

impl Documents {
    fn team_name(&self, team: TeamRef) -> String {
        let name = match team {
            TeamRef::Club(id) => self.clubs.get(&id).map(|club| club.name.clone()),
            TeamRef::National(id) => self.national_teams.get(&id).map(|team| team.display_name()),
        };
        name.unwrap_or_else(|| UNKNOWN_TEAM.to_string())
    }

    /// Drop every history entry of `player` for `match_id`; returns how many went
    fn pull_history(&mut self, player: PlayerId, match_id: MatchId) -> Option<usize> {
        let record = self.players.get_mut(&player)?;
        let before = record.rating_history.len();
        record
            .rating_history
            .retain(|entry| entry.match_id != Some(match_id));
        Some(before - record.rating_history.len())
    }
}

/// First team of `document` that already plays another match of the same
/// type on the same calendar day. Home is checked before away.
fn busy_team<'a>(document: &Match, others: impl Iterator<Item = &'a Match>) -> Option<TeamRef> {
    let day = document.calendar_day();
    let same_day: Vec<&Match> = others
        .filter(|other| {
            other.id != document.id
                && other.match_type == document.match_type
                && other.calendar_day() == day
        })
        .collect();

    [document.home_team.team, document.away_team.team]
        .into_iter()
        .find(|team| same_day.iter().any(|other| other.side_of(team.id()).is_some()))
}

/// Counts of reference documents loaded from a seed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub clubs: usize,
    pub national_teams: usize,
    pub players: usize,
}

/// In-memory `MatchStore` implementation
#[derive(Debug, Default)]
pub struct InMemoryStore {
    documents: RwLock<Documents>,
}

impl InMemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store preloaded with reference data
    pub fn with_seed(seed: SeedData) -> Result<Self> {
        let store = Self::new();
        store.load_seed(seed)?;
        Ok(store)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Documents>> {
        self.documents.read().map_err(|_| {
            MatchError::InternalError {
                message: "Failed to acquire documents read lock".to_string(),
            }
            .into()
        })
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Documents>> {
        self.documents.write().map_err(|_| {
            MatchError::InternalError {
                message: "Failed to acquire documents write lock".to_string(),
            }
            .into()
        })
    }

    /// Insert or replace reference data
    pub fn load_seed(&self, seed: SeedData) -> Result<SeedSummary> {
        let mut documents = self.write()?;
        let summary = SeedSummary {
            clubs: seed.clubs.len(),
            national_teams: seed.national_teams.len(),
            players: seed.players.len(),
        };

        for club in seed.clubs {
            documents.clubs.insert(club.id, club);
        }
        for team in seed.national_teams {
            documents.national_teams.insert(team.id, team);
        }
        for player in seed.players {
            documents.players.insert(player.id, player);
        }

        info!(
            "Loaded seed data - clubs: {}, national teams: {}, players: {}",
            summary.clubs, summary.national_teams, summary.players
        );
        Ok(summary)
    }

    pub fn insert_club(&self, club: ClubTeam) -> Result<()> {
        self.write()?.clubs.insert(club.id, club);
        Ok(())
    }

    pub fn insert_national_team(&self, team: NationalTeam) -> Result<()> {
        self.write()?.national_teams.insert(team.id, team);
        Ok(())
    }

    pub fn insert_player(&self, player: Player) -> Result<()> {
        self.write()?.players.insert(player.id, player);
        Ok(())
    }

    /// Reject the unit if any mutation would violate a store constraint
    fn check_unit(documents: &Documents, mutations: &[Mutation]) -> Result<()> {
        let mut staged_keys: HashMap<MatchKey, MatchId> = HashMap::new();
        let mut staged_ids: HashSet<MatchId> = HashSet::new();
        let mut staged_matches: Vec<&Match> = Vec::new();

        for mutation in mutations {
            match mutation {
                Mutation::InsertMatch(document) | Mutation::ReplaceMatch(document) => {
                    let is_insert = matches!(mutation, Mutation::InsertMatch(_));
                    let exists = documents.matches.contains_key(&document.id)
                        || staged_ids.contains(&document.id);

                    if is_insert && exists {
                        return Err(MatchError::InternalError {
                            message: format!("Match {} already exists", document.id),
                        }
                        .into());
                    }
                    if !is_insert && !exists {
                        return Err(MatchError::MatchNotFound {
                            match_id: document.id.to_string(),
                        }
                        .into());
                    }

                    let key = MatchKey::of(document);
                    let clashes_stored = documents
                        .matches
                        .values()
                        .any(|other| other.id != document.id && MatchKey::of(other) == key);
                    let clashes_staged = staged_keys
                        .get(&key)
                        .is_some_and(|other| *other != document.id);
                    if clashes_stored || clashes_staged {
                        return Err(MatchError::DuplicateMatch.into());
                    }

                    let others = documents
                        .matches
                        .values()
                        .chain(staged_matches.iter().copied());
                    if let Some(team) = busy_team(document, others) {
                        return Err(MatchError::TeamUnavailable {
                            team_name: documents.team_name(team),
                            date: document.calendar_day().format("%Y-%m-%d").to_string(),
                        }
                        .into());
                    }

                    staged_keys.insert(key, document.id);
                    staged_ids.insert(document.id);
                    staged_matches.push(document);
                }
                Mutation::PullHistory { .. } => {}
                Mutation::UpsertHistory { player, entry } => {
                    if !documents.players.contains_key(player) {
                        return Err(MatchError::PlayerNotFound {
                            player_id: player.to_string(),
                        }
                        .into());
                    }
                    if entry.match_id.is_none() {
                        return Err(MatchError::InternalError {
                            message: format!(
                                "History upsert for player {} has no match id",
                                player
                            ),
                        }
                        .into());
                    }
                }
            }
        }

        Ok(())
    }

    fn apply(documents: &mut Documents, mutation: Mutation, summary: &mut CommitSummary) {
        let label = mutation.label();
        match mutation {
            Mutation::InsertMatch(document) => {
                documents.matches.insert(document.id, document);
                summary.matches_written += 1;
            }
            Mutation::ReplaceMatch(document) => {
                // Reconcile against the stored starters; the unit was planned
                // from a read that another commit may have superseded
                let stale: Vec<PlayerId> = match documents.matches.get(&document.id) {
                    Some(stored) => stored
                        .starters()
                        .filter(|player| !document.is_starter(*player))
                        .collect(),
                    None => Vec::new(),
                };
                for player in stale {
                    summary.history_pulled +=
                        documents.pull_history(player, document.id).unwrap_or(0);
                }

                documents.matches.insert(document.id, document);
                summary.matches_written += 1;
            }
            Mutation::PullHistory { player, match_id } => {
                match documents.pull_history(player, match_id) {
                    Some(pulled) => summary.history_pulled += pulled,
                    None => warn!(
                        "Skipping {} for unknown player {} (match {})",
                        label, player, match_id
                    ),
                }
            }
            Mutation::UpsertHistory { player, entry } => {
                if let Some(record) = documents.players.get_mut(&player) {
                    upsert_history_entry(&mut record.rating_history, entry);
                    summary.history_upserted += 1;
                }
            }
        }
    }
}

/// Replace the entry for `entry.match_id` in place (dropping any extra
/// copies) or append it
fn upsert_history_entry(history: &mut Vec<RatingHistoryEntry>, entry: RatingHistoryEntry) {
    let match_id = entry.match_id;
    match history.iter().position(|existing| existing.match_id == match_id) {
        Some(index) => {
            history[index] = entry;
            let mut position = 0;
            history.retain(|existing| {
                let keep = existing.match_id != match_id || position == index;
                position += 1;
                keep
            });
        }
        None => history.push(entry),
    }
}

#[async_trait]
impl MatchStore for InMemoryStore {
    async fn find_match(&self, id: MatchId) -> Result<Option<Match>> {
        Ok(self.read()?.matches.get(&id).cloned())
    }

    async fn find_matches_for_team(&self, team_id: TeamId) -> Result<Vec<Match>> {
        let documents = self.read()?;
        let mut matches: Vec<Match> = documents
            .matches
            .values()
            .filter(|document| document.side_of(team_id).is_some())
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(matches)
    }

    async fn find_match_on_day(
        &self,
        match_type: MatchType,
        team_id: TeamId,
        day: NaiveDate,
        excluding: Option<MatchId>,
    ) -> Result<Option<Match>> {
        let documents = self.read()?;
        Ok(documents
            .matches
            .values()
            .filter(|document| {
                document.match_type == match_type
                    && document.calendar_day() == day
                    && Some(document.id) != excluding
                    && document.side_of(team_id).is_some()
            })
            .min_by_key(|document| document.date)
            .cloned())
    }

    async fn find_team(&self, team: TeamRef) -> Result<Option<TeamSummary>> {
        let documents = self.read()?;
        Ok(match team {
            TeamRef::Club(id) => documents.clubs.get(&id).map(TeamSummary::from),
            TeamRef::National(id) => documents.national_teams.get(&id).map(TeamSummary::from),
        })
    }

    async fn find_player(&self, id: PlayerId) -> Result<Option<Player>> {
        Ok(self.read()?.players.get(&id).cloned())
    }

    async fn find_players(&self, ids: &[PlayerId]) -> Result<HashMap<PlayerId, Player>> {
        let documents = self.read()?;
        Ok(ids
            .iter()
            .filter_map(|id| documents.players.get(id).map(|player| (*id, player.clone())))
            .collect())
    }

    async fn commit(&self, unit: UnitOfWork) -> Result<CommitSummary> {
        let unit_id = unit.id();
        let mut documents = self.write()?;

        Self::check_unit(&documents, unit.mutations())?;

        let mut summary = CommitSummary::default();
        for mutation in unit.into_mutations() {
            Self::apply(&mut documents, mutation, &mut summary);
        }

        debug!(
            "Committed unit of work {} - matches: {}, pulled: {}, upserted: {}",
            unit_id, summary.matches_written, summary.history_pulled, summary.history_upserted
        );
        Ok(summary)
    }

    async fn health_check(&self) -> Result<StoreStats> {
        let documents = self.read()?;
        Ok(StoreStats {
            matches: documents.matches.len(),
            players: documents.players.len(),
            clubs: documents.clubs.len(),
            national_teams: documents.national_teams.len(),
        })
    }
}
