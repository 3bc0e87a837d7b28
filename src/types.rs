//! Common types used throughout the match rating service

use crate::error::MatchError;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// Unique identifier for matches
pub type MatchId = Uuid;

/// Unique identifier for players
pub type PlayerId = Uuid;

/// Unique identifier for clubs and national teams
pub type TeamId = Uuid;

/// Display name used when a team reference cannot be resolved
pub const UNKNOWN_TEAM: &str = "Unknown Team";

/// Kind of competition a match belongs to; decides which collection its
/// team references point into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchType {
    ClubTeam,
    NationalTeam,
}

impl std::fmt::Display for MatchType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchType::ClubTeam => write!(f, "ClubTeam"),
            MatchType::NationalTeam => write!(f, "NationalTeam"),
        }
    }
}

impl FromStr for MatchType {
    type Err = MatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ClubTeam" => Ok(MatchType::ClubTeam),
            "NationalTeam" => Ok(MatchType::NationalTeam),
            other => Err(MatchError::InvalidType {
                value: other.to_string(),
            }),
        }
    }
}

/// Reference to the team playing one side of a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id")]
pub enum TeamRef {
    Club(TeamId),
    National(TeamId),
}

impl TeamRef {
    pub fn new(match_type: MatchType, id: TeamId) -> Self {
        match match_type {
            MatchType::ClubTeam => TeamRef::Club(id),
            MatchType::NationalTeam => TeamRef::National(id),
        }
    }

    pub fn id(&self) -> TeamId {
        match self {
            TeamRef::Club(id) | TeamRef::National(id) => *id,
        }
    }

    pub fn match_type(&self) -> MatchType {
        match self {
            TeamRef::Club(_) => MatchType::ClubTeam,
            TeamRef::National(_) => MatchType::NationalTeam,
        }
    }
}

/// Bookmaker outcome probabilities from the home side's perspective
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Odds {
    pub home_win: f64,
    pub draw: f64,
    pub away_win: f64,
}

impl Odds {
    pub fn total(&self) -> f64 {
        self.home_win + self.draw + self.away_win
    }
}

/// Which side of a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Home,
    Away,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Home => write!(f, "home"),
            Side::Away => write!(f, "away"),
        }
    }
}

/// A player picked for one side of a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSelection {
    pub player: PlayerId,
    #[serde(default)]
    pub starter: bool,
}

/// One side of a persisted match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamEntry {
    pub team: TeamRef,
    pub score: u32,
    pub players: Vec<PlayerSelection>,
    pub rating_change: f64,
}

impl TeamEntry {
    /// Ids of the players in the starting lineup
    pub fn starters(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.players.iter().filter(|p| p.starter).map(|p| p.player)
    }
}

/// Rating deltas of both sides, mirrored onto the match document
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRating {
    pub home_team_rating: f64,
    pub away_team_rating: f64,
}

/// A persisted match document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub id: MatchId,
    #[serde(rename = "type")]
    pub match_type: MatchType,
    pub date: DateTime<Utc>,
    pub venue: String,
    pub home_team: TeamEntry,
    pub away_team: TeamEntry,
    pub odds: Odds,
    pub rating: MatchRating,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Match {
    pub fn calendar_day(&self) -> NaiveDate {
        self.date.date_naive()
    }

    /// Starters of both sides, home first
    pub fn starters(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.home_team.starters().chain(self.away_team.starters())
    }

    pub fn is_starter(&self, player: PlayerId) -> bool {
        self.starters().any(|starter| starter == player)
    }

    /// Side on which the team plays in this match, if any
    pub fn side_of(&self, team_id: TeamId) -> Option<Side> {
        if self.home_team.team.id() == team_id {
            Some(Side::Home)
        } else if self.away_team.team.id() == team_id {
            Some(Side::Away)
        } else {
            None
        }
    }
}

/// One side of a submitted match, as sent by the client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftTeamEntry {
    pub team: TeamId,
    pub score: u32,
    #[serde(default)]
    pub players: Vec<PlayerSelection>,
}

/// A submitted match prior to validation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchDraft {
    /// Kept as text so unknown values surface as INVALID_TYPE
    #[serde(rename = "type")]
    pub match_type: String,
    #[serde(with = "crate::utils::match_date")]
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub venue: String,
    pub home_team: DraftTeamEntry,
    pub away_team: DraftTeamEntry,
    pub odds: Odds,
}

/// Origin of a rating history entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RatingEntryType {
    #[default]
    Match,
    Manual,
}

/// A single rating adjustment recorded against a player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingHistoryEntry {
    pub date: DateTime<Utc>,
    pub new_rating: f64,
    #[serde(rename = "type", default)]
    pub entry_type: RatingEntryType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_id: Option<MatchId>,
}

impl RatingHistoryEntry {
    pub fn for_match(match_id: MatchId, date: DateTime<Utc>, new_rating: f64) -> Self {
        Self {
            date,
            new_rating,
            entry_type: RatingEntryType::Match,
            match_id: Some(match_id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub rating_history: Vec<RatingHistoryEntry>,
}

impl Player {
    /// History entries recorded for the given match
    pub fn entries_for_match(&self, match_id: MatchId) -> impl Iterator<Item = &RatingHistoryEntry> {
        self.rating_history
            .iter()
            .filter(move |entry| entry.match_id == Some(match_id))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TeamStatus {
    #[default]
    Active,
    Inactive,
}

/// Age level of a national team squad
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SquadLevel {
    #[serde(rename = "U-17")]
    U17,
    #[serde(rename = "U-19")]
    U19,
    #[serde(rename = "U-21")]
    U21,
    #[serde(rename = "A")]
    Senior,
}

impl std::fmt::Display for SquadLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SquadLevel::U17 => write!(f, "U-17"),
            SquadLevel::U19 => write!(f, "U-19"),
            SquadLevel::U21 => write!(f, "U-21"),
            SquadLevel::Senior => write!(f, "A"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClubTeam {
    pub id: TeamId,
    pub name: String,
    #[serde(default)]
    pub status: TeamStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NationalTeam {
    pub id: TeamId,
    pub country: String,
    #[serde(rename = "type")]
    pub squad: SquadLevel,
    #[serde(default)]
    pub status: TeamStatus,
}

impl NationalTeam {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.country, self.squad)
    }
}

/// A team resolved from a `TeamRef`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamSummary {
    pub id: TeamId,
    pub kind: MatchType,
    pub name: String,
}

impl From<&ClubTeam> for TeamSummary {
    fn from(club: &ClubTeam) -> Self {
        Self {
            id: club.id,
            kind: MatchType::ClubTeam,
            name: club.name.clone(),
        }
    }
}

impl From<&NationalTeam> for TeamSummary {
    fn from(team: &NationalTeam) -> Self {
        Self {
            id: team.id,
            kind: MatchType::NationalTeam,
            name: team.display_name(),
        }
    }
}

/// Player fields shown inside a resolved match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSummary {
    pub id: PlayerId,
    pub name: String,
    pub position: Option<String>,
}

impl From<&Player> for PlayerSummary {
    fn from(player: &Player) -> Self {
        Self {
            id: player.id,
            name: player.name.clone(),
            position: player.position.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedSelection {
    pub player: PlayerSummary,
    pub starter: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedTeamEntry {
    pub team: TeamSummary,
    pub team_name: String,
    pub score: u32,
    pub players: Vec<ResolvedSelection>,
    pub rating_change: f64,
}

/// A match with its team and player references populated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedMatch {
    pub id: MatchId,
    #[serde(rename = "type")]
    pub match_type: MatchType,
    pub date: DateTime<Utc>,
    pub venue: String,
    pub home_team: ResolvedTeamEntry,
    pub away_team: ResolvedTeamEntry,
    pub odds: Odds,
    pub rating: MatchRating,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Rating changes returned to the client after a submission
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingChanges {
    pub home: f64,
    pub away: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExistingMatchDetails {
    pub venue: String,
    pub date: DateTime<Utc>,
    pub is_home_team: bool,
}

/// Answer to "does this team already play on this day"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamAvailability {
    pub has_match: bool,
    pub team_name: String,
    pub existing_match_details: Option<ExistingMatchDetails>,
}
