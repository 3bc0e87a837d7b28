//! Error types for the match rating service
//!
//! Propagation uses anyhow throughout the crate; `MatchError` carries the
//! classified, client-facing failures that the API layer maps to status
//! codes and error kinds.

use serde::Serialize;

/// Result type alias for convenience
pub type Result<T> = anyhow::Result<T>;

/// Client-facing error classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    InvalidDate,
    InvalidType,
    InvalidOdds,
    SameTeam,
    InvalidRoster,
    ValidationError,
    TeamUnavailable,
    DuplicateMatch,
    MatchNotFound,
    TeamNotFound,
    PlayerNotFound,
    InternalError,
}

impl ErrorKind {
    /// Wire representation, also used as a metrics label
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidDate => "INVALID_DATE",
            ErrorKind::InvalidType => "INVALID_TYPE",
            ErrorKind::InvalidOdds => "INVALID_ODDS",
            ErrorKind::SameTeam => "SAME_TEAM",
            ErrorKind::InvalidRoster => "INVALID_ROSTER",
            ErrorKind::ValidationError => "VALIDATION_ERROR",
            ErrorKind::TeamUnavailable => "TEAM_UNAVAILABLE",
            ErrorKind::DuplicateMatch => "DUPLICATE_MATCH",
            ErrorKind::MatchNotFound => "MATCH_NOT_FOUND",
            ErrorKind::TeamNotFound => "TEAM_NOT_FOUND",
            ErrorKind::PlayerNotFound => "PLAYER_NOT_FOUND",
            ErrorKind::InternalError => "INTERNAL_ERROR",
        }
    }

    /// HTTP status code for this kind
    pub fn status_code(&self) -> u16 {
        match self {
            ErrorKind::InvalidDate
            | ErrorKind::InvalidType
            | ErrorKind::InvalidOdds
            | ErrorKind::SameTeam
            | ErrorKind::InvalidRoster
            | ErrorKind::ValidationError => 400,
            ErrorKind::MatchNotFound | ErrorKind::TeamNotFound | ErrorKind::PlayerNotFound => 404,
            ErrorKind::TeamUnavailable | ErrorKind::DuplicateMatch => 409,
            ErrorKind::InternalError => 500,
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classified failures of match submission and lookup
#[derive(Debug, thiserror::Error)]
pub enum MatchError {
    #[error("Match date must be in the past")]
    InvalidDate,

    #[error("Invalid match type: {value}")]
    InvalidType { value: String },

    #[error("Invalid match odds: {reason}")]
    InvalidOdds { reason: String },

    #[error("Home team and away team cannot be the same")]
    SameTeam,

    #[error("Invalid roster: {reason}")]
    InvalidRoster { reason: String },

    #[error("Validation error: {reason}")]
    Validation { reason: String },

    #[error("{team_name} already has a match scheduled on {date}")]
    TeamUnavailable { team_name: String, date: String },

    #[error("A match between these teams at this venue and date already exists")]
    DuplicateMatch,

    #[error("Match not found: {match_id}")]
    MatchNotFound { match_id: String },

    #[error("Team not found: {team_id}")]
    TeamNotFound { team_id: String },

    #[error("Player not found: {player_id}")]
    PlayerNotFound { player_id: String },

    #[error("Internal service error: {message}")]
    InternalError { message: String },
}

impl MatchError {
    /// Kind of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            MatchError::InvalidDate => ErrorKind::InvalidDate,
            MatchError::InvalidType { .. } => ErrorKind::InvalidType,
            MatchError::InvalidOdds { .. } => ErrorKind::InvalidOdds,
            MatchError::SameTeam => ErrorKind::SameTeam,
            MatchError::InvalidRoster { .. } => ErrorKind::InvalidRoster,
            MatchError::Validation { .. } => ErrorKind::ValidationError,
            MatchError::TeamUnavailable { .. } => ErrorKind::TeamUnavailable,
            MatchError::DuplicateMatch => ErrorKind::DuplicateMatch,
            MatchError::MatchNotFound { .. } => ErrorKind::MatchNotFound,
            MatchError::TeamNotFound { .. } => ErrorKind::TeamNotFound,
            MatchError::PlayerNotFound { .. } => ErrorKind::PlayerNotFound,
            MatchError::InternalError { .. } => ErrorKind::InternalError,
        }
    }
}

/// Classify any propagated error; unclassified failures are internal
pub fn error_kind(error: &anyhow::Error) -> ErrorKind {
    error
        .downcast_ref::<MatchError>()
        .map(MatchError::kind)
        .unwrap_or(ErrorKind::InternalError)
}
