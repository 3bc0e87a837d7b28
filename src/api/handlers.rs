//! Match and player route handlers

use crate::api::error::ApiError;
use crate::error::ErrorKind;
use crate::service::AppState;
use crate::types::{
    Match, MatchDraft, MatchType, Player, RatingChanges, ResolvedMatch, TeamAvailability,
};
use crate::utils::parse_match_date;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

type ApiResult<T> = std::result::Result<T, ApiError>;

/// Response to a successful create
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedMatchResponse {
    #[serde(rename = "match")]
    pub resolved: ResolvedMatch,
    pub rating_changes: RatingChanges,
}

/// Response to a successful edit
#[derive(Debug, Serialize)]
pub struct EditedMatchResponse {
    #[serde(rename = "match")]
    pub resolved: ResolvedMatch,
}

#[derive(Debug, Serialize)]
pub struct TeamMatchesResponse {
    pub matches: Vec<Match>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityQuery {
    pub team_id: Option<String>,
    pub date: Option<String>,
    #[serde(rename = "type")]
    pub match_type: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMatchesQuery {
    pub team_id: Option<String>,
}

fn parse_id(raw: &str, what: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw.trim()).map_err(|_| ApiError::validation(format!("Invalid {}: {}", what, raw)))
}

fn service_error(state: &AppState, error: anyhow::Error) -> ApiError {
    ApiError::from_error(error, state.expose_error_details())
}

/// POST /api/match/matches
pub async fn create_match(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<MatchDraft>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<CreatedMatchResponse>)> {
    let Json(draft) = payload?;
    debug!("Create match request - type: {}, date: {}", draft.match_type, draft.date);

    let submission = state
        .match_service()
        .create_match(draft)
        .await
        .map_err(|e| service_error(&state, e))?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedMatchResponse {
            resolved: submission.resolved,
            rating_changes: submission.rating_changes,
        }),
    ))
}

/// GET /api/match/matches/{id}
pub async fn get_match(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<ResolvedMatch>> {
    let match_id = parse_id(&id, "match id")?;
    let resolved = state
        .match_service()
        .get_match(match_id)
        .await
        .map_err(|e| service_error(&state, e))?;
    Ok(Json(resolved))
}

/// PUT /api/match/edit-match/{match_id}
pub async fn edit_match(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: std::result::Result<Json<MatchDraft>, JsonRejection>,
) -> ApiResult<Json<EditedMatchResponse>> {
    let match_id = parse_id(&id, "match id")?;
    let Json(draft) = payload?;

    let submission = state
        .match_service()
        .edit_match(match_id, draft)
        .await
        .map_err(|e| service_error(&state, e))?;

    Ok(Json(EditedMatchResponse {
        resolved: submission.resolved,
    }))
}

/// GET /api/match/check-team-availability?teamId&date&type
pub async fn check_team_availability(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AvailabilityQuery>,
) -> ApiResult<Json<TeamAvailability>> {
    let (Some(team_id), Some(date), Some(match_type)) = (
        query.team_id.filter(|v| !v.trim().is_empty()),
        query.date.filter(|v| !v.trim().is_empty()),
        query.match_type.filter(|v| !v.trim().is_empty()),
    ) else {
        return Err(ApiError::validation(
            "Missing required parameters. Team ID, date, and type are required.",
        ));
    };

    let day = parse_match_date(&date)
        .ok_or_else(|| {
            ApiError::validation("Invalid date format. Please use YYYY-MM-DD format.")
        })?
        .date_naive();
    let match_type: MatchType = match_type.parse().map_err(|_| {
        ApiError::new(
            ErrorKind::InvalidType,
            "Invalid team type. Must be either ClubTeam or NationalTeam.",
        )
    })?;
    let team_id = parse_id(&team_id, "team id")?;

    let availability = state
        .match_service()
        .check_team_availability(team_id, day, match_type)
        .await
        .map_err(|e| service_error(&state, e))?;
    Ok(Json(availability))
}

/// GET /api/match/get-all-matches?teamId
pub async fn matches_for_team(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TeamMatchesQuery>,
) -> ApiResult<Json<TeamMatchesResponse>> {
    let team_id = query
        .team_id
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ApiError::validation("Team id not passed"))?;
    let team_id = parse_id(&team_id, "team id")?;

    let matches = state
        .match_service()
        .matches_for_team(team_id)
        .await
        .map_err(|e| service_error(&state, e))?;
    Ok(Json(TeamMatchesResponse { matches }))
}

/// GET /api/player/{id}
pub async fn get_player(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Player>> {
    let player_id = parse_id(&id, "player id")?;
    let player = state
        .match_service()
        .get_player(player_id)
        .await
        .map_err(|e| service_error(&state, e))?;
    Ok(Json(player))
}
