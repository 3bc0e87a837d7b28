//! Match lifecycle tests through the HTTP router
//!
//! Create, read, edit and query matches the way a client would, and check
//! that every starter's rating history follows along.

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use crate::fixtures::{
    club_match, create_test_system, default_match, history_entries, lineup, send,
};

fn approx(value: &Value, expected: f64) -> bool {
    value
        .as_f64()
        .map(|v| (v - expected).abs() < 1e-9)
        .unwrap_or(false)
}

async fn create(router: &axum::Router, body: Value) -> (StatusCode, Value) {
    send(router, Method::POST, "/api/match/matches", Some(body)).await
}

#[tokio::test]
async fn test_create_then_get_reproduces_rating_changes() {
    let system = create_test_system();
    let league = &system.league;

    let (status, created) = create(&system.router, default_match(league)).await;
    assert_eq!(status, StatusCode::CREATED, "body: {}", created);

    // 2-1 with odds 0.4 / 0.3 / 0.3: home expected 1.5, away expected 1.2
    assert!(approx(&created["ratingChanges"]["home"], 1.5));
    assert!(approx(&created["ratingChanges"]["away"], -1.2));
    assert_eq!(created["match"]["homeTeam"]["teamName"], "Dinamo Zagreb");
    assert_eq!(created["match"]["awayTeam"]["teamName"], "Hajduk Split");
    assert_eq!(created["match"]["venue"], "Stadion Maksimir");

    let match_id = created["match"]["id"].as_str().unwrap().to_string();
    let (status, fetched) = send(
        &system.router,
        Method::GET,
        &format!("/api/match/matches/{}", match_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        fetched["homeTeam"]["ratingChange"],
        created["match"]["homeTeam"]["ratingChange"]
    );
    assert_eq!(
        fetched["awayTeam"]["ratingChange"],
        created["match"]["awayTeam"]["ratingChange"]
    );
    assert!(approx(&fetched["rating"]["homeTeamRating"], 1.5));
    assert!(approx(&fetched["rating"]["awayTeamRating"], -1.2));
    assert_eq!(fetched["homeTeam"]["players"][0]["player"]["name"], "Player 1");
}

#[tokio::test]
async fn test_create_records_history_for_starters_only() {
    let system = create_test_system();
    let league = &system.league;

    let (status, created) = create(&system.router, default_match(league)).await;
    assert_eq!(status, StatusCode::CREATED);
    let match_id = created["match"]["id"].as_str().unwrap();

    let starter = history_entries(&system.router, league.home_squad[0], match_id).await;
    assert_eq!(starter.len(), 1);
    assert!(approx(&starter[0]["newRating"], 1.5));
    assert_eq!(starter[0]["type"], "match");

    let away_starter = history_entries(&system.router, league.away_squad[2], match_id).await;
    assert_eq!(away_starter.len(), 1);
    assert!(approx(&away_starter[0]["newRating"], -1.2));

    // Fourth player on each side is on the bench
    let bench = history_entries(&system.router, league.home_squad[3], match_id).await;
    assert!(bench.is_empty());
}

#[tokio::test]
async fn test_edit_reconciles_history() {
    let system = create_test_system();
    let league = &system.league;

    let (_, created) = create(&system.router, default_match(league)).await;
    let match_id = created["match"]["id"].as_str().unwrap().to_string();

    // Bench the third home starter, start the fourth, flip the score to 0-1
    let home = json!([
        { "player": league.home_squad[0], "starter": true },
        { "player": league.home_squad[1], "starter": true },
        { "player": league.home_squad[2], "starter": false },
        { "player": league.home_squad[3], "starter": true },
    ]);
    let edited_body = club_match(
        league.dinamo,
        league.hajduk,
        home,
        lineup(&league.away_squad[..4], 3),
        (0, 1),
        (0.4, 0.3, 0.3),
    );

    let (status, edited) = send(
        &system.router,
        Method::PUT,
        &format!("/api/match/edit-match/{}", match_id),
        Some(edited_body.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "body: {}", edited);
    assert!(approx(&edited["match"]["homeTeam"]["ratingChange"], -1.5));
    assert!(approx(&edited["match"]["awayTeam"]["ratingChange"], 1.8));

    let removed = history_entries(&system.router, league.home_squad[2], &match_id).await;
    assert!(removed.is_empty(), "benched starter keeps no entry");

    let retained = history_entries(&system.router, league.home_squad[0], &match_id).await;
    assert_eq!(retained.len(), 1);
    assert!(approx(&retained[0]["newRating"], -1.5));

    let added = history_entries(&system.router, league.home_squad[3], &match_id).await;
    assert_eq!(added.len(), 1);

    // Saving the same state again changes nothing
    let (status, _) = send(
        &system.router,
        Method::PUT,
        &format!("/api/match/edit-match/{}", match_id),
        Some(edited_body),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let retained = history_entries(&system.router, league.home_squad[0], &match_id).await;
    assert_eq!(retained.len(), 1);
}

#[tokio::test]
async fn test_player_switching_sides_keeps_one_entry() {
    let system = create_test_system();
    let league = &system.league;

    let (_, created) = create(&system.router, default_match(league)).await;
    let match_id = created["match"]["id"].as_str().unwrap().to_string();
    let switcher = league.away_squad[0];

    let home = json!([
        { "player": league.home_squad[0], "starter": true },
        { "player": league.home_squad[1], "starter": true },
        { "player": switcher, "starter": true },
    ]);
    let away = lineup(&league.away_squad[1..4], 3);
    let body = club_match(
        league.dinamo,
        league.hajduk,
        home,
        away,
        (2, 1),
        (0.4, 0.3, 0.3),
    );

    let (status, _) = send(
        &system.router,
        Method::PUT,
        &format!("/api/match/edit-match/{}", match_id),
        Some(body),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let entries = history_entries(&system.router, switcher, &match_id).await;
    assert_eq!(entries.len(), 1);
    assert!(approx(&entries[0]["newRating"], 1.5));
}

#[tokio::test]
async fn test_future_date_rejected_and_nothing_stored() {
    let system = create_test_system();
    let league = &system.league;

    let mut body = default_match(league);
    let tomorrow = (Utc::now() + Duration::days(1)).format("%Y-%m-%d").to_string();
    body["date"] = json!(tomorrow);

    let (status, error) = create(&system.router, body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["error"], "INVALID_DATE");

    let (status, listing) = send(
        &system.router,
        Method::GET,
        &format!("/api/match/get-all-matches?teamId={}", league.dinamo),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listing["matches"].as_array().unwrap().len(), 0);

    let (_, player) = send(
        &system.router,
        Method::GET,
        &format!("/api/player/{}", league.home_squad[0]),
        None,
    )
    .await;
    assert_eq!(player["ratingHistory"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_submission_errors_are_classified() {
    let system = create_test_system();
    let league = &system.league;

    let mut odds = default_match(league);
    odds["odds"] = json!({ "homeWin": 0.5, "draw": 0.5, "awayWin": 0.5 });
    let (status, error) = create(&system.router, odds).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["error"], "INVALID_ODDS");

    let mut match_type = default_match(league);
    match_type["type"] = json!("Futsal");
    let (status, error) = create(&system.router, match_type).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["error"], "INVALID_TYPE");

    let mut same_team = default_match(league);
    same_team["awayTeam"]["team"] = json!(league.dinamo);
    let (status, error) = create(&system.router, same_team).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["error"], "SAME_TEAM");

    let mut short_roster = default_match(league);
    short_roster["awayTeam"]["players"] = lineup(&league.away_squad[..2], 1);
    let (status, error) = create(&system.router, short_roster).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["error"], "INVALID_ROSTER");

    let mut unknown_player = default_match(league);
    unknown_player["homeTeam"]["players"][0]["player"] = json!(Uuid::new_v4());
    let (status, error) = create(&system.router, unknown_player).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error["error"], "PLAYER_NOT_FOUND");

    let mut unknown_team = default_match(league);
    unknown_team["awayTeam"]["team"] = json!(Uuid::new_v4());
    let (status, error) = create(&system.router, unknown_team).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error["error"], "TEAM_NOT_FOUND");

    let (status, error) = create(&system.router, json!({ "type": "ClubTeam" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["error"], "VALIDATION_ERROR");
    assert!(error["message"].is_string());
}

#[tokio::test]
async fn test_same_day_conflict_names_the_team() {
    let system = create_test_system();
    let league = &system.league;

    let (status, _) = create(&system.router, default_match(league)).await;
    assert_eq!(status, StatusCode::CREATED);

    let rematch = club_match(
        league.dinamo,
        league.rijeka,
        lineup(&league.home_squad[4..], 3),
        lineup(&league.away_squad[4..], 3),
        (1, 1),
        (0.5, 0.3, 0.2),
    );
    let (status, error) = create(&system.router, rematch).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error["error"], "TEAM_UNAVAILABLE");
    let message = error["message"].as_str().unwrap();
    assert!(message.contains("Dinamo Zagreb"), "message: {}", message);
    assert!(message.contains("2024-05-12"), "message: {}", message);

    // A national team match on the same day does not collide with club fixtures
    let national = json!({
        "type": "NationalTeam",
        "date": "2024-05-12",
        "venue": "Stadion Poljud",
        "homeTeam": { "team": league.croatia_a, "score": 1, "players": lineup(&league.home_squad[4..], 3) },
        "awayTeam": { "team": league.italy_a, "score": 1, "players": lineup(&league.away_squad[4..], 3) },
        "odds": { "homeWin": 0.35, "draw": 0.3, "awayWin": 0.35 }
    });
    let (status, created) = create(&system.router, national).await;
    assert_eq!(status, StatusCode::CREATED, "body: {}", created);
    assert_eq!(created["match"]["homeTeam"]["teamName"], "Croatia A");
}

#[tokio::test]
async fn test_edit_missing_match_is_not_found() {
    let system = create_test_system();
    let league = &system.league;

    let (status, error) = send(
        &system.router,
        Method::PUT,
        &format!("/api/match/edit-match/{}", Uuid::new_v4()),
        Some(default_match(league)),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error["error"], "MATCH_NOT_FOUND");

    let (status, error) = send(&system.router, Method::GET, "/api/match/matches/not-a-uuid", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_team_availability() {
    let system = create_test_system();
    let league = &system.league;

    let (status, _) = create(&system.router, default_match(league)).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, busy) = send(
        &system.router,
        Method::GET,
        &format!(
            "/api/match/check-team-availability?teamId={}&date=2024-05-12&type=ClubTeam",
            league.hajduk
        ),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(busy["hasMatch"], true);
    assert_eq!(busy["teamName"], "Hajduk Split");
    assert_eq!(busy["existingMatchDetails"]["isHomeTeam"], false);
    assert_eq!(busy["existingMatchDetails"]["venue"], "Stadion Maksimir");

    let (status, free) = send(
        &system.router,
        Method::GET,
        &format!(
            "/api/match/check-team-availability?teamId={}&date=2024-05-13&type=ClubTeam",
            league.hajduk
        ),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(free["hasMatch"], false);
    assert!(free["existingMatchDetails"].is_null());

    let (status, error) = send(
        &system.router,
        Method::GET,
        "/api/match/check-team-availability?date=2024-05-12",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["error"], "VALIDATION_ERROR");

    let (status, error) = send(
        &system.router,
        Method::GET,
        &format!(
            "/api/match/check-team-availability?teamId={}&date=2024-05-12&type=Futsal",
            league.hajduk
        ),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["error"], "INVALID_TYPE");

    let (status, error) = send(
        &system.router,
        Method::GET,
        &format!(
            "/api/match/check-team-availability?teamId={}&date=2024-05-12&type=ClubTeam",
            Uuid::new_v4()
        ),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error["error"], "TEAM_NOT_FOUND");
}

#[tokio::test]
async fn test_matches_for_team() {
    let system = create_test_system();
    let league = &system.league;

    let (status, _) = create(&system.router, default_match(league)).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, listing) = send(
        &system.router,
        Method::GET,
        &format!("/api/match/get-all-matches?teamId={}", league.hajduk),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listing["matches"].as_array().unwrap().len(), 1);

    let (status, error) = send(&system.router, Method::GET, "/api/match/get-all-matches", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_unknown_player_is_not_found() {
    let system = create_test_system();

    let (status, error) = send(
        &system.router,
        Method::GET,
        &format!("/api/player/{}", Uuid::new_v4()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error["error"], "PLAYER_NOT_FOUND");
}

#[tokio::test]
async fn test_metrics_count_submissions() {
    let system = create_test_system();
    let league = &system.league;

    let (status, _) = create(&system.router, default_match(league)).await;
    assert_eq!(status, StatusCode::CREATED);

    let response = system
        .router
        .clone()
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("touchline_matches_created_total"));
    assert!(text.contains("touchline_history_mutations_total"));
}
