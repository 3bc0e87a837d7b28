//! Concurrent submission tests
//!
//! Identical submissions racing each other must produce exactly one match,
//! a team never ends up with two matches on one day, and independent
//! submissions must not interfere.

use axum::http::{Method, StatusCode};
use futures::future::join_all;
use serde_json::json;
use std::collections::HashSet;
use std::time::Instant;

use crate::fixtures::{
    club_match, create_test_system, default_match, history_entries, lineup, send,
};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_identical_submissions_create_one_match() {
    let system = create_test_system();
    let league = &system.league;
    let concurrent_requests = 20;

    let body = default_match(league);
    let requests = (0..concurrent_requests).map(|_| {
        let router = system.router.clone();
        let body = body.clone();
        tokio::spawn(async move {
            send(&router, Method::POST, "/api/match/matches", Some(body)).await
        })
    });

    let results: Vec<_> = join_all(requests)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect();

    let created: Vec<_> = results
        .iter()
        .filter(|(status, _)| *status == StatusCode::CREATED)
        .collect();
    assert_eq!(created.len(), 1, "exactly one submission wins");

    for (status, body) in results.iter().filter(|(s, _)| *s != StatusCode::CREATED) {
        assert_eq!(*status, StatusCode::CONFLICT);
        let kind = body["error"].as_str().unwrap();
        assert!(
            kind == "DUPLICATE_MATCH" || kind == "TEAM_UNAVAILABLE",
            "unexpected error kind {}",
            kind
        );
    }

    let match_id = created[0].1["match"]["id"].as_str().unwrap();
    let entries = history_entries(&system.router, league.home_squad[0], match_id).await;
    assert_eq!(entries.len(), 1);

    let (_, player) = send(
        &system.router,
        Method::GET,
        &format!("/api/player/{}", league.home_squad[0]),
        None,
    )
    .await;
    assert_eq!(player["ratingHistory"].as_array().unwrap().len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_matches_on_different_days_all_succeed() {
    let system = create_test_system();
    let league = &system.league;
    let days = 10;

    let start_time = Instant::now();

    let requests = (0..days).map(|day| {
        let router = system.router.clone();
        let mut body = default_match(league);
        body["date"] = json!(format!("2024-03-{:02}", day + 1));
        async move { send(&router, Method::POST, "/api/match/matches", Some(body)).await }
    });

    let results = join_all(requests).await;
    let elapsed = start_time.elapsed();

    assert!(results
        .iter()
        .all(|(status, _)| *status == StatusCode::CREATED));
    println!("Created {} matches in {:?}", days, elapsed);

    // One entry per match for every starter
    let (_, player) = send(
        &system.router,
        Method::GET,
        &format!("/api/player/{}", league.away_squad[1]),
        None,
    )
    .await;
    assert_eq!(player["ratingHistory"].as_array().unwrap().len(), days);

    let (_, listing) = send(
        &system.router,
        Method::GET,
        &format!("/api/match/get-all-matches?teamId={}", league.dinamo),
        None,
    )
    .await;
    let matches = listing["matches"].as_array().unwrap();
    assert_eq!(matches.len(), days);
    // Newest first
    assert!(matches[0]["date"].as_str().unwrap().starts_with("2024-03-10"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_edits_keep_history_in_step_with_stored_roster() {
    let system = create_test_system();
    let league = &system.league;

    let (status, created) = send(
        &system.router,
        Method::POST,
        "/api/match/matches",
        Some(default_match(league)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let match_id = created["match"]["id"].as_str().unwrap().to_string();

    // Every edit starts a different pair of home players
    let squad_size = league.home_squad.len();
    let edits = (0..squad_size).map(|n| {
        let router = system.router.clone();
        let starters = [
            league.home_squad[n],
            league.home_squad[(n + 1) % squad_size],
        ];
        let mut body = default_match(league);
        body["homeTeam"]["players"] = lineup(&starters, 2);
        body["homeTeam"]["score"] = json!(n);
        let uri = format!("/api/match/edit-match/{}", match_id);
        tokio::spawn(async move { send(&router, Method::PUT, &uri, Some(body)).await })
    });

    let results: Vec<_> = join_all(edits)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect();
    assert!(results.iter().all(|(status, _)| *status == StatusCode::OK));

    let (_, stored) = send(
        &system.router,
        Method::GET,
        &format!("/api/match/matches/{}", match_id),
        None,
    )
    .await;
    let stored_starters: HashSet<String> = stored["homeTeam"]["players"]
        .as_array()
        .unwrap()
        .iter()
        .chain(stored["awayTeam"]["players"].as_array().unwrap())
        .filter(|selection| selection["starter"] == true)
        .map(|selection| selection["player"]["id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(stored_starters.len(), 5);

    // Last write wins, and history follows whichever edit that was
    for player in league.home_squad.iter().chain(&league.away_squad) {
        let entries = history_entries(&system.router, *player, &match_id).await;
        let expected = usize::from(stored_starters.contains(&player.to_string()));
        assert_eq!(entries.len(), expected, "history of player {}", player);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_matches_for_one_team_on_one_day() {
    let system = create_test_system();
    let league = &system.league;

    let against_hajduk = default_match(league);
    let mut against_rijeka = club_match(
        league.dinamo,
        league.rijeka,
        lineup(&league.home_squad[4..], 3),
        lineup(&league.away_squad[4..], 3),
        (0, 0),
        (0.5, 0.3, 0.2),
    );
    against_rijeka["venue"] = json!("Stadion Rujevica");

    let requests = [against_hajduk, against_rijeka].map(|body| {
        let router = system.router.clone();
        tokio::spawn(async move {
            send(&router, Method::POST, "/api/match/matches", Some(body)).await
        })
    });
    let results: Vec<_> = join_all(requests)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect();

    let created = results
        .iter()
        .filter(|(status, _)| *status == StatusCode::CREATED)
        .count();
    assert_eq!(created, 1, "one match per team per day");
    let (status, rejected) = results
        .iter()
        .find(|(status, _)| *status != StatusCode::CREATED)
        .unwrap();
    assert_eq!(*status, StatusCode::CONFLICT);
    assert_eq!(rejected["error"], "TEAM_UNAVAILABLE");
    assert_eq!(
        rejected["message"],
        "Dinamo Zagreb already has a match scheduled on 2024-05-12"
    );

    let (_, listing) = send(
        &system.router,
        Method::GET,
        &format!("/api/match/get-all-matches?teamId={}", league.dinamo),
        None,
    )
    .await;
    assert_eq!(listing["matches"].as_array().unwrap().len(), 1);
}
