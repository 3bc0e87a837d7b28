//! Test fixtures shared by the integration and load tests

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::sync::Arc;
use touchline::api;
use touchline::config::AppConfig;
use touchline::service::AppState;
use touchline::store::{InMemoryStore, SeedData};
use touchline::types::{
    ClubTeam, NationalTeam, Player, PlayerId, SquadLevel, TeamId, TeamStatus,
};
use tower::ServiceExt;
use uuid::Uuid;

/// Reference data seeded into every test system
pub struct TestLeague {
    pub dinamo: TeamId,
    pub hajduk: TeamId,
    pub rijeka: TeamId,
    pub croatia_a: TeamId,
    pub italy_a: TeamId,
    /// Eight players for the home side
    pub home_squad: Vec<PlayerId>,
    /// Eight players for the away side
    pub away_squad: Vec<PlayerId>,
}

impl TestLeague {
    pub fn new() -> Self {
        Self {
            dinamo: Uuid::new_v4(),
            hajduk: Uuid::new_v4(),
            rijeka: Uuid::new_v4(),
            croatia_a: Uuid::new_v4(),
            italy_a: Uuid::new_v4(),
            home_squad: (0..8).map(|_| Uuid::new_v4()).collect(),
            away_squad: (0..8).map(|_| Uuid::new_v4()).collect(),
        }
    }

    pub fn seed(&self) -> SeedData {
        let club = |id: TeamId, name: &str| ClubTeam {
            id,
            name: name.to_string(),
            status: TeamStatus::Active,
        };
        let national = |id: TeamId, country: &str| NationalTeam {
            id,
            country: country.to_string(),
            squad: SquadLevel::Senior,
            status: TeamStatus::Active,
        };
        let players = self
            .home_squad
            .iter()
            .chain(&self.away_squad)
            .enumerate()
            .map(|(i, id)| Player {
                id: *id,
                name: format!("Player {}", i + 1),
                position: Some(if i % 8 == 0 { "GK" } else { "MF" }.to_string()),
                country: Some("Croatia".to_string()),
                rating_history: Vec::new(),
            })
            .collect();

        SeedData {
            clubs: vec![
                club(self.dinamo, "Dinamo Zagreb"),
                club(self.hajduk, "Hajduk Split"),
                club(self.rijeka, "Rijeka"),
            ],
            national_teams: vec![
                national(self.croatia_a, "Croatia"),
                national(self.italy_a, "Italy"),
            ],
            players,
        }
    }
}

/// A seeded service wired into the full router
pub struct TestSystem {
    pub league: TestLeague,
    pub state: Arc<AppState>,
    pub router: Router,
}

pub fn create_test_system() -> TestSystem {
    let league = TestLeague::new();
    let store = InMemoryStore::with_seed(league.seed()).expect("seed loads");
    let state = Arc::new(
        AppState::with_store(AppConfig::default(), Arc::new(store)).expect("state builds"),
    );
    let router = api::router(state.clone());

    TestSystem {
        league,
        state,
        router,
    }
}

/// Lineup JSON: the first `starters` players start, the rest sit on the bench
pub fn lineup(players: &[PlayerId], starters: usize) -> Value {
    Value::Array(
        players
            .iter()
            .enumerate()
            .map(|(i, id)| json!({ "player": id, "starter": i < starters }))
            .collect(),
    )
}

/// A club match body with the given lineups, score and odds
pub fn club_match(
    home: TeamId,
    away: TeamId,
    home_players: Value,
    away_players: Value,
    score: (u32, u32),
    odds: (f64, f64, f64),
) -> Value {
    json!({
        "type": "ClubTeam",
        "date": "2024-05-12",
        "venue": "Stadion Maksimir",
        "homeTeam": { "team": home, "score": score.0, "players": home_players },
        "awayTeam": { "team": away, "score": score.1, "players": away_players },
        "odds": { "homeWin": odds.0, "draw": odds.1, "awayWin": odds.2 }
    })
}

/// Default Dinamo vs Hajduk fixture, 2-1 with odds 0.4 / 0.3 / 0.3
pub fn default_match(league: &TestLeague) -> Value {
    club_match(
        league.dinamo,
        league.hajduk,
        lineup(&league.home_squad[..4], 3),
        lineup(&league.away_squad[..4], 3),
        (2, 1),
        (0.4, 0.3, 0.3),
    )
}

/// Send one request through the router and decode the JSON response
pub async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

/// Entries in the player's history recorded for the match
pub async fn history_entries(router: &Router, player: PlayerId, match_id: &str) -> Vec<Value> {
    let (status, body) = send(router, Method::GET, &format!("/api/player/{}", player), None).await;
    assert_eq!(status, StatusCode::OK);
    body["ratingHistory"]
        .as_array()
        .cloned()
        .unwrap_or_default()
        .into_iter()
        .filter(|entry| entry["matchId"].as_str() == Some(match_id))
        .collect()
}
