//! Reference data loaded at startup

use crate::types::{ClubTeam, NationalTeam, Player};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Clubs, national teams and players to preload into a store
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SeedData {
    pub clubs: Vec<ClubTeam>,
    pub national_teams: Vec<NationalTeam>,
    pub players: Vec<Player>,
}

impl SeedData {
    /// Read a JSON seed file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read seed file {}", path.display()))?;
        Self::from_json(&contents)
            .with_context(|| format!("Failed to parse seed file {}", path.display()))
    }

    pub fn from_json(contents: &str) -> Result<Self> {
        Ok(serde_json::from_str(contents)?)
    }

    pub fn is_empty(&self) -> bool {
        self.clubs.is_empty() && self.national_teams.is_empty() && self.players.is_empty()
    }
}
