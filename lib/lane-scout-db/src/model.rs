use serde::{Deserialize, Serialize};
use sqlx::{
    prelude::FromRow,
    types::chrono::{DateTime, NaiveDateTime, Utc},
};
use std::collections::BTreeMap;
use std::fmt::Display;

pub use sqlx::types::Json;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub riot_puuid: Option<String>,
    pub riot_summoner_name: Option<String>,
    pub riot_platform: Option<String>,
    pub is_active: bool,
    pub create_time: NaiveDateTime,
}

impl User {
    /// The `(puuid, platform)` pair of the linked Riot account, if the user has one.
    pub fn linked_account(&self) -> Option<(&str, &str)> {
        match (&self.riot_puuid, &self.riot_platform) {
            (Some(puuid), Some(platform)) if !puuid.is_empty() && !platform.is_empty() => {
                Some((puuid, platform))
            }
            _ => None,
        }
    }
}

/// One player's line from one match. Written once, never updated.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct MatchRecord {
    pub match_id: String,
    pub puuid: String,
    pub champion_id: i64,
    pub champion_name: String,
    pub lane: String,
    pub role: String,
    pub win: bool,
    pub kills: i64,
    pub deaths: i64,
    pub assists: i64,
    pub kda: f64,
    pub total_damage_dealt: i64,
    pub total_damage_dealt_to_champions: i64,
    pub gold_earned: i64,
    pub cs: i64,
    pub cs_per_minute: f64,
    pub vision_score: i64,
    /// Seconds
    pub game_duration: i64,
    /// Epoch milliseconds
    pub game_creation: i64,
    pub patch: Option<String>,
    pub tier: Option<String>,
    pub rank: Option<String>,
    pub raw_data: Option<Json<serde_json::Value>>,
}

impl MatchRecord {
    pub fn game_creation_time(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.game_creation)
    }
}

/// Per-player, per-champion rollup. `scope` is `None` for the all-time aggregate.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct ChampionAggregate {
    pub puuid: String,
    pub champion_id: i64,
    pub champion_name: String,
    pub scope: Option<String>,
    pub games_played: i64,
    pub wins: i64,
    pub win_rate: f64,
    pub avg_kda: f64,
    pub avg_cs_per_minute: f64,
    pub avg_damage_share: f64,
    pub avg_vision_score: f64,
    pub is_comfort_pick: bool,
    pub matchup_win_rates: Json<BTreeMap<String, f64>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type, Serialize, Deserialize)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SyncState {
    Idle,
    Syncing,
    Error,
}

impl SyncState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncState::Idle => "idle",
            SyncState::Syncing => "syncing",
            SyncState::Error => "error",
        }
    }
}

impl Display for SyncState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct SyncStatus {
    pub user_id: String,
    pub puuid: String,
    pub state: SyncState,
    pub total_matches_synced: i64,
    pub last_sync_added_count: i64,
    pub last_synced_at: Option<DateTime<Utc>>,
    pub latest_match_id: Option<String>,
    pub last_error: Option<String>,
}
