use crate::error::SyncError;
use lane_scout_db::model::{Json, MatchRecord};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
struct RawMatch {
    metadata: RawMetadata,
    info: RawInfo,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMetadata {
    match_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawInfo {
    #[serde(default)]
    game_creation: i64,
    #[serde(default)]
    game_duration: i64,
    game_version: Option<String>,
    participants: Vec<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawParticipant {
    champion_id: i64,
    #[serde(default)]
    champion_name: String,
    lane: Option<String>,
    role: Option<String>,
    #[serde(default)]
    win: bool,
    kills: i64,
    deaths: i64,
    assists: i64,
    #[serde(default)]
    total_damage_dealt: i64,
    #[serde(default)]
    total_damage_dealt_to_champions: i64,
    #[serde(default)]
    gold_earned: i64,
    total_minions_killed: Option<i64>,
    /// Older payloads only carry this one
    minions_killed: Option<i64>,
    #[serde(default)]
    neutral_minions_killed: i64,
    #[serde(default)]
    vision_score: i64,
}

/// Outcome of normalizing one payload for one player.
#[derive(Debug, Clone, PartialEq)]
pub enum Normalized {
    Record(Box<MatchRecord>),
    /// The player does not appear in the match. Not an error.
    NotParticipant,
}

/// Turn a raw match payload into the [`MatchRecord`] of `puuid`.
pub fn normalize(payload: &Value, puuid: &str) -> Result<Normalized, SyncError> {
    let raw = RawMatch::deserialize(payload)
        .map_err(|e| SyncError::MalformedPayload(e.to_string()))?;

    let Some(participant) = raw
        .info
        .participants
        .iter()
        .find(|p| p.get("puuid").and_then(Value::as_str) == Some(puuid))
    else {
        return Ok(Normalized::NotParticipant);
    };

    let stats = RawParticipant::deserialize(participant).map_err(|e| {
        SyncError::MalformedPayload(format!(
            "participant of {}: {e}",
            raw.metadata.match_id
        ))
    })?;

    let minions = stats
        .total_minions_killed
        .or(stats.minions_killed)
        .unwrap_or_default();
    let cs = minions + stats.neutral_minions_killed;
    let record = MatchRecord {
        match_id: raw.metadata.match_id,
        puuid: puuid.to_string(),
        champion_id: stats.champion_id,
        champion_name: stats.champion_name,
        lane: stats.lane.unwrap_or_else(|| "NONE".to_string()),
        role: stats.role.unwrap_or_else(|| "NONE".to_string()),
        win: stats.win,
        kills: stats.kills,
        deaths: stats.deaths,
        assists: stats.assists,
        kda: kda(stats.kills, stats.deaths, stats.assists),
        total_damage_dealt: stats.total_damage_dealt,
        total_damage_dealt_to_champions: stats.total_damage_dealt_to_champions,
        gold_earned: stats.gold_earned,
        cs,
        cs_per_minute: cs_per_minute(cs, raw.info.game_duration),
        vision_score: stats.vision_score,
        game_duration: raw.info.game_duration,
        game_creation: raw.info.game_creation,
        patch: raw.info.game_version.as_deref().and_then(patch),
        tier: None,
        rank: None,
        raw_data: Some(Json(participant.clone())),
    };

    Ok(Normalized::Record(Box::new(record)))
}

/// `(kills + assists) / max(deaths, 1)`, rounded to 2 decimals.
pub fn kda(kills: i64, deaths: i64, assists: i64) -> f64 {
    round_to((kills + assists) as f64 / deaths.max(1) as f64, 2)
}

/// CS per minute rounded to 2 decimals; 0 for a zero-length game.
pub fn cs_per_minute(cs: i64, game_duration_secs: i64) -> f64 {
    if game_duration_secs <= 0 {
        return 0.0;
    }
    round_to(cs as f64 / (game_duration_secs as f64 / 60.0), 2)
}

/// Major and minor of a game version, e.g. `14.10.123.4567` -> `14.10`.
pub fn patch(game_version: &str) -> Option<String> {
    if game_version.is_empty() {
        return None;
    }
    Some(game_version.split('.').take(2).collect::<Vec<&str>>().join("."))
}

pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
