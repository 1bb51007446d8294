use chrono::{DateTime, Utc};
use lane_scout_db::model::MatchRecord;

/// A game created at `game_creation` epoch milliseconds.
pub fn game(game_creation: i64, win: bool, kda: f64) -> MatchRecord {
    MatchRecord {
        match_id: format!("EUW1_{game_creation}"),
        puuid: "me".into(),
        champion_id: 103,
        champion_name: "Ahri".into(),
        lane: "MIDDLE".into(),
        role: "SOLO".into(),
        win,
        kills: 5,
        deaths: 3,
        assists: 7,
        kda,
        total_damage_dealt: 100_000,
        total_damage_dealt_to_champions: 20_000,
        gold_earned: 11_000,
        cs: 200,
        cs_per_minute: 6.67,
        vision_score: 20,
        game_duration: 1800,
        game_creation,
        patch: Some("14.10".into()),
        tier: None,
        rank: None,
        raw_data: None,
    }
}

/// A game played at `at`.
pub fn game_at(at: DateTime<Utc>, win: bool, kda: f64) -> MatchRecord {
    game(at.timestamp_millis(), win, kda)
}

/// `results` as consecutive games one hour apart, the first one newest.
pub fn history(results: &[bool], newest: DateTime<Utc>) -> Vec<MatchRecord> {
    results
        .iter()
        .enumerate()
        .map(|(i, win)| game_at(newest - chrono::TimeDelta::hours(i as i64), *win, 3.0))
        .collect()
}
