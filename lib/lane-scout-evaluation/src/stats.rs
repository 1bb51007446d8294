use lane_scout_db::model::MatchRecord;

/// Arithmetic mean, `None` for no values.
pub fn mean(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Population standard deviation, 0 for fewer than two values.
pub fn std_dev(values: &[f64]) -> f64 {
    let Some(avg) = mean(values.iter().copied()) else {
        return 0.0;
    };
    let variance = values.iter().map(|v| (v - avg).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Share of won games, `None` without games.
pub fn win_rate<'a>(matches: impl IntoIterator<Item = &'a MatchRecord>) -> Option<f64> {
    mean(matches.into_iter().map(|m| if m.win { 1.0 } else { 0.0 }))
}

/// Vision score per minute of game time.
pub fn vision_per_minute(record: &MatchRecord) -> f64 {
    if record.game_duration <= 0 {
        return 0.0;
    }
    record.vision_score as f64 / (record.game_duration as f64 / 60.0)
}

pub fn clamp_score(score: f64) -> f64 {
    score.clamp(0.0, 100.0)
}

pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// References to `matches` sorted by game creation, newest first.
pub fn newest_first(matches: &[MatchRecord]) -> Vec<&MatchRecord> {
    let mut sorted: Vec<&MatchRecord> = matches.iter().collect();
    sorted.sort_by(|a, b| b.game_creation.cmp(&a.game_creation));
    sorted
}
