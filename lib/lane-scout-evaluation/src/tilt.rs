use crate::label::TiltRiskLevel;
use crate::role::Role;
use crate::stats::{clamp_score, mean, newest_first, round_to, std_dev, win_rate};
use chrono::{DateTime, Timelike, Utc};
use lane_scout_db::model::MatchRecord;
use serde::Serialize;
use std::collections::HashMap;
use std::hash::Hash;

/// Games considered by a tilt report.
pub const LOOKBACK_GAMES: i64 = 30;

const LOSS_STREAK_THRESHOLD: usize = 3;
const MIN_GAMES_PER_WINDOW: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TimeWindow {
    Night,
    Morning,
    Afternoon,
    Evening,
}

impl TimeWindow {
    pub const ALL: [TimeWindow; 4] = [
        TimeWindow::Night,
        TimeWindow::Morning,
        TimeWindow::Afternoon,
        TimeWindow::Evening,
    ];

    /// Window of a UTC hour.
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            0..=5 => TimeWindow::Night,
            6..=11 => TimeWindow::Morning,
            12..=17 => TimeWindow::Afternoon,
            _ => TimeWindow::Evening,
        }
    }

    pub fn hour_range(&self) -> &'static str {
        match self {
            TimeWindow::Night => "00:00-06:00",
            TimeWindow::Morning => "06:00-12:00",
            TimeWindow::Afternoon => "12:00-18:00",
            TimeWindow::Evening => "18:00-24:00",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeOfDayStats {
    pub time_window: TimeWindow,
    pub hour_range: &'static str,
    pub games_played: usize,
    pub win_rate: f64,
    pub avg_kda: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LossStreak {
    pub detected: bool,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TiltReport {
    pub puuid: String,
    pub consistency_score: f64,
    pub tilt_risk_level: TiltRiskLevel,
    pub tilt_risk_indicator: f64,
    pub loss_streak_detected: bool,
    pub current_loss_streak: usize,
    pub performance_drop_on_streak: bool,
    pub session_fatigue_detected: bool,
    pub best_time_of_day: Option<TimeWindow>,
    pub worst_time_of_day: Option<TimeWindow>,
    pub time_of_day_stats: Vec<TimeOfDayStats>,
    pub recommendations: Vec<String>,
    pub role_stability_score: f64,
    pub champ_stability_score: f64,
}

/// Build the tilt report over the most recent [`LOOKBACK_GAMES`] of `matches`.
/// `now` decides which games belong to today's session.
pub fn tilt_report(puuid: &str, matches: &[MatchRecord], now: DateTime<Utc>) -> TiltReport {
    let mut recent = newest_first(matches);
    recent.truncate(LOOKBACK_GAMES as usize);

    let loss_streak = loss_streak(&recent);
    let performance_drop = performance_drop(&recent, loss_streak.count);
    let session_fatigue = session_fatigue(&recent, now);
    let time_of_day_stats = time_of_day_stats(&recent);
    let consistency_score = consistency_score(&recent);
    let tilt_risk = tilt_risk(&loss_streak, performance_drop, session_fatigue, consistency_score);
    let role_stability = stability(&recent, 1, |m| Role::from(m.lane.as_str()));
    let champ_stability = stability(&recent, 3, |m| m.champion_name.clone());
    let worst_time_of_day = worst_window(&time_of_day_stats);

    TiltReport {
        puuid: puuid.to_string(),
        consistency_score,
        tilt_risk_level: TiltRiskLevel::from_indicator(tilt_risk),
        tilt_risk_indicator: tilt_risk,
        loss_streak_detected: loss_streak.detected,
        current_loss_streak: loss_streak.count,
        performance_drop_on_streak: performance_drop,
        session_fatigue_detected: session_fatigue,
        best_time_of_day: best_window(&time_of_day_stats),
        worst_time_of_day,
        recommendations: recommendations(
            tilt_risk,
            &loss_streak,
            session_fatigue,
            worst_time_of_day,
            role_stability,
            champ_stability,
        ),
        time_of_day_stats,
        role_stability_score: role_stability,
        champ_stability_score: champ_stability,
    }
}

/// Consecutive losses before the most recent win.
pub fn loss_streak(recent: &[&MatchRecord]) -> LossStreak {
    let count = recent.iter().take_while(|m| !m.win).count();
    LossStreak {
        detected: count >= LOSS_STREAK_THRESHOLD,
        count,
    }
}

/// Average KDA over the streak is below 75% of the equally long window before it.
pub fn performance_drop(recent: &[&MatchRecord], streak: usize) -> bool {
    if streak < 2 {
        return false;
    }
    let during = &recent[..streak.min(recent.len())];
    let before = &recent[during.len()..(2 * streak).min(recent.len())];

    match (
        mean(during.iter().map(|m| m.kda)),
        mean(before.iter().map(|m| m.kda)),
    ) {
        (Some(during), Some(before)) => during < before * 0.75,
        _ => false,
    }
}

/// Win rate over the later half of today's games is at least 20 points below the
/// earlier half.
pub fn session_fatigue(recent: &[&MatchRecord], now: DateTime<Utc>) -> bool {
    let today = now.date_naive();
    let mut session: Vec<&MatchRecord> = recent
        .iter()
        .copied()
        .filter(|m| m.game_creation_time().map(|t| t.date_naive()) == Some(today))
        .collect();
    if session.len() < 4 {
        return false;
    }
    session.sort_by_key(|m| m.game_creation);

    let (earlier, later) = session.split_at(session.len() / 2);
    match (win_rate(earlier.iter().copied()), win_rate(later.iter().copied())) {
        // Whole percentage points, so an exact 20 point drop counts
        (Some(earlier), Some(later)) => round_to((earlier - later) * 100.0, 6) >= 20.0,
        _ => false,
    }
}

pub fn time_of_day_stats(recent: &[&MatchRecord]) -> Vec<TimeOfDayStats> {
    TimeWindow::ALL
        .iter()
        .map(|window| {
            let games: Vec<&MatchRecord> = recent
                .iter()
                .copied()
                .filter(|m| {
                    m.game_creation_time()
                        .is_some_and(|t| TimeWindow::from_hour(t.hour()) == *window)
                })
                .collect();
            TimeOfDayStats {
                time_window: *window,
                hour_range: window.hour_range(),
                games_played: games.len(),
                win_rate: win_rate(games.iter().copied()).unwrap_or_default(),
                avg_kda: mean(games.iter().map(|m| m.kda)).unwrap_or_default(),
            }
        })
        .collect()
}

/// `100 - 15 * stddev(KDA)`, 50 with fewer than three games.
pub fn consistency_score(recent: &[&MatchRecord]) -> f64 {
    if recent.len() < 3 {
        return 50.0;
    }
    let kdas: Vec<f64> = recent.iter().map(|m| m.kda).collect();
    clamp_score(100.0 - std_dev(&kdas) * 15.0)
}

pub fn tilt_risk(
    loss_streak: &LossStreak,
    performance_drop: bool,
    session_fatigue: bool,
    consistency_score: f64,
) -> f64 {
    let mut risk: f64 = 0.0;
    if loss_streak.count >= 3 {
        risk += 30.0;
    }
    if loss_streak.count >= 5 {
        risk += 20.0;
    }
    if performance_drop {
        risk += 25.0;
    }
    if session_fatigue {
        risk += 15.0;
    }
    risk += (100.0 - consistency_score) * 0.1;
    risk.min(100.0)
}

/// Share of games covered by the `top` most frequent keys, 50 without games.
fn stability<K: Eq + Hash>(recent: &[&MatchRecord], top: usize, key: impl Fn(&MatchRecord) -> K) -> f64 {
    if recent.is_empty() {
        return 50.0;
    }
    let mut counts: HashMap<K, usize> = HashMap::new();
    for m in recent {
        *counts.entry(key(*m)).or_default() += 1;
    }
    let mut counts: Vec<usize> = counts.into_values().collect();
    counts.sort_unstable_by(|a, b| b.cmp(a));
    let covered: usize = counts.iter().take(top).sum();
    covered as f64 / recent.len() as f64 * 100.0
}

fn best_window(stats: &[TimeOfDayStats]) -> Option<TimeWindow> {
    pick_window(stats, |candidate, current| candidate > current)
}

fn worst_window(stats: &[TimeOfDayStats]) -> Option<TimeWindow> {
    pick_window(stats, |candidate, current| candidate < current)
}

/// First window with enough games whose win rate no later window beats.
fn pick_window(stats: &[TimeOfDayStats], beats: impl Fn(f64, f64) -> bool) -> Option<TimeWindow> {
    stats
        .iter()
        .filter(|s| s.games_played >= MIN_GAMES_PER_WINDOW)
        .fold(None::<&TimeOfDayStats>, |picked, s| match picked {
            Some(current) if !beats(s.win_rate, current.win_rate) => Some(current),
            _ => Some(s),
        })
        .map(|s| s.time_window)
}

fn recommendations(
    tilt_risk: f64,
    loss_streak: &LossStreak,
    session_fatigue: bool,
    worst_window: Option<TimeWindow>,
    role_stability: f64,
    champ_stability: f64,
) -> Vec<String> {
    let mut recs = Vec::new();

    if tilt_risk >= 75.0 {
        recs.push("Take a break, you are showing critical tilt indicators.".to_string());
    } else if tilt_risk >= 50.0 {
        recs.push("Consider a short break before queuing again.".to_string());
    }

    if loss_streak.count >= 5 {
        recs.push(format!("{}-game loss streak detected. Stop for today.", loss_streak.count));
    } else if loss_streak.count >= 3 {
        recs.push(format!(
            "{}-game loss streak. Switch champion or take a break.",
            loss_streak.count
        ));
    }

    if session_fatigue {
        recs.push("Performance is dropping within your current session. End the session.".to_string());
    }
    if role_stability < 50.0 {
        recs.push("Playing too many roles. Focus on 1-2 roles for better improvement.".to_string());
    }
    if champ_stability < 40.0 {
        recs.push("Improve champion pool stability by focusing on 3 core champions.".to_string());
    }
    if let Some(window) = worst_window {
        recs.push(format!(
            "Avoid playing during the {window:?}, historically your worst time slot."
        ));
    }

    recs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{game, game_at, history};
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 10, 23, 0, 0).unwrap()
    }

    #[test]
    fn test_three_losses_after_wins() {
        // Newest first
        let matches = history(&[false, false, false, true, true], now());
        let report = tilt_report("me", &matches, now());
        assert_eq!(report.current_loss_streak, 3);
        assert!(report.loss_streak_detected);
        assert!(report.recommendations.iter().any(|r| r.starts_with("3-game loss streak")));
    }

    #[test]
    fn test_streak_ends_at_first_win() {
        let matches = history(&[false, false, true, false, false, false], now());
        let refs = newest_first(&matches);
        assert_eq!(loss_streak(&refs), LossStreak { detected: false, count: 2 });
    }

    #[test]
    fn test_performance_drop_against_prior_window() {
        let t = now().timestamp_millis();
        let matches = vec![
            game(t, false, 1.0),
            game(t - 1, false, 1.0),
            game(t - 2, true, 4.0),
            game(t - 3, true, 4.0),
        ];
        let refs = newest_first(&matches);
        assert!(performance_drop(&refs, 2));
        assert!(!performance_drop(&refs, 1));

        // 3.0 is exactly 75% of 4.0
        let matches = vec![
            game(t, false, 3.0),
            game(t - 1, false, 3.0),
            game(t - 2, true, 4.0),
            game(t - 3, true, 4.0),
        ];
        assert!(!performance_drop(&newest_first(&matches), 2));

        // No prior games to compare with
        let matches = vec![game(t, false, 1.0), game(t - 1, false, 1.0)];
        assert!(!performance_drop(&newest_first(&matches), 2));
    }

    #[test]
    fn test_session_fatigue() {
        // Oldest to newest today: W W L L
        let matches = history(&[false, false, true, true], now());
        assert!(session_fatigue(&newest_first(&matches), now()));

        // Oldest to newest today: L L W W
        let matches = history(&[true, true, false, false], now());
        assert!(!session_fatigue(&newest_first(&matches), now()));

        // Same games yesterday
        let matches = history(&[false, false, true, true], now() - chrono::TimeDelta::days(1));
        assert!(!session_fatigue(&newest_first(&matches), now()));

        // Oldest to newest today: W W W L L (60%) then W W L L L (40%)
        let matches = history(
            &[false, false, false, true, true, false, false, true, true, true],
            now(),
        );
        assert!(session_fatigue(&newest_first(&matches), now()));

        // Oldest to newest today: W W W L L (60%) then W W W L L (60%)
        let matches = history(
            &[false, false, true, true, true, false, false, true, true, true],
            now(),
        );
        assert!(!session_fatigue(&newest_first(&matches), now()));
    }

    #[test]
    fn test_consistency_score() {
        let t = 0;
        let steady = vec![game(t, true, 3.0), game(t + 1, true, 3.0), game(t + 2, true, 3.0)];
        assert_eq!(consistency_score(&newest_first(&steady)), 100.0);

        let two = vec![game(t, true, 1.0), game(t + 1, true, 9.0)];
        assert_eq!(consistency_score(&newest_first(&two)), 50.0);

        let wild = vec![game(t, true, 0.0), game(t + 1, true, 20.0), game(t + 2, true, 0.0), game(t + 3, true, 20.0)];
        assert_eq!(consistency_score(&newest_first(&wild)), 0.0);
    }

    #[test]
    fn test_tilt_risk_accumulates_and_caps() {
        let streak = LossStreak { detected: true, count: 6 };
        assert_eq!(tilt_risk(&streak, true, true, 100.0), 90.0);
        assert_eq!(tilt_risk(&streak, true, true, 0.0), 100.0);
        let none = LossStreak { detected: false, count: 0 };
        assert_eq!(tilt_risk(&none, false, false, 80.0), 2.0);
    }

    #[test]
    fn test_time_windows_use_utc_hours() {
        let day = Utc.with_ymd_and_hms(2024, 5, 9, 0, 0, 0).unwrap();
        let at = |hour: i64| day + chrono::TimeDelta::hours(hour);
        let matches = vec![
            game_at(at(1), true, 3.0),
            game_at(at(2), true, 3.0),
            game_at(at(3), false, 3.0),
            game_at(at(19), false, 1.0),
            game_at(at(20), false, 1.0),
            game_at(at(21), true, 1.0),
            game_at(at(13), true, 2.0),
        ];
        let report = tilt_report("me", &matches, now());

        let windows: Vec<(TimeWindow, usize)> = report
            .time_of_day_stats
            .iter()
            .map(|s| (s.time_window, s.games_played))
            .collect();
        assert_eq!(
            windows,
            vec![
                (TimeWindow::Night, 3),
                (TimeWindow::Morning, 0),
                (TimeWindow::Afternoon, 1),
                (TimeWindow::Evening, 3),
            ]
        );
        assert_eq!(report.best_time_of_day, Some(TimeWindow::Night));
        assert_eq!(report.worst_time_of_day, Some(TimeWindow::Evening));
    }

    #[test]
    fn test_stability_scores() {
        let t = 0;
        let mut matches: Vec<MatchRecord> = (0..4).map(|i| game(t + i, true, 3.0)).collect();
        matches[0].lane = "TOP".into();
        matches[1].lane = "JUNGLE".into();
        matches[2].lane = "BOTTOM".into();
        for (i, name) in ["Ahri", "Zed", "Lux", "Jinx"].iter().enumerate() {
            matches[i].champion_name = name.to_string();
        }

        let report = tilt_report("me", &matches, now());
        assert_eq!(report.role_stability_score, 25.0);
        assert_eq!(report.champ_stability_score, 75.0);
        assert!(report
            .recommendations
            .iter()
            .any(|r| r.starts_with("Playing too many roles")));
    }

    #[test]
    fn test_empty_history() {
        let report = tilt_report("me", &[], now());
        assert_eq!(report.current_loss_streak, 0);
        assert_eq!(report.consistency_score, 50.0);
        assert_eq!(report.tilt_risk_indicator, 5.0);
        assert_eq!(report.tilt_risk_level, TiltRiskLevel::Low);
        assert_eq!(report.role_stability_score, 50.0);
        assert_eq!(report.champ_stability_score, 50.0);
        assert_eq!(report.best_time_of_day, None);
        assert!(report.recommendations.is_empty());
    }

    #[test]
    fn test_lookback_is_bounded() {
        let results: Vec<bool> = (0..40).map(|i| i >= 35).collect();
        let matches = history(&results, now());
        let report = tilt_report("me", &matches, now());
        assert_eq!(report.current_loss_streak, LOOKBACK_GAMES as usize);
    }
}
