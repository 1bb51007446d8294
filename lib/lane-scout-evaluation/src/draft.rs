use crate::label::{MatchupDifficulty, PickConfidence};
use crate::stats::win_rate;
use chrono::{DateTime, TimeDelta, Utc};
use lane_scout_db::model::{ChampionAggregate, MatchRecord};
use serde::Serialize;

const COMFORT_PICK_GAMES: i64 = 20;
const RISK_PICK_MAX_GAMES: i64 = 5;
const COUNTER_MATCHUP_WIN_RATE: f64 = 0.4;

/// A champion under consideration in champion select.
#[derive(Debug, Clone, Default)]
pub struct PickRequest<'a> {
    pub champion_name: &'a str,
    pub enemy_champion: Option<&'a str>,
    pub ally_champions: &'a [String],
    pub patch: Option<&'a str>,
}

/// What the player has on record for the requested champion.
#[derive(Debug, Clone, Copy)]
pub struct ChampionHistory<'a> {
    pub aggregate: Option<&'a ChampionAggregate>,
    pub matches: &'a [MatchRecord],
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct WinRates {
    pub patch: Option<f64>,
    pub last_30_days: Option<f64>,
    pub season: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DraftPickAnalysis {
    pub champion_id: i64,
    pub champion_name: String,
    pub win_rate_patch: Option<f64>,
    pub win_rate_30_days: Option<f64>,
    pub win_rate_season: Option<f64>,
    pub games_played_total: i64,
    pub matchup_difficulty: MatchupDifficulty,
    pub matchup_win_rate: Option<f64>,
    pub team_synergy_score: f64,
    pub is_comfort_pick: bool,
    pub is_risk_pick: bool,
    pub confidence: PickConfidence,
    pub confidence_label: &'static str,
    pub hints: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DraftSessionAnalysis {
    pub puuid: String,
    pub picks: Vec<DraftPickAnalysis>,
    pub team_synergy_overall: f64,
    /// Ban suggestions are not derived yet; always empty.
    pub recommended_bans: Vec<String>,
    pub draft_warnings: Vec<String>,
}

/// Win rate on the champion for the given patch, the 30 days before `now` and
/// every stored game.
pub fn win_rates(matches: &[MatchRecord], patch: Option<&str>, now: DateTime<Utc>) -> WinRates {
    let since = (now - TimeDelta::days(30)).timestamp_millis();
    WinRates {
        patch: patch.and_then(|patch| {
            win_rate(matches.iter().filter(|m| m.patch.as_deref() == Some(patch)))
        }),
        last_30_days: win_rate(matches.iter().filter(|m| m.game_creation >= since)),
        season: win_rate(matches),
    }
}

/// Placeholder synergy: grows with the number of known champions, capped at 80.
pub fn team_synergy(champion_count: usize) -> f64 {
    (50.0 + champion_count as f64 * 5.0).min(80.0)
}

pub fn analyze_pick(
    request: &PickRequest,
    history: ChampionHistory,
    now: DateTime<Utc>,
) -> DraftPickAnalysis {
    let win_rates = win_rates(history.matches, request.patch, now);
    let games_played = history.aggregate.map_or(0, |a| a.games_played);
    let matchup_win_rate = request.enemy_champion.and_then(|enemy| {
        history
            .aggregate
            .and_then(|a| a.matchup_win_rates.get(enemy).copied())
    });
    let team_synergy_score = if request.ally_champions.is_empty() {
        50.0
    } else {
        team_synergy(request.ally_champions.len() + 1)
    };

    let is_comfort_pick = games_played >= COMFORT_PICK_GAMES;
    let counter = matchup_win_rate.is_some_and(|wr| wr < COUNTER_MATCHUP_WIN_RATE);
    let is_risk_pick = games_played < RISK_PICK_MAX_GAMES
        || counter
        || win_rates.last_30_days.is_some_and(|wr| wr < 0.45);

    let confidence = if is_comfort_pick && !is_risk_pick {
        PickConfidence::HighConfidence
    } else if counter {
        PickConfidence::CounterRisk
    } else if is_risk_pick {
        PickConfidence::RiskyPick
    } else {
        PickConfidence::Normal
    };

    let mut hints = Vec::new();
    match confidence {
        PickConfidence::HighConfidence => {
            hints.push("Strong comfort champion, go for it!".to_string())
        }
        PickConfidence::RiskyPick => {
            hints.push("Low experience or poor recent performance on this champion.".to_string())
        }
        PickConfidence::CounterRisk => {
            if let Some(enemy) = request.enemy_champion {
                hints.push(format!("Historically struggles into {enemy}."));
            }
        }
        PickConfidence::Normal => {}
    }
    if win_rates.last_30_days.is_some_and(|wr| wr > 0.6) {
        hints.push("On a hot streak with this champion lately.".to_string());
    }
    if games_played == 0 {
        hints.push("No match history found, blind pick detected.".to_string());
    }

    DraftPickAnalysis {
        champion_id: history
            .aggregate
            .map(|a| a.champion_id)
            .or_else(|| history.matches.first().map(|m| m.champion_id))
            .unwrap_or_default(),
        champion_name: request.champion_name.to_string(),
        win_rate_patch: win_rates.patch,
        win_rate_30_days: win_rates.last_30_days,
        win_rate_season: win_rates.season,
        games_played_total: games_played,
        matchup_difficulty: MatchupDifficulty::from(matchup_win_rate),
        matchup_win_rate,
        team_synergy_score,
        is_comfort_pick,
        is_risk_pick,
        confidence,
        confidence_label: confidence.label(),
        hints,
    }
}

/// Analyze the player's pick against the lane opponent, the first enemy champion.
pub fn analyze_draft_session(
    puuid: &str,
    my_champion: &str,
    ally_champions: &[String],
    enemy_champions: &[String],
    patch: Option<&str>,
    history: ChampionHistory,
    now: DateTime<Utc>,
) -> DraftSessionAnalysis {
    let request = PickRequest {
        champion_name: my_champion,
        enemy_champion: enemy_champions.first().map(String::as_str),
        ally_champions,
        patch,
    };
    let pick = analyze_pick(&request, history, now);
    let team_synergy_overall = team_synergy(ally_champions.len() + 1);

    let mut draft_warnings = Vec::new();
    if team_synergy_overall < 40.0 {
        draft_warnings.push("Low team synergy, consider adjusting composition.".to_string());
    }
    if pick.confidence == PickConfidence::CounterRisk {
        draft_warnings.push("Potential lane counter, have a counterpick ready.".to_string());
    }

    DraftSessionAnalysis {
        puuid: puuid.to_string(),
        picks: vec![pick],
        team_synergy_overall,
        recommended_bans: Vec::new(),
        draft_warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::game_at;
    use chrono::TimeZone;
    use lane_scout_db::model::Json;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn aggregate(games_played: i64, matchups: &[(&str, f64)]) -> ChampionAggregate {
        ChampionAggregate {
            puuid: "me".into(),
            champion_id: 103,
            champion_name: "Ahri".into(),
            scope: None,
            games_played,
            wins: games_played / 2,
            win_rate: 0.5,
            avg_kda: 3.0,
            avg_cs_per_minute: 7.0,
            avg_damage_share: 0.0,
            avg_vision_score: 20.0,
            is_comfort_pick: games_played >= 20,
            matchup_win_rates: Json(
                matchups
                    .iter()
                    .map(|(name, wr)| (name.to_string(), *wr))
                    .collect::<BTreeMap<_, _>>(),
            ),
        }
    }

    /// `wins` out of `games`, played `days_ago` days before [`now`].
    fn played(games: usize, wins: usize, days_ago: i64) -> Vec<MatchRecord> {
        (0..games)
            .map(|i| {
                let at = now() - TimeDelta::days(days_ago) - TimeDelta::minutes(i as i64);
                game_at(at, i < wins, 3.0)
            })
            .collect()
    }

    #[test]
    fn test_win_rates_by_timeframe() {
        let mut matches = played(4, 3, 2);
        let mut old = played(4, 0, 60);
        for m in &mut old {
            m.patch = Some("14.1".into());
        }
        matches.append(&mut old);

        let rates = win_rates(&matches, Some("14.1"), now());
        assert_eq!(rates.patch, Some(0.0));
        assert_eq!(rates.last_30_days, Some(0.75));
        assert_eq!(rates.season, Some(0.375));

        assert_eq!(win_rates(&matches, None, now()).patch, None);
        assert_eq!(win_rates(&[], Some("14.1"), now()), WinRates::default());
    }

    #[test]
    fn test_comfort_pick_is_high_confidence() {
        let aggregate = aggregate(25, &[]);
        let matches = played(10, 7, 1);
        let request = PickRequest {
            champion_name: "Ahri",
            ..Default::default()
        };
        let history = ChampionHistory {
            aggregate: Some(&aggregate),
            matches: &matches,
        };
        let pick = analyze_pick(&request, history, now());

        assert!(pick.is_comfort_pick);
        assert!(!pick.is_risk_pick);
        assert_eq!(pick.confidence, PickConfidence::HighConfidence);
        assert_eq!(pick.confidence_label, "High Confidence Pick");
        assert_eq!(pick.matchup_difficulty, MatchupDifficulty::Unknown);
        assert_eq!(pick.team_synergy_score, 50.0);
        assert_eq!(pick.champion_id, 103);
        assert_eq!(
            pick.hints,
            vec![
                "Strong comfort champion, go for it!",
                "On a hot streak with this champion lately.",
            ]
        );
    }

    #[test]
    fn test_bad_matchup_is_counter_risk() {
        let aggregate = aggregate(30, &[("Zed", 0.3), ("Lux", 0.6)]);
        let allies = vec!["Jinx".to_string(), "Thresh".to_string()];
        let enemies = vec!["Zed".to_string()];
        let history = ChampionHistory {
            aggregate: Some(&aggregate),
            matches: &[],
        };

        let session = analyze_draft_session("me", "Ahri", &allies, &enemies, None, history, now());
        let pick = &session.picks[0];
        assert_eq!(pick.matchup_win_rate, Some(0.3));
        assert_eq!(pick.matchup_difficulty, MatchupDifficulty::Hard);
        assert!(pick.is_comfort_pick);
        assert!(pick.is_risk_pick);
        assert_eq!(pick.confidence, PickConfidence::CounterRisk);
        assert_eq!(pick.hints, vec!["Historically struggles into Zed."]);
        assert_eq!(pick.team_synergy_score, 65.0);

        assert_eq!(session.team_synergy_overall, 65.0);
        assert!(session.recommended_bans.is_empty());
        assert_eq!(
            session.draft_warnings,
            vec!["Potential lane counter, have a counterpick ready."]
        );
    }

    #[test]
    fn test_unknown_champion_is_blind_pick() {
        let request = PickRequest {
            champion_name: "Aurora",
            enemy_champion: Some("Zed"),
            ..Default::default()
        };
        let history = ChampionHistory {
            aggregate: None,
            matches: &[],
        };
        let pick = analyze_pick(&request, history, now());

        assert_eq!(pick.champion_id, 0);
        assert_eq!(pick.games_played_total, 0);
        assert_eq!(pick.matchup_difficulty, MatchupDifficulty::Unknown);
        assert_eq!(pick.confidence, PickConfidence::RiskyPick);
        assert_eq!(
            pick.hints,
            vec![
                "Low experience or poor recent performance on this champion.",
                "No match history found, blind pick detected.",
            ]
        );
    }

    #[test]
    fn test_recent_slump_is_risky() {
        let aggregate = aggregate(12, &[("Zed", 0.5)]);
        let matches = played(10, 4, 3);
        let request = PickRequest {
            champion_name: "Ahri",
            enemy_champion: Some("Zed"),
            ..Default::default()
        };
        let history = ChampionHistory {
            aggregate: Some(&aggregate),
            matches: &matches,
        };
        let pick = analyze_pick(&request, history, now());
        assert_eq!(pick.matchup_difficulty, MatchupDifficulty::Medium);
        assert_eq!(pick.confidence, PickConfidence::RiskyPick);

        // Enough games and no slump
        let matches = played(10, 5, 3);
        let history = ChampionHistory {
            aggregate: Some(&aggregate),
            matches: &matches,
        };
        let pick = analyze_pick(&request, history, now());
        assert_eq!(pick.confidence, PickConfidence::Normal);
        assert_eq!(pick.confidence_label, "Standard Pick");
        assert!(pick.hints.is_empty());
    }

    #[test]
    fn test_team_synergy_is_capped() {
        assert_eq!(team_synergy(1), 55.0);
        assert_eq!(team_synergy(5), 75.0);
        assert_eq!(team_synergy(10), 80.0);
    }
}
