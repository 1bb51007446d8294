use crate::label::SmurfConfidence;
use crate::stats::{mean, win_rate};
use lane_scout_db::model::MatchRecord;
use serde::Serialize;

/// Earliest games considered by a smurf report.
pub const MAX_GAMES: i64 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    RankProgression,
    WinrateVsRank,
    MechanicalOutlier,
    KdaOutlier,
}

impl Signal {
    pub fn weight(&self) -> u32 {
        match self {
            Signal::RankProgression => 30,
            Signal::WinrateVsRank => 25,
            Signal::MechanicalOutlier => 25,
            Signal::KdaOutlier => 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SmurfSignal {
    pub signal: Signal,
    pub detected: bool,
    pub weight: u32,
    pub description: String,
}

impl SmurfSignal {
    fn new(signal: Signal, detected: bool, description: impl Into<String>) -> Self {
        Self {
            signal,
            detected,
            weight: signal.weight(),
            description: description.into(),
        }
    }

    fn not_enough_games(signal: Signal) -> Self {
        Self::new(signal, false, "Not enough games")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SmurfReport {
    pub puuid: String,
    pub smurf_probability_score: f64,
    pub confidence_level: SmurfConfidence,
    pub signals: Vec<SmurfSignal>,
    pub summary: String,
    pub rank_progression_score: u32,
    pub win_rate_vs_rank_score: u32,
    pub mechanical_outlier_score: u32,
    /// Account age is not tracked; always 0.
    pub account_age_score: u32,
}

/// Typical win rate of a tier, 50% when unknown.
pub fn tier_average_win_rate(tier: Option<&str>) -> f64 {
    match tier.map(str::to_uppercase).as_deref() {
        Some("IRON") => 0.48,
        Some("BRONZE") => 0.49,
        Some("SILVER") | Some("GOLD") => 0.50,
        Some("PLATINUM") | Some("EMERALD") => 0.51,
        Some("DIAMOND") => 0.52,
        Some("MASTER") => 0.53,
        _ => 0.5,
    }
}

/// Build the smurf report over the earliest [`MAX_GAMES`] of `matches`.
pub fn smurf_report(puuid: &str, matches: &[MatchRecord]) -> SmurfReport {
    let mut earliest: Vec<&MatchRecord> = matches.iter().collect();
    earliest.sort_by_key(|m| m.game_creation);
    earliest.truncate(MAX_GAMES as usize);

    let signals = vec![
        rank_progression(&earliest),
        win_rate_vs_rank(&earliest),
        mechanical_outlier(&earliest),
        kda_outlier(&earliest),
    ];

    let total_weight: u32 = signals.iter().map(|s| s.weight).sum();
    let detected_weight: u32 = signals.iter().filter(|s| s.detected).map(|s| s.weight).sum();
    let score = if total_weight > 0 {
        f64::from(detected_weight) / f64::from(total_weight) * 100.0
    } else {
        0.0
    };

    let display = |signal: Signal, detected: u32, not_detected: u32| {
        let hit = signals.iter().any(|s| s.signal == signal && s.detected);
        if hit {
            detected
        } else {
            not_detected
        }
    };

    SmurfReport {
        puuid: puuid.to_string(),
        smurf_probability_score: score,
        confidence_level: SmurfConfidence::from_sample(earliest.len(), score),
        summary: summary(score, &signals),
        rank_progression_score: display(Signal::RankProgression, 80, 10),
        win_rate_vs_rank_score: display(Signal::WinrateVsRank, 85, 15),
        mechanical_outlier_score: display(Signal::MechanicalOutlier, 90, 10),
        account_age_score: 0,
        signals,
    }
}

/// Win rate of at least 75% over the first ten games.
fn rank_progression(earliest: &[&MatchRecord]) -> SmurfSignal {
    let first = &earliest[..earliest.len().min(10)];
    let Some(wr) = win_rate(first.iter().copied()) else {
        return SmurfSignal::not_enough_games(Signal::RankProgression);
    };
    if wr >= 0.75 {
        SmurfSignal::new(
            Signal::RankProgression,
            true,
            format!(
                "Unusually fast rank progression (WR {:.0}% in first 10 games)",
                wr * 100.0
            ),
        )
    } else {
        SmurfSignal::new(Signal::RankProgression, false, "Normal rank progression speed")
    }
}

/// Win rate at least 12 points above the average of the latest known tier.
fn win_rate_vs_rank(earliest: &[&MatchRecord]) -> SmurfSignal {
    if earliest.len() < 10 {
        return SmurfSignal::not_enough_games(Signal::WinrateVsRank);
    }
    let wr = win_rate(earliest.iter().copied()).unwrap_or_default();
    let tier = earliest.last().and_then(|m| m.tier.as_deref());
    let average = tier_average_win_rate(tier);

    if wr >= average + 0.12 {
        SmurfSignal::new(
            Signal::WinrateVsRank,
            true,
            format!(
                "Win rate ({:.0}%) significantly above {} average ({:.0}%)",
                wr * 100.0,
                tier.map(str::to_uppercase).unwrap_or_else(|| "rank".to_string()),
                average * 100.0
            ),
        )
    } else {
        SmurfSignal::new(Signal::WinrateVsRank, false, "Win rate within expected range")
    }
}

fn mechanical_outlier(earliest: &[&MatchRecord]) -> SmurfSignal {
    if earliest.len() < 5 {
        return SmurfSignal::not_enough_games(Signal::MechanicalOutlier);
    }
    let avg_kda = mean(earliest.iter().map(|m| m.kda)).unwrap_or_default();
    let avg_cs = mean(earliest.iter().map(|m| m.cs_per_minute)).unwrap_or_default();

    if avg_kda >= 3.5 && avg_cs >= 8.0 {
        SmurfSignal::new(
            Signal::MechanicalOutlier,
            true,
            format!("Outlier mechanics: avg KDA {avg_kda:.2}, avg CS/min {avg_cs:.1}"),
        )
    } else {
        SmurfSignal::new(
            Signal::MechanicalOutlier,
            false,
            "Mechanical stats within expected range",
        )
    }
}

fn kda_outlier(earliest: &[&MatchRecord]) -> SmurfSignal {
    if earliest.len() < 5 {
        return SmurfSignal::not_enough_games(Signal::KdaOutlier);
    }
    let avg_kda = mean(earliest.iter().map(|m| m.kda)).unwrap_or_default();

    if avg_kda >= 4.5 {
        SmurfSignal::new(
            Signal::KdaOutlier,
            true,
            format!("Extremely high average KDA: {avg_kda:.2}"),
        )
    } else {
        SmurfSignal::new(Signal::KdaOutlier, false, "KDA within expected range")
    }
}

fn summary(score: f64, signals: &[SmurfSignal]) -> String {
    let detected = signals.iter().filter(|s| s.detected).count();
    if score >= 70.0 {
        format!(
            "High smurf probability ({score:.0}%), {detected}/{} signals triggered.",
            signals.len()
        )
    } else if score >= 40.0 {
        format!("Moderate smurf indicators ({score:.0}%), worth monitoring.")
    } else {
        format!("Low smurf probability ({score:.0}%), appears to be a legitimate account.")
    }
}
