use crate::stats::{clamp_score, mean, vision_per_minute, win_rate};
use lane_scout_db::model::MatchRecord;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    #[default]
    Last20,
    Last50,
    Season,
}

impl Period {
    /// Most recent games covered by the period.
    pub fn game_limit(&self) -> i64 {
        match self {
            Period::Last20 => 20,
            Period::Last50 => 50,
            Period::Season => 500,
        }
    }
}

impl FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "last20" => Ok(Period::Last20),
            "last50" => Ok(Period::Last50),
            "season" => Ok(Period::Season),
            other => Err(format!("unknown period {other:?}, expected last20, last50 or season")),
        }
    }
}

/// Reference averages of a rank. Vision is per minute.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Benchmark {
    pub rank: &'static str,
    pub avg_kda: f64,
    pub avg_cs_per_minute: f64,
    pub avg_damage_share: f64,
    pub avg_vision_per_minute: f64,
}

pub const MASTER: Benchmark = Benchmark {
    rank: "MASTER",
    avg_kda: 3.2,
    avg_cs_per_minute: 8.5,
    avg_damage_share: 0.28,
    avg_vision_per_minute: 1.4,
};

pub const GRANDMASTER: Benchmark = Benchmark {
    rank: "GRANDMASTER",
    avg_kda: 3.5,
    avg_cs_per_minute: 8.8,
    avg_damage_share: 0.29,
    avg_vision_per_minute: 1.5,
};

pub const CHALLENGER: Benchmark = Benchmark {
    rank: "CHALLENGER",
    avg_kda: 3.8,
    avg_cs_per_minute: 9.2,
    avg_damage_share: 0.30,
    avg_vision_per_minute: 1.6,
};

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct PlayerAggregateStats {
    pub games_analyzed: usize,
    pub avg_kda: f64,
    pub avg_cs_per_minute: f64,
    /// Not derived from match data yet; always 0.
    pub avg_damage_share: f64,
    pub avg_vision_score: f64,
    pub win_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankComparison {
    pub rank: &'static str,
    pub kda_delta: f64,
    pub cs_delta: f64,
    pub damage_share_delta: f64,
    pub vision_delta: f64,
    pub overall_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Benchmarks {
    pub master: RankComparison,
    pub grandmaster: RankComparison,
    pub challenger: RankComparison,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PercentileRankings {
    pub kda: f64,
    pub cs: f64,
    pub damage_share: f64,
    pub vision: f64,
    pub overall: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceReport {
    pub puuid: String,
    pub period: Period,
    pub player_stats: PlayerAggregateStats,
    pub benchmarks: Benchmarks,
    pub percentile_rankings: PercentileRankings,
    pub strengths: Vec<&'static str>,
    pub weaknesses: Vec<&'static str>,
    pub lane_phase_score: f64,
    /// Objective data is not extracted from matches; always 50.
    pub objective_impact_score: f64,
}

/// Build the performance report from the player's most recent games. At most
/// [`Period::game_limit`] games are used.
pub fn performance_report(puuid: &str, period: Period, matches: &[MatchRecord]) -> PerformanceReport {
    let mut recent = crate::stats::newest_first(matches);
    recent.truncate(period.game_limit() as usize);

    let player_stats = aggregate_stats(&recent);
    let percentiles = percentiles(&player_stats);

    PerformanceReport {
        puuid: puuid.to_string(),
        period,
        benchmarks: Benchmarks {
            master: compare(&player_stats, &MASTER),
            grandmaster: compare(&player_stats, &GRANDMASTER),
            challenger: compare(&player_stats, &CHALLENGER),
        },
        strengths: strengths(&player_stats, &percentiles),
        weaknesses: weaknesses(&percentiles),
        lane_phase_score: lane_phase_score(&player_stats),
        objective_impact_score: 50.0,
        percentile_rankings: percentiles,
        player_stats,
    }
}

pub fn aggregate_stats(recent: &[&MatchRecord]) -> PlayerAggregateStats {
    if recent.is_empty() {
        return PlayerAggregateStats::default();
    }
    PlayerAggregateStats {
        games_analyzed: recent.len(),
        avg_kda: mean(recent.iter().map(|m| m.kda)).unwrap_or_default(),
        avg_cs_per_minute: mean(recent.iter().map(|m| m.cs_per_minute)).unwrap_or_default(),
        avg_damage_share: 0.0,
        avg_vision_score: mean(recent.iter().map(|m| vision_per_minute(m))).unwrap_or_default(),
        win_rate: win_rate(recent.iter().copied()).unwrap_or_default(),
    }
}

pub fn compare(stats: &PlayerAggregateStats, benchmark: &Benchmark) -> RankComparison {
    let kda_delta = stats.avg_kda - benchmark.avg_kda;
    let cs_delta = stats.avg_cs_per_minute - benchmark.avg_cs_per_minute;
    let damage_share_delta = stats.avg_damage_share - benchmark.avg_damage_share;
    let vision_delta = stats.avg_vision_score - benchmark.avg_vision_per_minute;

    RankComparison {
        rank: benchmark.rank,
        kda_delta,
        cs_delta,
        damage_share_delta,
        vision_delta,
        overall_score: clamp_score(50.0 + kda_delta * 5.0 + cs_delta * 3.0 + vision_delta * 10.0),
    }
}

/// Heuristic percentiles from fixed reference ceilings.
pub fn percentiles(stats: &PlayerAggregateStats) -> PercentileRankings {
    let normalized = |value: f64, ceiling: f64| (value / ceiling * 100.0).min(100.0);
    let kda = normalized(stats.avg_kda, 4.0);
    let cs = normalized(stats.avg_cs_per_minute, 10.0);
    let vision = normalized(stats.avg_vision_score, 2.0);
    let damage_share = normalized(stats.avg_damage_share, 0.35);

    PercentileRankings {
        kda,
        cs,
        damage_share,
        vision,
        overall: (kda + cs + vision + damage_share) / 4.0,
    }
}

fn strengths(stats: &PlayerAggregateStats, percentiles: &PercentileRankings) -> Vec<&'static str> {
    let mut strengths = Vec::new();
    if percentiles.kda >= 70.0 {
        strengths.push("KDA / Survivability");
    }
    if percentiles.cs >= 70.0 {
        strengths.push("CS Efficiency");
    }
    if percentiles.vision >= 70.0 {
        strengths.push("Vision Control");
    }
    if percentiles.damage_share >= 70.0 {
        strengths.push("Damage Output");
    }
    if stats.win_rate >= 0.55 {
        strengths.push("Win Rate");
    }
    strengths
}

fn weaknesses(percentiles: &PercentileRankings) -> Vec<&'static str> {
    let mut weaknesses = Vec::new();
    if percentiles.kda < 40.0 {
        weaknesses.push("KDA / Death Trading");
    }
    if percentiles.cs < 40.0 {
        weaknesses.push("CS Efficiency");
    }
    if percentiles.vision < 40.0 {
        weaknesses.push("Vision Control");
    }
    if percentiles.damage_share < 40.0 {
        weaknesses.push("Damage Contribution");
    }
    weaknesses
}

pub fn lane_phase_score(stats: &PlayerAggregateStats) -> f64 {
    (stats.avg_cs_per_minute / 9.0 * 70.0 + stats.avg_kda / 4.0 * 30.0).min(100.0)
}
