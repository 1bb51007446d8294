use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TiltRiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl TiltRiskLevel {
    pub fn from_indicator(indicator: f64) -> Self {
        if indicator >= 75.0 {
            TiltRiskLevel::Critical
        } else if indicator >= 50.0 {
            TiltRiskLevel::High
        } else if indicator >= 25.0 {
            TiltRiskLevel::Medium
        } else {
            TiltRiskLevel::Low
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SmurfConfidence {
    Low,
    Medium,
    High,
    VeryHigh,
}

impl SmurfConfidence {
    /// Small samples cap the confidence regardless of the score.
    pub fn from_sample(games_analyzed: usize, score: f64) -> Self {
        if games_analyzed < 5 {
            SmurfConfidence::Low
        } else if games_analyzed < 15 {
            SmurfConfidence::Medium
        } else if score >= 70.0 {
            SmurfConfidence::VeryHigh
        } else {
            SmurfConfidence::High
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PickConfidence {
    HighConfidence,
    RiskyPick,
    CounterRisk,
    Normal,
}

impl PickConfidence {
    pub fn label(&self) -> &'static str {
        match self {
            PickConfidence::HighConfidence => "High Confidence Pick",
            PickConfidence::RiskyPick => "Risky Pick",
            PickConfidence::CounterRisk => "Counter Risk",
            PickConfidence::Normal => "Standard Pick",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchupDifficulty {
    Easy,
    Medium,
    Hard,
    Unknown,
}

impl From<Option<f64>> for MatchupDifficulty {
    fn from(matchup_win_rate: Option<f64>) -> Self {
        match matchup_win_rate {
            None => MatchupDifficulty::Unknown,
            Some(wr) if wr >= 0.55 => MatchupDifficulty::Easy,
            Some(wr) if wr >= 0.45 => MatchupDifficulty::Medium,
            Some(_) => MatchupDifficulty::Hard,
        }
    }
}
