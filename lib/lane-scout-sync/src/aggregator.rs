use crate::error::SyncError;
use crate::normalizer::round_to;
use lane_scout_db::model::{ChampionAggregate, Json, MatchRecord};
use lane_scout_db::DbHandler;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// Games on a champion from which it counts as a comfort pick.
pub const COMFORT_PICK_GAMES: i64 = 20;

/// Rebuilds a player's per-champion aggregates from every stored match.
#[derive(Debug, Clone)]
pub struct ChampionAggregator {
    db: Arc<DbHandler>,
}

impl ChampionAggregator {
    pub fn new(db: Arc<DbHandler>) -> Self {
        Self { db }
    }

    /// Recompute and store every champion aggregate of the PUUID. Returns the
    /// number of champions written.
    pub async fn recompute(&self, puuid: &str) -> Result<usize, SyncError> {
        let matches = self.db.get_matches(puuid).await?;
        let aggregates = aggregate(puuid, &matches);
        for champion in &aggregates {
            self.db.upsert_champion_aggregate(champion).await?;
        }
        debug!(
            "Recomputed {} champion aggregates from {} matches",
            aggregates.len(),
            matches.len()
        );
        Ok(aggregates.len())
    }
}

/// Group the matches by champion and fold each group into an all-time aggregate.
pub fn aggregate(puuid: &str, matches: &[MatchRecord]) -> Vec<ChampionAggregate> {
    let mut by_champion: BTreeMap<i64, Vec<&MatchRecord>> = BTreeMap::new();
    for record in matches.iter().filter(|m| m.puuid == puuid) {
        by_champion.entry(record.champion_id).or_default().push(record);
    }

    by_champion
        .into_iter()
        .map(|(champion_id, games)| {
            let games_played = games.len() as i64;
            let wins = games.iter().filter(|m| m.win).count() as i64;
            let mean = |f: fn(&MatchRecord) -> f64| {
                round_to(games.iter().map(|m| f(m)).sum::<f64>() / games_played as f64, 2)
            };
            // Champion names can change between patches, keep the newest one
            let champion_name = games
                .iter()
                .max_by_key(|m| m.game_creation)
                .map(|m| m.champion_name.clone())
                .unwrap_or_default();

            ChampionAggregate {
                puuid: puuid.to_string(),
                champion_id,
                champion_name,
                scope: None,
                games_played,
                wins,
                win_rate: win_rate(wins, games_played),
                avg_kda: mean(|m| m.kda),
                avg_cs_per_minute: mean(|m| m.cs_per_minute),
                avg_damage_share: 0.0,
                avg_vision_score: mean(|m| m.vision_score as f64),
                is_comfort_pick: games_played >= COMFORT_PICK_GAMES,
                matchup_win_rates: Json(BTreeMap::new()),
            }
        })
        .collect()
}

/// Win rate rounded to 4 decimals, 0 without games.
pub fn win_rate(wins: i64, games: i64) -> f64 {
    if games == 0 {
        return 0.0;
    }
    round_to(wins as f64 / games as f64, 4)
}
