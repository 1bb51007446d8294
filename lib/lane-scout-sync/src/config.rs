use chrono::TimeDelta;
use riven::consts::Queue;
use serde::Deserialize;
use std::time::Duration;

// Max value that Riot API accepts for getting match IDs
pub const MAX_MATCHES_PER_SYNC: u8 = 100;

/// Tunables of the sync engine.
///
/// The request delay exists because the upstream development key is limited to
/// 20 req/s and 100 req/2min; at 1200ms the steady state is ~50 req/min.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Match IDs requested per sync run
    pub matches_per_sync: u8,
    /// Pause before every upstream request
    pub request_delay_ms: u64,
    /// Minimum time between two scheduled syncs of the same player
    pub sync_cooldown_mins: i64,
    /// Period of the scheduled sweep
    pub sweep_interval_secs: u64,
    /// Queue the match ID listing is restricted to, `None` for every queue
    pub queue_filter: Option<u16>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            matches_per_sync: 20,
            request_delay_ms: 1200,
            sync_cooldown_mins: 30,
            sweep_interval_secs: 30 * 60,
            queue_filter: Some(u16::from(Queue::SUMMONERS_RIFT_5V5_RANKED_SOLO)),
        }
    }
}

impl SyncConfig {
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    /// Pause inserted between two players of a scheduled sweep.
    pub fn player_delay(&self) -> Duration {
        self.request_delay() * 2
    }

    pub fn sync_cooldown(&self) -> TimeDelta {
        TimeDelta::minutes(self.sync_cooldown_mins)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    pub fn page_size(&self) -> u8 {
        self.matches_per_sync.clamp(1, MAX_MATCHES_PER_SYNC)
    }
}

/// Where and how the match gateway reaches the Riot API.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Base URL of the routing host; `{region}` is replaced by the lowercase routing region
    pub routing_base_url: String,
    pub timeout_secs: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            routing_base_url: "https://{region}.api.riotgames.com".to_string(),
            timeout_secs: 10,
        }
    }
}

impl GatewayConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SyncConfig::default();
        assert_eq!(config.page_size(), 20);
        assert_eq!(config.request_delay(), Duration::from_millis(1200));
        assert_eq!(config.player_delay(), Duration::from_millis(2400));
        assert_eq!(config.sync_cooldown(), TimeDelta::minutes(30));
        assert_eq!(config.queue_filter, Some(420));
    }

    #[test]
    fn test_page_size_is_bounded() {
        let config = SyncConfig {
            matches_per_sync: 250,
            ..Default::default()
        };
        assert_eq!(config.page_size(), MAX_MATCHES_PER_SYNC);

        let config = SyncConfig {
            matches_per_sync: 0,
            ..Default::default()
        };
        assert_eq!(config.page_size(), 1);
    }
}
