use anyhow::Context;
use lane_scout_sync::{GatewayConfig, SyncConfig};
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;
use tokio::fs::read_to_string;

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database_url: String,
    pub rgapi_key: String,
    pub sync: SyncConfig,
    pub gateway: GatewayConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite://lane-scout.db".to_string(),
            rgapi_key: String::new(),
            sync: SyncConfig::default(),
            gateway: GatewayConfig::default(),
        }
    }
}

impl Config {
    pub async fn load(path: Option<impl AsRef<Path>>) -> anyhow::Result<Self> {
        let mut config = match path {
            Some(path) => Self::load_file(path).await?,
            None => Default::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    async fn load_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let contents = read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Replace values with the ones found by `lookup`, keyed by environment variable name.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<()> {
        if let Some(database_url) = lookup("DATABASE_URL") {
            self.database_url = database_url;
        }
        if let Some(rgapi_key) = lookup("RGAPI_KEY") {
            self.rgapi_key = rgapi_key;
        }
        if let Some(routing_base_url) = lookup("RIOT_ROUTING_BASE_URL") {
            self.gateway.routing_base_url = routing_base_url;
        }

        let sync = &mut self.sync;
        parse_override(&lookup, "MATCHES_PER_SYNC", &mut sync.matches_per_sync)?;
        parse_override(&lookup, "REQUEST_DELAY_MS", &mut sync.request_delay_ms)?;
        parse_override(&lookup, "SYNC_COOLDOWN_MINS", &mut sync.sync_cooldown_mins)?;
        parse_override(&lookup, "SWEEP_INTERVAL_SECS", &mut sync.sweep_interval_secs)?;
        Ok(())
    }

    /// Fail early for commands that talk to the Riot API.
    pub fn require_api_key(&self) -> anyhow::Result<&str> {
        anyhow::ensure!(
            !self.rgapi_key.is_empty(),
            "RGAPI_KEY must be set to reach the Riot API"
        );
        Ok(&self.rgapi_key)
    }
}

fn parse_override<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    target: &mut T,
) -> anyhow::Result<()>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    if let Some(value) = lookup(key) {
        *target = value
            .trim()
            .parse()
            .with_context(|| format!("{key} should be numeric, got {value:?}"))?;
    }
    Ok(())
}
