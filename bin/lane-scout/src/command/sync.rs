use super::print_json;
use crate::config::Config;
use anyhow::Context;
use chrono::Utc;
use lane_scout_db::model::User;
use lane_scout_db::DbHandler;
use lane_scout_sync::riot_api::route::resolve_region;
use lane_scout_sync::scheduler::{run_sweeps, IntervalTrigger};
use lane_scout_sync::{MatchSync, RiotGateway};
use std::sync::Arc;
use tracing::info;

fn match_sync(
    config: &Config,
    db: Arc<DbHandler>,
    api_key: &str,
) -> anyhow::Result<MatchSync<RiotGateway>> {
    let gateway =
        RiotGateway::new(api_key, &config.gateway).context("Failed to set up Riot API client")?;
    Ok(MatchSync::new(db, Arc::new(gateway), config.sync.clone()))
}

pub async fn run(config: &Config, db: Arc<DbHandler>) -> anyhow::Result<()> {
    let sync = match_sync(config, db, config.require_api_key()?)?;
    let trigger = IntervalTrigger::new(sync.config().sweep_interval());

    info!(
        "Starting scheduled sweeps every {}s",
        sync.config().sweep_interval().as_secs()
    );
    tokio::select! {
        sweeps = run_sweeps(&sync, trigger) => info!("Scheduler stopped after {sweeps} sweeps"),
        signal = tokio::signal::ctrl_c() => {
            signal.context("Failed to listen for shutdown signal")?;
            info!("Shutting down");
        }
    }
    Ok(())
}

pub async fn sync(config: &Config, db: Arc<DbHandler>, user_id: &str) -> anyhow::Result<()> {
    let sync = match_sync(config, db, config.require_api_key()?)?;
    let result = sync
        .trigger_manual_sync(user_id)
        .await
        .with_context(|| format!("Could not sync user {user_id:?}"))?;
    print_json(&result)
}

pub async fn status(config: &Config, db: Arc<DbHandler>, user_id: &str) -> anyhow::Result<()> {
    // Reading the status never reaches upstream, so no API key is needed
    let sync = match_sync(config, db, &config.rgapi_key)?;
    match sync.get_sync_status(user_id).await? {
        Some(status) => print_json(&status),
        None => {
            info!("User {user_id:?} has no sync status yet");
            print_json(&serde_json::Value::Null)
        }
    }
}

pub async fn link(
    db: &DbHandler,
    user_id: String,
    puuid: String,
    platform: String,
    summoner_name: Option<String>,
) -> anyhow::Result<()> {
    let region = resolve_region(&platform)?;
    let user = User {
        id: user_id,
        riot_puuid: Some(puuid),
        riot_summoner_name: summoner_name,
        riot_platform: Some(platform.trim().to_uppercase()),
        is_active: true,
        create_time: Utc::now().naive_utc(),
    };
    db.upsert_user(&user).await.context("Failed to store user")?;
    info!("Linked user {:?} on {region}", user.id);
    print_json(&user)
}
