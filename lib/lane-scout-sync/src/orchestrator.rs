use crate::aggregator::ChampionAggregator;
use crate::config::SyncConfig;
use crate::error::SyncError;
use crate::normalizer::{normalize, Normalized};
use crate::riot_api::route::resolve_region;
use crate::riot_api::{MatchGateway, MatchIdsQuery};
use crate::tracker::{is_legal, SyncTracker, Transition};
use chrono::Utc;
use lane_scout_db::model::{SyncState, SyncStatus};
use lane_scout_db::DbHandler;
use riven::consts::RegionalRoute;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Outcome of one player's sync run. Returned even when the run ended in `error`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncResult {
    pub puuid: String,
    pub added: u32,
    pub skipped: u32,
    pub errors: u32,
    pub duration_ms: u64,
}

enum Stored {
    Added,
    AlreadyPresent,
    NotParticipant,
}

/// Shortened player identifier for log lines.
pub fn short_id(puuid: &str) -> &str {
    puuid
        .char_indices()
        .nth(8)
        .map_or(puuid, |(end, _)| &puuid[..end])
}

/// Drives match ingestion for every tracked player.
pub struct MatchSync<G> {
    db: Arc<DbHandler>,
    gateway: Arc<G>,
    tracker: SyncTracker,
    aggregator: ChampionAggregator,
    config: SyncConfig,
}

impl<G: MatchGateway> MatchSync<G> {
    pub fn new(db: Arc<DbHandler>, gateway: Arc<G>, config: SyncConfig) -> Self {
        Self {
            tracker: SyncTracker::new(db.clone()),
            aggregator: ChampionAggregator::new(db.clone()),
            db,
            gateway,
            config,
        }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Sync every active linked player that is neither running nor inside the
    /// cooldown window. Per-player failures are logged and do not stop the sweep.
    pub async fn run_scheduled_sweep(&self) -> Result<Vec<SyncResult>, SyncError> {
        let users = self.db.get_active_linked_users().await?;
        info!("Starting sweep over {} linked players", users.len());

        let mut results = Vec::new();
        for user in &users {
            let Some((puuid, platform)) = user.linked_account() else {
                continue;
            };

            match self.db.get_sync_status(puuid).await {
                Ok(Some(status)) => {
                    if let Some(reason) = self.skip_reason(&status) {
                        debug!("Skipping {}: {reason}", short_id(puuid));
                        continue;
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    warn!("Could not read sync status of {}: {e}", short_id(puuid));
                    continue;
                }
            }

            if !results.is_empty() {
                tokio::time::sleep(self.config.player_delay()).await;
            }

            match self.sync_user(&user.id, puuid, platform).await {
                Ok(result) => results.push(result),
                Err(e) => warn!("Could not sync {}: {e}", short_id(puuid)),
            }
        }

        info!("Sweep finished, {} players synced", results.len());
        Ok(results)
    }

    fn skip_reason(&self, status: &SyncStatus) -> Option<&'static str> {
        if !is_legal(status.state, SyncState::Syncing) {
            return Some("sync already running");
        }
        let last_synced_at = status.last_synced_at?;
        (Utc::now() - last_synced_at < self.config.sync_cooldown()).then_some("synced recently")
    }

    /// Sync one user right away, bypassing the cooldown.
    pub async fn trigger_manual_sync(&self, user_id: &str) -> Result<SyncResult, SyncError> {
        let user = self
            .db
            .get_user(user_id)
            .await?
            .ok_or_else(|| SyncError::NoLinkedAccount(user_id.to_string()))?;
        let (puuid, platform) = user
            .linked_account()
            .ok_or_else(|| SyncError::NoLinkedAccount(user_id.to_string()))?;

        info!("Manual sync requested for {user_id:?}");
        self.sync_user(user_id, puuid, platform).await
    }

    /// Sync status of the user's linked account, `None` if there is none yet.
    pub async fn get_sync_status(&self, user_id: &str) -> Result<Option<SyncStatus>, SyncError> {
        let Some(user) = self.db.get_user(user_id).await? else {
            return Ok(None);
        };
        match user.linked_account() {
            Some((puuid, _)) => Ok(self.db.get_sync_status(puuid).await?),
            None => Ok(None),
        }
    }

    /// Run one sync for a player. Only precondition failures (unknown platform, sync
    /// already running) are returned as errors; everything after the `syncing`
    /// transition ends up in the [`SyncResult`].
    #[tracing::instrument(skip_all, fields(player = short_id(puuid)))]
    pub async fn sync_user(
        &self,
        user_id: &str,
        puuid: &str,
        platform: &str,
    ) -> Result<SyncResult, SyncError> {
        let region = resolve_region(platform)?;
        self.tracker.get_or_create(user_id, puuid).await?;
        self.tracker
            .transition(user_id, puuid, Transition::Syncing)
            .await?;
        info!("Syncing on {region}");

        let started = Instant::now();
        let mut result = SyncResult {
            puuid: puuid.to_string(),
            ..Default::default()
        };

        if let Err(e) = self.run(user_id, puuid, region, &mut result).await {
            error!("Sync failed: {e}");
            result.errors += 1;
            if let Err(e) = self
                .tracker
                .transition(user_id, puuid, Transition::Error(e.to_string()))
                .await
            {
                error!("Could not record sync failure: {e}");
            }
        }

        result.duration_ms = started.elapsed().as_millis() as u64;
        info!(
            "Sync finished: {} added, {} skipped, {} errors in {}ms",
            result.added, result.skipped, result.errors, result.duration_ms
        );
        Ok(result)
    }

    async fn run(
        &self,
        user_id: &str,
        puuid: &str,
        region: RegionalRoute,
        result: &mut SyncResult,
    ) -> Result<(), SyncError> {
        tokio::time::sleep(self.config.request_delay()).await;
        let query = MatchIdsQuery::new(self.config.page_size(), self.config.queue_filter);
        let match_ids = self.gateway.list_match_ids(puuid, region, &query).await?;

        let stored = self.db.get_stored_match_ids(puuid, &match_ids).await?;
        result.skipped += stored.len() as u32;
        debug!(
            "{} match IDs listed, {} already stored",
            match_ids.len(),
            stored.len()
        );

        for match_id in match_ids.iter().filter(|id| !stored.contains(*id)) {
            tokio::time::sleep(self.config.request_delay()).await;
            match self.store_match(match_id, puuid, region).await {
                Ok(Stored::Added) => result.added += 1,
                Ok(Stored::AlreadyPresent) => result.skipped += 1,
                Ok(Stored::NotParticipant) => {
                    warn!("Player is not a participant of {match_id}, ignoring")
                }
                Err(e) => {
                    error!("Failed to store match {match_id}: {e}");
                    result.errors += 1;
                }
            }
        }

        if result.added > 0 {
            self.aggregator.recompute(puuid).await?;
        }

        let total_matches_synced = self.db.count_matches(puuid).await?;
        self.tracker
            .transition(
                user_id,
                puuid,
                Transition::Idle {
                    total_matches_synced,
                    added: i64::from(result.added),
                    latest_match_id: match_ids.first().cloned(),
                    synced_at: Utc::now(),
                },
            )
            .await
    }

    async fn store_match(
        &self,
        match_id: &str,
        puuid: &str,
        region: RegionalRoute,
    ) -> Result<Stored, SyncError> {
        let payload = self.gateway.fetch_match(match_id, region).await?;
        let record = match normalize(&payload, puuid)? {
            Normalized::Record(record) => record,
            Normalized::NotParticipant => return Ok(Stored::NotParticipant),
        };

        match self.db.insert_match(&record).await {
            Ok(()) => {
                debug!("Stored match {match_id}");
                Ok(Stored::Added)
            }
            Err(lane_scout_db::Error::DuplicateMatch(_)) => {
                debug!("Match {match_id} was stored concurrently");
                Ok(Stored::AlreadyPresent)
            }
            Err(e) => Err(e.into()),
        }
    }
}
