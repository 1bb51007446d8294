use crate::error::SyncError;
use crate::orchestrator::short_id;
use chrono::{DateTime, Utc};
use lane_scout_db::model::{SyncState, SyncStatus};
use lane_scout_db::{DbHandler, SyncCompletion};
use std::sync::Arc;
use tracing::{debug, warn};

/// A requested move of a player's sync state.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    Syncing,
    Idle {
        total_matches_synced: i64,
        added: i64,
        latest_match_id: Option<String>,
        synced_at: DateTime<Utc>,
    },
    Error(String),
}

impl Transition {
    pub fn target(&self) -> SyncState {
        match self {
            Transition::Syncing => SyncState::Syncing,
            Transition::Idle { .. } => SyncState::Idle,
            Transition::Error(_) => SyncState::Error,
        }
    }
}

/// Legal edges of the sync state machine.
pub fn is_legal(from: SyncState, to: SyncState) -> bool {
    matches!(
        (from, to),
        (SyncState::Idle, SyncState::Syncing)
            | (SyncState::Error, SyncState::Syncing)
            | (SyncState::Syncing, SyncState::Idle)
            | (SyncState::Syncing, SyncState::Error)
    )
}

/// Durable per-player sync state. Every transition is a single conditional write,
/// so two callers can never both enter `syncing` for one PUUID.
#[derive(Debug, Clone)]
pub struct SyncTracker {
    db: Arc<DbHandler>,
}

impl SyncTracker {
    pub fn new(db: Arc<DbHandler>) -> Self {
        Self { db }
    }

    pub async fn get_or_create(&self, user_id: &str, puuid: &str) -> Result<SyncStatus, SyncError> {
        Ok(self.db.get_or_create_sync_status(user_id, puuid).await?)
    }

    pub async fn transition(
        &self,
        user_id: &str,
        puuid: &str,
        transition: Transition,
    ) -> Result<(), SyncError> {
        let target = transition.target();
        let applied = match transition {
            Transition::Syncing => {
                if !self.db.try_begin_sync(user_id, puuid).await? {
                    debug!("Sync already running for {}", short_id(puuid));
                    return Err(SyncError::Conflict(puuid.to_string()));
                }
                true
            }
            Transition::Idle {
                total_matches_synced,
                added,
                latest_match_id,
                synced_at,
            } => {
                let completion = SyncCompletion {
                    total_matches_synced,
                    last_sync_added_count: added,
                    latest_match_id,
                    synced_at,
                };
                self.db.complete_sync(puuid, &completion).await?
            }
            Transition::Error(message) => self.db.fail_sync(puuid, &message).await?,
        };

        if !applied {
            warn!("Rejected sync transition to {target} for {}", short_id(puuid));
            return Err(SyncError::IllegalTransition {
                puuid: puuid.to_string(),
                to: target.as_str(),
            });
        }
        debug!("Sync state of {} is now {target}", short_id(puuid));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_table() {
        use SyncState::*;
        assert!(is_legal(Idle, Syncing));
        assert!(is_legal(Error, Syncing));
        assert!(is_legal(Syncing, Idle));
        assert!(is_legal(Syncing, Error));

        assert!(!is_legal(Syncing, Syncing));
        assert!(!is_legal(Error, Idle));
        assert!(!is_legal(Idle, Error));
        assert!(!is_legal(Idle, Idle));
    }
}
