#![allow(dead_code)]

use async_trait::async_trait;
use chrono::Utc;
use lane_scout_db::model::{MatchRecord, User};
use lane_scout_db::{DbHandler, SqlitePoolOptions};
use lane_scout_sync::error::SyncError;
use lane_scout_sync::normalizer::{normalize, Normalized};
use lane_scout_sync::riot_api::{MatchGateway, MatchIdsQuery};
use lane_scout_sync::{MatchSync, SyncConfig};
use sqlx::SqlitePool;
use riven::consts::RegionalRoute;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Instant;

pub const ME: &str = "puuid-me-0123456789";
pub const OTHER: &str = "puuid-other-0123456789";

pub async fn memory_db() -> Arc<DbHandler> {
    memory_db_with_pool().await.0
}

/// An in-memory database together with its pool, for writing rows the handler
/// would never produce.
pub async fn memory_db_with_pool() -> (Arc<DbHandler>, SqlitePool) {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    let db = DbHandler::new(pool.clone());
    db.migrate().await.unwrap();
    (Arc::new(db), pool)
}

pub async fn seed_user(db: &DbHandler, id: &str, puuid: Option<&str>, platform: Option<&str>) {
    db.upsert_user(&User {
        id: id.into(),
        riot_puuid: puuid.map(Into::into),
        riot_summoner_name: Some(format!("{id}#EUW")),
        riot_platform: platform.map(Into::into),
        is_active: true,
        create_time: Utc::now().naive_utc(),
    })
    .await
    .unwrap();
}

pub fn test_config() -> SyncConfig {
    SyncConfig {
        request_delay_ms: 0,
        ..Default::default()
    }
}

/// A ranked game between `puuids`, the first of them on Ahri and winning.
pub fn match_payload(match_id: &str, game_creation: i64, puuids: &[&str]) -> Value {
    let participants: Vec<Value> = puuids
        .iter()
        .enumerate()
        .map(|(i, puuid)| {
            json!({
                "puuid": puuid,
                "championId": if i == 0 { 103 } else { 238 },
                "championName": if i == 0 { "Ahri" } else { "Zed" },
                "lane": "MIDDLE",
                "role": "SOLO",
                "win": i == 0,
                "kills": 6,
                "deaths": 2,
                "assists": 8,
                "totalDamageDealt": 140000,
                "totalDamageDealtToChampions": 25000,
                "goldEarned": 12000,
                "totalMinionsKilled": 190,
                "neutralMinionsKilled": 8,
                "visionScore": 21
            })
        })
        .collect();

    json!({
        "metadata": { "matchId": match_id, "participants": puuids },
        "info": {
            "gameCreation": game_creation,
            "gameDuration": 1800,
            "gameVersion": "14.10.590.1234",
            "queueId": 420,
            "participants": participants
        }
    })
}

pub fn record_of(payload: &Value, puuid: &str) -> MatchRecord {
    match normalize(payload, puuid).unwrap() {
        Normalized::Record(record) => *record,
        Normalized::NotParticipant => panic!("{puuid} is not in the payload"),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    List {
        puuid: String,
        region: RegionalRoute,
        count: u8,
        queue: Option<u16>,
    },
    Fetch(String),
}

/// In-memory [`MatchGateway`] recording every call.
#[derive(Default)]
pub struct MockGateway {
    match_ids: Mutex<HashMap<String, Vec<String>>>,
    matches: Mutex<HashMap<String, Value>>,
    list_error: Mutex<Option<SyncError>>,
    concurrent_insert: Mutex<Option<(Arc<DbHandler>, MatchRecord)>>,
    calls: Mutex<Vec<Call>>,
    call_times: Mutex<Vec<Instant>>,
}

impl MockGateway {
    pub fn set_match_ids(&self, puuid: &str, ids: &[&str]) {
        self.match_ids
            .lock()
            .unwrap()
            .insert(puuid.into(), ids.iter().map(|id| id.to_string()).collect());
    }

    pub fn add_match(&self, match_id: &str, payload: Value) {
        self.matches.lock().unwrap().insert(match_id.into(), payload);
    }

    pub fn fail_listing(&self, error: SyncError) {
        *self.list_error.lock().unwrap() = Some(error);
    }

    /// Store `record` right before the fetch of its match returns, as a concurrent
    /// run for the same player would.
    pub fn insert_during_fetch(&self, db: Arc<DbHandler>, record: MatchRecord) {
        *self.concurrent_insert.lock().unwrap() = Some((db, record));
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// When each call of [`Self::calls`] reached the gateway.
    pub fn call_times(&self) -> Vec<Instant> {
        self.call_times.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
        self.call_times.lock().unwrap().push(Instant::now());
    }

    pub fn fetches(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Fetch(id) => Some(id),
                Call::List { .. } => None,
            })
            .collect()
    }

    pub fn listed_puuids(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::List { puuid, .. } => Some(puuid),
                Call::Fetch(_) => None,
            })
            .collect()
    }
}

#[async_trait]
impl MatchGateway for MockGateway {
    async fn list_match_ids(
        &self,
        puuid: &str,
        region: RegionalRoute,
        query: &MatchIdsQuery,
    ) -> Result<Vec<String>, SyncError> {
        self.record(Call::List {
            puuid: puuid.into(),
            region,
            count: query.count,
            queue: query.queue,
        });
        if let Some(error) = self.list_error.lock().unwrap().take() {
            return Err(error);
        }
        Ok(self
            .match_ids
            .lock()
            .unwrap()
            .get(puuid)
            .cloned()
            .unwrap_or_default())
    }

    async fn fetch_match(&self, match_id: &str, _region: RegionalRoute) -> Result<Value, SyncError> {
        self.record(Call::Fetch(match_id.into()));

        let concurrent = {
            let mut slot = self.concurrent_insert.lock().unwrap();
            let due = matches!(slot.as_ref(), Some((_, record)) if record.match_id == match_id);
            if due {
                slot.take()
            } else {
                None
            }
        };
        if let Some((db, record)) = concurrent {
            db.insert_match(&record).await.unwrap();
        }

        self.matches
            .lock()
            .unwrap()
            .get(match_id)
            .cloned()
            .ok_or_else(|| SyncError::UpstreamApi {
                status_code: Some(404),
                message: "Data not found - match file not found".into(),
            })
    }
}

pub fn match_sync(db: Arc<DbHandler>, gateway: Arc<MockGateway>) -> MatchSync<MockGateway> {
    MatchSync::new(db, gateway, test_config())
}

pub fn match_sync_with_delay(
    db: Arc<DbHandler>,
    gateway: Arc<MockGateway>,
    request_delay_ms: u64,
) -> MatchSync<MockGateway> {
    let config = SyncConfig {
        request_delay_ms,
        ..Default::default()
    };
    MatchSync::new(db, gateway, config)
}
