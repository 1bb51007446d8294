//! Match ingestion for tracked League of Legends players: pulls new matches from the
//! Riot API, stores one normalized record per player and match, keeps per-champion
//! aggregates current and records the sync state of each player.

pub mod aggregator;
pub mod config;
pub mod error;
pub mod normalizer;
pub mod orchestrator;
pub mod riot_api;
pub mod scheduler;
pub mod tracker;

pub use config::{GatewayConfig, SyncConfig};
pub use error::SyncError;
pub use orchestrator::{MatchSync, SyncResult};
pub use riot_api::{MatchGateway, RiotGateway};
