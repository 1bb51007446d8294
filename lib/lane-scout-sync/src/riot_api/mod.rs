use crate::config::GatewayConfig;
use crate::error::SyncError;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use riven::consts::RegionalRoute;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, error};

pub mod match_data;
pub mod match_ids;
pub mod route;

pub use match_ids::MatchIdsQuery;

const RIOT_TOKEN_HEADER: &str = "X-Riot-Token";

/// Access to the upstream match-data service.
///
/// Implementations must not retry or cache; every call hits the network and
/// retry policy belongs to the caller.
#[async_trait]
pub trait MatchGateway: Send + Sync {
    /// Match IDs of a player, newest first.
    async fn list_match_ids(
        &self,
        puuid: &str,
        region: RegionalRoute,
        query: &MatchIdsQuery,
    ) -> Result<Vec<String>, SyncError>;

    /// Full raw payload of one match.
    async fn fetch_match(
        &self,
        match_id: &str,
        region: RegionalRoute,
    ) -> Result<serde_json::Value, SyncError>;
}

/// [`MatchGateway`] backed by the Riot HTTP API.
pub struct RiotGateway {
    client: Client,
    api_key: String,
    routing_base_url: String,
}

impl std::fmt::Debug for RiotGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RiotGateway")
            .field("routing_base_url", &self.routing_base_url)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct RiotErrorBody {
    status: RiotErrorStatus,
}

#[derive(Debug, Deserialize)]
struct RiotErrorStatus {
    message: String,
}

impl RiotGateway {
    pub fn new(api_key: impl Into<String>, config: &GatewayConfig) -> Result<Self, SyncError> {
        let client = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            routing_base_url: config.routing_base_url.trim_end_matches('/').to_string(),
        })
    }

    fn base_url(&self, region: RegionalRoute) -> String {
        self.routing_base_url
            .replace("{region}", &route::region_host(region))
    }

    /// Issue an authenticated GET and decode the JSON body. Any non-2xx response
    /// becomes [`SyncError::UpstreamApi`].
    async fn get<T: DeserializeOwned>(
        &self,
        region: RegionalRoute,
        path: &str,
        query: &[(&'static str, String)],
    ) -> Result<T, SyncError> {
        let url = format!("{}{path}", self.base_url(region));
        debug!("GET {url} {query:?}");

        let response = self
            .client
            .get(&url)
            .header(RIOT_TOKEN_HEADER, &self.api_key)
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = upstream_message(status, &body);
            error!("Riot API error [{status}]: {message} - {url}");
            return Err(SyncError::UpstreamApi {
                status_code: Some(status.as_u16()),
                message,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| SyncError::MalformedPayload(format!("undecodable response from {url}: {e}")))
    }
}

#[async_trait]
impl MatchGateway for RiotGateway {
    async fn list_match_ids(
        &self,
        puuid: &str,
        region: RegionalRoute,
        query: &MatchIdsQuery,
    ) -> Result<Vec<String>, SyncError> {
        self.get_match_ids(puuid, region, query).await
    }

    async fn fetch_match(
        &self,
        match_id: &str,
        region: RegionalRoute,
    ) -> Result<serde_json::Value, SyncError> {
        self.get_match(match_id, region).await
    }
}

/// Prefer the message Riot puts in `{"status": {"message": ..}}`, falling back to the
/// status line.
fn upstream_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<RiotErrorBody>(body)
        .map(|body| body.status.message)
        .unwrap_or_else(|_| {
            status
                .canonical_reason()
                .unwrap_or("unexpected status")
                .to_string()
        })
}
