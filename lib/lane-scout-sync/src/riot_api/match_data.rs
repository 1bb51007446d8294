use super::RiotGateway;
use crate::error::SyncError;
use riven::consts::RegionalRoute;
use tracing::debug;

impl RiotGateway {
    /// Fetch the raw match payload from the Riot API given a match ID.
    ///
    /// The payload is kept untyped so the normalizer can report missing fields
    /// itself and retain the participant object verbatim.
    pub async fn get_match(
        &self,
        match_id: &str,
        region: RegionalRoute,
    ) -> Result<serde_json::Value, SyncError> {
        let path = format!("/lol/match/v5/matches/{match_id}");
        let match_data: serde_json::Value = self.get(region, &path, &[]).await?;
        debug!("Fetched match data: {match_id:?}");
        Ok(match_data)
    }
}
