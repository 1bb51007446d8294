use super::RiotGateway;
use crate::config::MAX_MATCHES_PER_SYNC;
use crate::error::SyncError;
use riven::consts::RegionalRoute;
use tracing::debug;

/// Parameters of a match ID listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchIdsQuery {
    pub count: u8,
    pub start: Option<u32>,
    pub queue: Option<u16>,
    pub match_type: Option<String>,
}

impl Default for MatchIdsQuery {
    fn default() -> Self {
        Self {
            count: 20,
            start: None,
            queue: None,
            match_type: None,
        }
    }
}

impl MatchIdsQuery {
    pub fn new(count: u8, queue: Option<u16>) -> Self {
        Self {
            count,
            queue,
            ..Default::default()
        }
    }

    /// Query string parameters, with `count` bounded to what the API accepts.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("count", self.count.clamp(1, MAX_MATCHES_PER_SYNC).to_string()),
            ("start", self.start.unwrap_or_default().to_string()),
        ];
        if let Some(queue) = self.queue {
            params.push(("queue", queue.to_string()));
        }
        if let Some(match_type) = &self.match_type {
            params.push(("type", match_type.clone()));
        }
        params
    }
}

impl RiotGateway {
    /// Get match IDs from the Riot API, newest first.
    pub async fn get_match_ids(
        &self,
        puuid: &str,
        region: RegionalRoute,
        query: &MatchIdsQuery,
    ) -> Result<Vec<String>, SyncError> {
        let path = format!("/lol/match/v5/matches/by-puuid/{puuid}/ids");
        let match_ids: Vec<String> = self.get(region, &path, &query.params()).await?;
        debug!("Got match IDs: {match_ids:?}");
        Ok(match_ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_for_ranked_solo() {
        let query = MatchIdsQuery::new(20, Some(420));
        assert_eq!(
            query.params(),
            vec![
                ("count", "20".to_string()),
                ("start", "0".to_string()),
                ("queue", "420".to_string()),
            ]
        );
    }

    #[test]
    fn test_params_bound_count_and_pass_type() {
        let query = MatchIdsQuery {
            count: 200,
            start: Some(40),
            queue: None,
            match_type: Some("ranked".into()),
        };
        assert_eq!(
            query.params(),
            vec![
                ("count", "100".to_string()),
                ("start", "40".to_string()),
                ("type", "ranked".to_string()),
            ]
        );
    }
}
