use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("upstream API error ({}): {message}", status_code.map_or_else(|| "no status".to_string(), |code| code.to_string()))]
    UpstreamApi {
        status_code: Option<u16>,
        message: String,
    },
    #[error("malformed match payload: {0}")]
    MalformedPayload(String),
    #[error("unknown platform: {0:?}")]
    UnknownPlatform(String),
    #[error("sync already in progress for {0}")]
    Conflict(String),
    #[error("no Riot account linked to user {0}")]
    NoLinkedAccount(String),
    #[error("illegal sync state transition for {puuid}: {to} requires a running sync")]
    IllegalTransition { puuid: String, to: &'static str },
    #[error(transparent)]
    DbError(#[from] lane_scout_db::Error),
}

impl From<reqwest::Error> for SyncError {
    fn from(e: reqwest::Error) -> Self {
        SyncError::UpstreamApi {
            status_code: e.status().map(|status| status.as_u16()),
            message: e.to_string(),
        }
    }
}
