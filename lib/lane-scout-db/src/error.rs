use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    SqlxError(#[from] sqlx::Error),
    #[error(transparent)]
    MigrateError(#[from] sqlx::migrate::MigrateError),
    #[error("match {0} is already stored for this player")]
    DuplicateMatch(String),
    #[error("missing data: {0} is not available")]
    MissingData(String),
}
