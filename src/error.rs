use thiserror::Error;

#[derive(Debug, Error)]
pub enum OptWatchError {
    #[error("database error: {0}")]
    Persistence(#[from] sqlx::Error),

    #[error("feed error: {0}")]
    Feed(String),

    #[error("'{0}' is not a valid month")]
    InvalidExpiry(String),

    #[error("notify error: {0}")]
    Notify(String),
}

// reqwest failures always surface through the feed client.
impl From<reqwest::Error> for OptWatchError {
    fn from(e: reqwest::Error) -> Self {
        OptWatchError::Feed(e.to_string())
    }
}
