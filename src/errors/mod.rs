/// Unified error handling module
use thiserror::Error;

/// Failure of one feed query. Recovered per airport by the monitor.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("feed request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("feed returned status {0}")]
    Status(u16),

    #[error("feed response could not be decoded: {0}")]
    Decode(String),
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("feed error: {0}")]
    Feed(#[from] FeedError),

    #[error("store io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("missing store blob: {0}")]
    MissingStore(String),

    #[error("malformed record: {0}")]
    MalformedRecord(String),
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Feed(FeedError::Http(err))
    }
}

/// Type alias for application results
pub type AppResult<T> = Result<T, AppError>;
