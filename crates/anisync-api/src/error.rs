use anisync_core::SyncError;
use thiserror::Error;

/// Errors raised while talking to AniList, MyAnimeList, or an ID-mapping
/// API. Converts into [`SyncError`] at the crate boundary so core code never
/// has to know which service produced a failure.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{service} returned HTTP {status}: {message}")]
    Status { service: &'static str, status: u16, message: String },

    #[error("failed to parse {1} response: {0}")]
    Parse(String, &'static str),

    #[error("authentication error: {0}")]
    Auth(String),
}

impl ApiError {
    pub fn status(service: &'static str, status: u16, message: String) -> Self {
        Self::Status { service, status, message }
    }
}

impl From<ApiError> for SyncError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Auth(msg) => SyncError::Auth(msg),
            ApiError::Http(e) => SyncError::Transient(e.to_string()),
            other => SyncError::Api(other.to_string()),
        }
    }
}
