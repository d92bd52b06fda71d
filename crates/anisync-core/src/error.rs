use thiserror::Error;

/// Errors raised by the reconciliation engine and its collaborators.
///
/// Mapping misses and match-guard rejections are *not* represented here —
/// they are recorded as outcomes/warnings, not errors.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("operation cancelled")]
    Cancelled,

    #[error("configuration error: {0}")]
    Config(String),

    #[error("authentication error: {0}")]
    Auth(String),

    #[error("transient network error after retries: {0}")]
    Transient(String),

    #[error("remote API error: {0}")]
    Api(String),

    #[error("cache error: {0}")]
    Cache(String),

    #[error("score {0} is out of the representable 0-10 range")]
    ScoreOutOfRange(i32),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl SyncError {
    /// Whether this error should halt the current sync pass rather than be
    /// captured per-entry and continued past.
    ///
    /// Only [`SyncError::Cancelled`] and [`SyncError::Config`] halt the whole
    /// process; [`SyncError::Auth`] halts just the affected service's passes.
    pub fn is_pass_fatal(&self) -> bool {
        matches!(
            self,
            SyncError::Cancelled | SyncError::Config(_) | SyncError::Auth(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
