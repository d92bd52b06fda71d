use std::time::Duration;

use reqwest::{Request, Response, StatusCode};
use tracing::{debug, warn};

use crate::context::Context;
use crate::error::{Result, SyncError};

/// Exponential backoff parameters for the retry transport.
#[derive(Debug, Clone, Copy)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub multiplier: f64,
    pub max_backoff: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_secs(1),
            multiplier: 2.0,
            max_backoff: Duration::from_secs(30),
        }
    }
}

impl RetryConfig {
    fn backoff_for(&self, attempt: u32) -> Duration {
        let millis = self.initial_backoff.as_millis() as f64 * self.multiplier.powi(attempt as i32);
        Duration::from_millis(millis as u64).min(self.max_backoff)
    }
}

/// Wraps a [`reqwest::Client`] with the exponential-backoff retry policy
/// shared by every outbound HTTP call: AniList/MAL service adapters and every
/// ID-mapping provider.
///
/// Retries on HTTP 408/429/5xx and on network errors that look transient
/// (connection refused/reset, broken pipe). Every attempt after the first
/// re-clones the request, since a consumed body can't be replayed. Cancelling
/// `ctx` aborts the loop immediately, even mid-backoff.
#[derive(Clone)]
pub struct RetryTransport {
    client: reqwest::Client,
    config: RetryConfig,
}

impl RetryTransport {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client, config: RetryConfig::default() }
    }

    pub fn with_config(client: reqwest::Client, config: RetryConfig) -> Self {
        Self { client, config }
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    pub async fn execute(&self, ctx: &Context, request: Request) -> Result<Response> {
        let mut attempt = 0;
        let mut current = Some(request);

        loop {
            ctx.check()?;
            let request = current
                .take()
                .expect("request is re-populated before every loop iteration except the last");
            let next_clone = request.try_clone();

            match self.client.execute(request).await {
                Ok(response) if !is_retryable_status(response.status()) => return Ok(response),
                Ok(response) => {
                    let status = response.status();
                    if attempt + 1 >= self.config.max_attempts {
                        warn!(status = %status, attempt, "giving up after retryable status");
                        return Ok(response);
                    }
                    debug!(status = %status, attempt, "retrying after retryable status");
                }
                Err(err) if !is_retryable_network_error(&err) => return Err(err.into()),
                Err(err) => {
                    if attempt + 1 >= self.config.max_attempts {
                        return Err(SyncError::Transient(err.to_string()));
                    }
                    debug!(error = %err, attempt, "retrying after transient network error");
                }
            }

            let Some(clone) = next_clone else {
                return Err(SyncError::Transient(
                    "request body could not be re-read for a retry attempt".into(),
                ));
            };
            current = Some(clone);

            let backoff = self.config.backoff_for(attempt);
            ctx.sleep(backoff).await?;
            attempt += 1;
        }
    }
}

fn is_retryable_status(status: StatusCode) -> bool {
    status == StatusCode::REQUEST_TIMEOUT || status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

fn is_retryable_network_error(err: &reqwest::Error) -> bool {
    if err.is_timeout() || err.is_connect() {
        return true;
    }
    let msg = err.to_string().to_lowercase();
    ["connection refused", "connection reset", "broken pipe"]
        .iter()
        .any(|needle| msg.contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_statuses() {
        assert!(is_retryable_status(StatusCode::REQUEST_TIMEOUT));
        assert!(is_retryable_status(StatusCode::TOO_MANY_REQUESTS));
        assert!(is_retryable_status(StatusCode::INTERNAL_SERVER_ERROR));
        assert!(is_retryable_status(StatusCode::BAD_GATEWAY));
        assert!(!is_retryable_status(StatusCode::OK));
        assert!(!is_retryable_status(StatusCode::NOT_FOUND));
        assert!(!is_retryable_status(StatusCode::BAD_REQUEST));
    }

    #[test]
    fn backoff_caps_at_max() {
        let config = RetryConfig::default();
        assert_eq!(config.backoff_for(0), Duration::from_secs(1));
        assert_eq!(config.backoff_for(1), Duration::from_secs(2));
        assert_eq!(config.backoff_for(2), Duration::from_secs(4));
        assert_eq!(config.backoff_for(10), Duration::from_secs(30));
    }
}
