use anyhow::{bail, Result};
use tokio::signal;
use tokio::time::Duration;
use tracing::{error, info};

use crate::cli::{WatchArgs, MAX_WATCH_INTERVAL_HOURS, MIN_WATCH_INTERVAL_HOURS};
use crate::commands::sync;
use crate::config::AppConfig;

/// Runs reconciliation on a repeating interval, or once and returns
/// if `--once` is set. A Ctrl+C between passes stops the loop cleanly.
pub async fn run(config: &AppConfig, args: &WatchArgs) -> Result<()> {
    if !(MIN_WATCH_INTERVAL_HOURS..=MAX_WATCH_INTERVAL_HOURS).contains(&args.interval) {
        bail!(
            "watch interval must be between {MIN_WATCH_INTERVAL_HOURS} and {MAX_WATCH_INTERVAL_HOURS} hours, got {}",
            args.interval
        );
    }

    sync::run(config, &args.sync).await?;

    if args.once {
        return Ok(());
    }

    let period = Duration::from_secs(args.interval * 3600);
    info!(interval_hours = args.interval, "entering watch loop; press Ctrl+C to stop");

    loop {
        tokio::select! {
            _ = tokio::time::sleep(period) => {
                if let Err(err) = sync::run(config, &args.sync).await {
                    error!(%err, "scheduled reconciliation pass failed");
                }
            }
            result = signal::ctrl_c() => {
                if let Err(err) = result {
                    error!(%err, "error listening for shutdown signal");
                }
                info!("shutdown signal received, stopping watch loop");
                break;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_are_sane() {
        assert!(MIN_WATCH_INTERVAL_HOURS < MAX_WATCH_INTERVAL_HOURS);
        assert_eq!(MAX_WATCH_INTERVAL_HOURS, 168);
    }
}
