use anyhow::Result;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::AppConfig;

/// Installs the global `tracing` subscriber: an `EnvFilter` seeded from the
/// config's `log_level` (overridable via `RUST_LOG`), a pretty-printed
/// stderr layer, and a daily-rotating file layer under the platform data
/// directory (useful for `watch`, which otherwise runs for days unattended).
/// Verbose mode (`--verbose`) lowers the default filter to `debug` so the
/// strategy chain's `[DECISION]` spans are visible.
///
/// The returned [`WorkerGuard`] flushes the file appender's background
/// writer on drop; the caller must hold it for the process's lifetime.
pub fn init(config: &AppConfig, verbose: bool) -> Result<WorkerGuard> {
    let mut directive = if verbose { "debug".to_string() } else { config.general.log_level.clone() };
    if config.general.suppress_connection_errors {
        directive.push_str(",reqwest::retry=off,hyper_util=off");
    }

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&directive));

    let log_dir = AppConfig::log_dir();
    std::fs::create_dir_all(&log_dir)?;
    let file_appender = tracing_appender::rolling::daily(&log_dir, "anisync.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(tracing_subscriber::fmt::layer().with_ansi(false).with_writer(non_blocking))
        .init();

    Ok(guard)
}
