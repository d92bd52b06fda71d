use std::sync::Arc;

use anisync_core::context::Context;
use anisync_core::models::Direction;
use anisync_core::report::SyncReport;
use anyhow::Result;

use crate::cli::SyncArgs;
use crate::config::AppConfig;
use crate::token_store::TokenStore;
use crate::unmapped;
use crate::wiring::{self, Providers};

/// Runs one reconciliation pass across every variant selected by `--manga`/
/// `--all`, each running independently for its (variant, direction) pair.
/// Passes run sequentially.
pub async fn run(config: &AppConfig, args: &SyncArgs) -> Result<Vec<Arc<SyncReport>>> {
    let direction = if args.reverse_direction { Direction::Reverse } else { Direction::Forward };
    let ctx = Context::new();
    let tokens = TokenStore::load(AppConfig::token_path()).await?;
    let providers = Providers::new(AppConfig::cache_dir());

    let mut reports = Vec::new();
    for variant in args.variants() {
        tracing::info!(%variant, ?direction, "starting reconciliation pass");
        match wiring::run_pass(&ctx, config, &tokens, &providers, variant, direction, args).await {
            Ok(report) => {
                println!("--- {variant} ({direction:?}) ---");
                println!("{}", report.render_summary());
                reports.push(report);
            }
            Err(err) => {
                eprintln!("pass for {variant} failed: {err:#}");
            }
        }
    }

    if !reports.is_empty() {
        let path = AppConfig::unmapped_path();
        if let Err(err) = unmapped::write_unmapped_report(&path, &reports) {
            tracing::warn!(%err, "failed to write unmapped-entries report");
        }
    }

    Ok(reports)
}
