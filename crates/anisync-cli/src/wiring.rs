use std::collections::HashMap;
use std::sync::Arc;

use anisync_api::{AniListClient, ArmProvider, HatoProvider, JikanProvider, MalClient, OfflineDbProvider};
use anisync_core::cache::{MappingCache, DEFAULT_TTL_DAYS};
use anisync_core::context::Context;
use anisync_core::engine::Engine;
use anisync_core::models::{Direction, MediaVariant};
use anisync_core::options::SyncOptions;
use anisync_core::providers::{MappingProvider, TitleEnrichmentProvider};
use anisync_core::report::SyncReport;
use anisync_core::strategies::{ManualMapping, StrategyChain};
use anyhow::Result;

use crate::auth;
use crate::cli::SyncArgs;
use crate::config::AppConfig;
use crate::token_store::TokenStore;

/// Where each provider's on-disk state lives, shared across every
/// (variant, direction) pass in one process invocation.
pub struct Providers {
    hato_cache_path: std::path::PathBuf,
    arm_cache_path: std::path::PathBuf,
    offline_db_dir: std::path::PathBuf,
}

impl Providers {
    pub fn new(cache_dir: std::path::PathBuf) -> Self {
        Self {
            hato_cache_path: cache_dir.join("hato.json"),
            arm_cache_path: cache_dir.join("arm.json"),
            offline_db_dir: cache_dir.join("offline_db"),
        }
    }
}

/// Resolves both access tokens, constructs the two service clients for one
/// media variant, builds the strategy chain's providers, and runs one
/// reconciliation pass. Returns the resulting report.
pub async fn run_pass(
    ctx: &Context,
    config: &AppConfig,
    tokens: &TokenStore,
    providers: &Providers,
    variant: MediaVariant,
    direction: Direction,
    sync_args: &SyncArgs,
) -> Result<Arc<SyncReport>> {
    let anilist_token = tokens
        .get("anilist")
        .await
        .ok_or_else(|| anyhow::anyhow!("not logged in to AniList; run `anisync login anilist` first"))?
        .access_token;
    let mal_token = auth::ensure_fresh_mal_token(tokens, &config.mal.client_id).await?;

    let anilist_client = Arc::new(AniListClient::new(variant, anilist_token));
    let mal_client = Arc::new(MalClient::new(variant, mal_token));

    let use_offline_db = sync_args.resolve_offline_db(config.sync.offline_db) && variant == MediaVariant::Anime;
    let use_arm = sync_args.resolve_arm_api(config.sync.arm_api) && variant == MediaVariant::Anime;

    let offline_db: Option<Arc<dyn MappingProvider>> = if use_offline_db {
        Some(Arc::new(OfflineDbProvider::load(ctx, providers.offline_db_dir.clone(), true).await?))
    } else {
        None
    };

    let hato_provider =
        Arc::new(HatoProvider::new(MappingCache::load(&providers.hato_cache_path, DEFAULT_TTL_DAYS)));
    let hato: Option<Arc<dyn MappingProvider>> = Some(hato_provider.clone());

    let arm_provider = if use_arm {
        Some(Arc::new(ArmProvider::new(MappingCache::load(&providers.arm_cache_path, DEFAULT_TTL_DAYS))))
    } else {
        None
    };
    let arm: Option<Arc<dyn MappingProvider>> =
        arm_provider.clone().map(|p| p as Arc<dyn MappingProvider>);

    let jikan: Option<Arc<dyn TitleEnrichmentProvider>> =
        if variant == MediaVariant::Manga { Some(Arc::new(JikanProvider::new())) } else { None };

    let manual = manual_mapping(config);
    let ignore_list: std::collections::HashSet<String> = config.sync.ignore_list.iter().cloned().collect();

    let options = SyncOptions {
        direction,
        variants: vec![variant],
        force: sync_args.force,
        dry_run: sync_args.dry_run,
        ignore_list,
        use_offline_db,
        use_arm_api: use_arm,
        verbose: sync_args.verbose,
    };

    let report = match direction {
        Direction::Forward => {
            let chain = StrategyChain { manual, offline_db, hato, arm, jikan, target_adapter: mal_client };
            let engine = Engine::new(anilist_client, chain, options);
            engine.run(ctx).await?
        }
        Direction::Reverse => {
            let chain = StrategyChain { manual, offline_db, hato, arm, jikan, target_adapter: anilist_client };
            let engine = Engine::new(mal_client, chain, options);
            engine.run(ctx).await?
        }
    };

    // Flush only if mutated; `MappingCache::flush` is itself a no-op
    // when the dirty flag was never set.
    hato_provider.cache().flush()?;
    if let Some(provider) = arm_provider {
        provider.cache().flush()?;
    }

    Ok(report)
}

fn manual_mapping(config: &AppConfig) -> ManualMapping {
    let overrides: HashMap<u64, u64> =
        config.sync.manual_mappings.iter().map(|m| (m.source_id, m.target_id)).collect();
    ManualMapping::new(overrides)
}
