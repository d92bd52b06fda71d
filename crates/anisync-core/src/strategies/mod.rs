mod guards;

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug_span;

use crate::context::Context;
use crate::error::Result;
use crate::matcher::{self, MatchResult};
use crate::models::{Direction, MediaEntity, MediaVariant};
use crate::providers::{IdNamespace, MappingProvider, TitleEnrichmentProvider};
use crate::report::{SyncReport, Warning};
use crate::service::ServiceAdapter;

pub use guards::{reject_match, RejectionReason};

/// Read-only per-pass index of the target service's full list, built once
/// before the per-entry loop starts.
pub struct TargetIndex {
    entries: Vec<MediaEntity>,
    by_mal_id: HashMap<u64, usize>,
    by_anilist_id: HashMap<u64, usize>,
}

impl TargetIndex {
    pub fn build(entries: Vec<MediaEntity>) -> Self {
        let mut by_mal_id = HashMap::new();
        let mut by_anilist_id = HashMap::new();
        for (i, entry) in entries.iter().enumerate() {
            if entry.id_mal != 0 {
                by_mal_id.insert(entry.id_mal, i);
            }
            if entry.id_anilist != 0 {
                by_anilist_id.insert(entry.id_anilist, i);
            }
        }
        Self { entries, by_mal_id, by_anilist_id }
    }

    pub fn entries(&self) -> &[MediaEntity] {
        &self.entries
    }

    /// Looks up a target entry by the ID namespace `direction` targets
    /// (MAL IDs forward, AniList IDs reverse).
    pub fn by_target_id(&self, direction: Direction, id: u64) -> Option<&MediaEntity> {
        if id == 0 {
            return None;
        }
        let idx = match direction {
            Direction::Forward => self.by_mal_id.get(&id),
            Direction::Reverse => self.by_anilist_id.get(&id),
        }?;
        self.entries.get(*idx)
    }

    /// Looks up a target entry by shared MAL ID regardless of direction —
    /// used by the reverse-sync cross-namespace scenario where the AniList ID
    /// is still unknown but both sides agree on the MAL ID.
    pub fn by_mal_id(&self, mal_id: u64) -> Option<&MediaEntity> {
        if mal_id == 0 {
            return None;
        }
        self.by_mal_id.get(&mal_id).and_then(|i| self.entries.get(*i))
    }
}

/// User-supplied `source_id -> target_id` overrides, highest priority in the
/// chain.
#[derive(Debug, Clone, Default)]
pub struct ManualMapping(HashMap<u64, u64>);

impl ManualMapping {
    pub fn new(overrides: HashMap<u64, u64>) -> Self {
        Self(overrides)
    }

    fn get(&self, source_id: u64) -> Option<u64> {
        self.0.get(&source_id).copied()
    }
}

/// The ordered pipeline of ID-resolution strategies, generic over the
/// target service adapter so the final remote-search strategy can call it
/// directly.
pub struct StrategyChain<T: ServiceAdapter> {
    pub manual: ManualMapping,
    pub offline_db: Option<Arc<dyn MappingProvider>>,
    pub hato: Option<Arc<dyn MappingProvider>>,
    pub arm: Option<Arc<dyn MappingProvider>>,
    pub jikan: Option<Arc<dyn TitleEnrichmentProvider>>,
    pub target_adapter: Arc<T>,
}

impl<T: ServiceAdapter> StrategyChain<T> {
    /// Runs the 8-step chain for one source entry, stopping at the first
    /// strategy that reports a match. Returns the resolved target entity, or
    /// `None` if every strategy missed (an "unmapped" outcome upstream).
    pub async fn resolve(
        &self,
        ctx: &Context,
        source: &MediaEntity,
        index: &TargetIndex,
        direction: Direction,
        report: &SyncReport,
    ) -> Result<Option<MediaEntity>> {
        ctx.check()?;
        let title = source.title.preferred().to_string();

        if let Some(target_id) = self.manual.get(source.source_id(direction)) {
            let _span = debug_span!("[DECISION]", strategy = "manual", title = %title).entered();
            if let Some(target) = index.by_target_id(direction, target_id) {
                return Ok(Some(target.clone()));
            }
        }

        {
            let _span = debug_span!("[DECISION]", strategy = "direct_id", title = %title).entered();
            let candidate_id = source.id_on(direction);
            if candidate_id != 0 {
                if let Some(target) = index.by_target_id(direction, candidate_id) {
                    return Ok(Some(target.clone()));
                }
            }
        }

        if source.variant == MediaVariant::Anime {
            if let Some(provider) = &self.offline_db {
                let _span = debug_span!("[DECISION]", strategy = "offline_db", title = %title).entered();
                if let Some(target) = self.try_provider(ctx, provider.as_ref(), source, index, direction).await? {
                    return Ok(Some(target));
                }
            }
        }

        if let Some(provider) = &self.hato {
            let _span = debug_span!("[DECISION]", strategy = "hato", title = %title).entered();
            if let Some(target) = self.try_provider(ctx, provider.as_ref(), source, index, direction).await? {
                return Ok(Some(target));
            }
        }

        if source.variant == MediaVariant::Anime {
            if let Some(provider) = &self.arm {
                let _span = debug_span!("[DECISION]", strategy = "arm", title = %title).entered();
                if let Some(target) = self.try_provider(ctx, provider.as_ref(), source, index, direction).await? {
                    return Ok(Some(target));
                }
            }
        }

        let mut enriched_titles = vec![title.clone()];
        if source.variant == MediaVariant::Manga {
            if let Some(jikan) = &self.jikan {
                let _span = debug_span!("[DECISION]", strategy = "jikan", title = %title).entered();
                if let Ok(mut extra) = jikan.enrich_titles(ctx, &title).await {
                    enriched_titles.append(&mut extra);
                }
            }
        }

        {
            let _span = debug_span!("[DECISION]", strategy = "title", title = %title).entered();
            for candidate_title in &enriched_titles {
                match matcher::match_title(candidate_title, index.entries(), source.variant) {
                    MatchResult::Matched(target) | MatchResult::Fuzzy(target, _) => {
                        if let Some(reason) = reject_match(source, target) {
                            report.record_warning(Warning {
                                title: title.clone(),
                                reason: reason.reason_str().to_string(),
                                detail: reason.detail(),
                                media_type: source.variant,
                            });
                            continue;
                        }
                        return Ok(Some(target.clone()));
                    }
                    MatchResult::NoMatch => continue,
                }
            }
        }

        {
            let _span = debug_span!("[DECISION]", strategy = "remote_search", title = %title).entered();
            let candidates = self.target_adapter.get_by_name(ctx, &title).await?;
            if let MatchResult::Matched(target) | MatchResult::Fuzzy(target, _) =
                matcher::match_title(&title, &candidates, source.variant)
            {
                if reject_match(source, target).is_none() {
                    return Ok(Some(target.clone()));
                }
            }
        }

        Ok(None)
    }

    async fn try_provider(
        &self,
        ctx: &Context,
        provider: &dyn MappingProvider,
        source: &MediaEntity,
        index: &TargetIndex,
        direction: Direction,
    ) -> Result<Option<MediaEntity>> {
        let namespace = match direction {
            Direction::Forward => IdNamespace::AniList,
            Direction::Reverse => IdNamespace::MyAnimeList,
        };
        let source_id = source.source_id(direction);
        if source_id == 0 {
            return Ok(None);
        }
        let Some(mapping) = provider.lookup(ctx, namespace, source.variant, source_id).await? else {
            return Ok(None);
        };
        let target_id = match direction {
            Direction::Forward => mapping.mal_id,
            Direction::Reverse => mapping.anilist_id,
        };
        Ok(target_id.and_then(|id| index.by_target_id(direction, id)).cloned())
    }
}
