use async_trait::async_trait;

use crate::context::Context;
use crate::error::Result;
use crate::models::MediaVariant;

/// One resolved mapping, as returned by an ID-mapping provider. `None` in
/// either field means that namespace's ID is unknown, not that the lookup
/// failed — lookup failure is a `Result::Err`, a miss is `Ok(None)` mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdMapping {
    pub anilist_id: Option<u64>,
    pub mal_id: Option<u64>,
}

impl IdMapping {
    pub fn is_empty(&self) -> bool {
        self.anilist_id.is_none() && self.mal_id.is_none()
    }
}

/// The namespace a lookup ID belongs to, used to pick the right query
/// parameter/path segment on each remote provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdNamespace {
    AniList,
    MyAnimeList,
}

/// A minimal ID-mapping contract shared by the offline database, the
/// ARM-style and Hato-style remote APIs, and the Jikan-style search/enrich
/// client. Implementations that reach the network must route through
/// [`crate::retry::RetryTransport`].
///
/// Uses `async_trait` rather than native async-fn-in-trait because the
/// strategy chain holds these behind `Arc<dyn MappingProvider>` — one chain,
/// several concrete provider types, resolved at runtime rather than per
/// monomorphized engine instance.
///
/// Returns `Ok(None)` for "not found" (including offline-cached negatives),
/// not an error — only genuine I/O/parse failures are `Err`.
#[async_trait]
pub trait MappingProvider: Send + Sync {
    async fn lookup(
        &self,
        ctx: &Context,
        namespace: IdNamespace,
        media_type: MediaVariant,
        id: u64,
    ) -> Result<Option<IdMapping>>;

    /// A short name for this provider, used in report/log prefixes.
    fn name(&self) -> &'static str;
}

/// Enriches a source title with additional synonyms from a remote search,
/// used by the Jikan-style manga provider to widen the title strategy's
/// candidate pool rather than to resolve an ID directly.
#[async_trait]
pub trait TitleEnrichmentProvider: Send + Sync {
    async fn enrich_titles(&self, ctx: &Context, title: &str) -> Result<Vec<String>>;

    fn name(&self) -> &'static str;
}
