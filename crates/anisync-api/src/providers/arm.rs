use anisync_core::cache::MappingCache;
use anisync_core::context::Context;
use anisync_core::error::Result;
use anisync_core::models::MediaVariant;
use anisync_core::providers::{IdMapping, IdNamespace, MappingProvider};
use anisync_core::retry::RetryTransport;
use async_trait::async_trait;
use serde::Deserialize;

use crate::error::ApiError;

const BASE_URL: &str = "https://arm.haglund.dev";

#[derive(Debug, Deserialize)]
struct ArmIds {
    anilist: Option<u64>,
    myanimelist: Option<u64>,
}

/// Remote ID-mapping lookup backed by an anime-relations API.
/// Anime-only — the upstream service doesn't track manga. A 404 means "no
/// mapping known", not an error; both positive and negative results are
/// cached.
pub struct ArmProvider {
    transport: RetryTransport,
    cache: MappingCache,
}

impl ArmProvider {
    pub fn new(cache: MappingCache) -> Self {
        Self { transport: RetryTransport::new(reqwest::Client::new()), cache }
    }

    /// Exposes the backing cache so a caller can flush it to disk once a
    /// sync pass finishes, if any entry was mutated during the pass.
    pub fn cache(&self) -> &MappingCache {
        &self.cache
    }
}

#[async_trait]
impl MappingProvider for ArmProvider {
    async fn lookup(
        &self,
        ctx: &Context,
        namespace: IdNamespace,
        media_type: MediaVariant,
        id: u64,
    ) -> Result<Option<IdMapping>> {
        if media_type != MediaVariant::Anime {
            return Ok(None);
        }
        if let Some(cached) = self.cache.get(self.name(), media_type, id) {
            return Ok(if cached.is_empty() { None } else { Some(cached) });
        }

        let source = match namespace {
            IdNamespace::AniList => "anilist",
            IdNamespace::MyAnimeList => "myanimelist",
        };
        let url = format!("{BASE_URL}/api/v2/ids");
        let request = self
            .transport
            .client()
            .get(&url)
            .query(&[("source", source), ("id", &id.to_string()), ("include", "anilist,myanimelist")])
            .build()
            .map_err(ApiError::Http)?;
        let response = self.transport.execute(ctx, request).await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            self.cache.put(self.name(), media_type, id, IdMapping::default());
            return Ok(None);
        }
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::status("arm", status, body).into());
        }

        let parsed: ArmIds =
            response.json().await.map_err(|e| ApiError::Parse(e.to_string(), "arm"))?;
        let mapping = IdMapping { anilist_id: parsed.anilist, mal_id: parsed.myanimelist };
        self.cache.put(self.name(), media_type, id, mapping.clone());
        Ok(if mapping.is_empty() { None } else { Some(mapping) })
    }

    fn name(&self) -> &'static str {
        "arm"
    }
}
