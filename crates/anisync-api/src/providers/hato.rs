use anisync_core::cache::MappingCache;
use anisync_core::context::Context;
use anisync_core::error::Result;
use anisync_core::models::MediaVariant;
use anisync_core::providers::{IdMapping, IdNamespace, MappingProvider};
use anisync_core::retry::RetryTransport;
use async_trait::async_trait;
use serde::Deserialize;

use crate::error::ApiError;

const BASE_URL: &str = "https://hato.oyasumi.town";
const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

#[derive(Debug, Deserialize)]
struct HatoEnvelope {
    data: HatoMapping,
}

#[derive(Debug, Deserialize)]
struct HatoMapping {
    anilist_id: Option<u64>,
    mal_id: Option<u64>,
}

/// Remote ID-mapping lookup backed by a general-purpose mapping service.
/// Requires a browser-like user-agent or the service rejects the
/// request; a 404 means "no mapping known", not an error. All responses,
/// positive or negative, are cached.
pub struct HatoProvider {
    transport: RetryTransport,
    cache: MappingCache,
}

impl HatoProvider {
    pub fn new(cache: MappingCache) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .expect("static TLS config is always valid");
        Self { transport: RetryTransport::new(client), cache }
    }

    /// Exposes the backing cache so a caller can flush it to disk once a
    /// sync pass finishes, if any entry was mutated during the pass.
    pub fn cache(&self) -> &MappingCache {
        &self.cache
    }
}

#[async_trait]
impl MappingProvider for HatoProvider {
    async fn lookup(
        &self,
        ctx: &Context,
        namespace: IdNamespace,
        media_type: MediaVariant,
        id: u64,
    ) -> Result<Option<IdMapping>> {
        if let Some(cached) = self.cache.get(self.name(), media_type, id) {
            return Ok(if cached.is_empty() { None } else { Some(cached) });
        }

        let namespace_segment = match namespace {
            IdNamespace::AniList => "anilist",
            IdNamespace::MyAnimeList => "mal",
        };
        let media_segment = match media_type {
            MediaVariant::Anime => "anime",
            MediaVariant::Manga => "manga",
        };
        let url = format!("{BASE_URL}/api/mappings/{namespace_segment}/{media_segment}/{id}");

        let request = self.transport.client().get(&url).build().map_err(ApiError::Http)?;
        let response = self.transport.execute(ctx, request).await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            self.cache.put(self.name(), media_type, id, IdMapping::default());
            return Ok(None);
        }
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::status("hato", status, body).into());
        }

        let envelope: HatoEnvelope =
            response.json().await.map_err(|e| ApiError::Parse(e.to_string(), "hato"))?;
        let mapping = IdMapping { anilist_id: envelope.data.anilist_id, mal_id: envelope.data.mal_id };
        self.cache.put(self.name(), media_type, id, mapping.clone());
        Ok(if mapping.is_empty() { None } else { Some(mapping) })
    }

    fn name(&self) -> &'static str {
        "hato"
    }
}
