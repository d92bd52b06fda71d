use anisync_core::context::Context;
use anisync_core::error::Result;
use anisync_core::providers::TitleEnrichmentProvider;
use anisync_core::retry::RetryTransport;
use async_trait::async_trait;
use serde::Deserialize;

use crate::error::ApiError;

const BASE_URL: &str = "https://api.jikan.moe/v4";

#[derive(Debug, Deserialize)]
struct JikanSearchResponse {
    data: Vec<JikanManga>,
}

#[derive(Debug, Deserialize)]
struct JikanManga {
    titles: Vec<JikanTitle>,
}

#[derive(Debug, Deserialize)]
struct JikanTitle {
    title: String,
}

/// Widens the manga title-matching candidate pool with synonyms from a
/// MAL-data mirror search, used only as a pre-pass before the title
/// strategy — never to resolve an ID directly.
pub struct JikanProvider {
    transport: RetryTransport,
}

impl JikanProvider {
    pub fn new() -> Self {
        Self { transport: RetryTransport::new(reqwest::Client::new()) }
    }
}

impl Default for JikanProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TitleEnrichmentProvider for JikanProvider {
    async fn enrich_titles(&self, ctx: &Context, title: &str) -> Result<Vec<String>> {
        let url = format!("{BASE_URL}/manga");
        let request = self
            .transport
            .client()
            .get(&url)
            .query(&[("q", title), ("limit", "5")])
            .build()
            .map_err(ApiError::Http)?;
        let response = self.transport.execute(ctx, request).await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::status("jikan", status, body).into());
        }

        let parsed: JikanSearchResponse =
            response.json().await.map_err(|e| ApiError::Parse(e.to_string(), "jikan"))?;
        Ok(parsed.data.into_iter().flat_map(|m| m.titles).map(|t| t.title).collect())
    }

    fn name(&self) -> &'static str {
        "jikan"
    }
}
