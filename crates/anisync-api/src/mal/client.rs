use anisync_core::context::Context;
use anisync_core::error::Result;
use anisync_core::models::{MediaEntity, MediaVariant};
use anisync_core::retry::RetryTransport;
use anisync_core::service::{ServiceAdapter, UpdateFields};
use anisync_core::translate::{to_mal_str, ScoreFormat};

use super::types::{format_date, mal_score, MalListResponse, MalNode, MalSearchResponse};
use crate::error::ApiError;

const BASE_URL: &str = "https://api.myanimelist.net";

const ANIME_FIELDS: &str =
    "id,title,alternative_titles,num_episodes,main_picture,status,start_date,end_date";
const MANGA_FIELDS: &str = "id,title,alternative_titles,num_chapters,num_volumes,main_picture,status";

/// MyAnimeList API v2 adapter for one media variant. Unlike AniList, MAL
/// exposes separate endpoints for anime and manga (`/v2/anime/...` vs
/// `/v2/manga/...`), so `variant` picks the path segment rather than a query
/// argument.
pub struct MalClient {
    variant: MediaVariant,
    access_token: String,
    transport: RetryTransport,
}

impl MalClient {
    pub fn new(variant: MediaVariant, access_token: String) -> Self {
        Self { variant, access_token, transport: RetryTransport::new(reqwest::Client::new()) }
    }

    fn path_segment(&self) -> &'static str {
        match self.variant {
            MediaVariant::Anime => "anime",
            MediaVariant::Manga => "manga",
        }
    }

    fn list_path_segment(&self) -> &'static str {
        match self.variant {
            MediaVariant::Anime => "animelist",
            MediaVariant::Manga => "mangalist",
        }
    }

    fn fields(&self) -> &'static str {
        match self.variant {
            MediaVariant::Anime => ANIME_FIELDS,
            MediaVariant::Manga => MANGA_FIELDS,
        }
    }

    fn status_field(&self) -> &'static str {
        match self.variant {
            MediaVariant::Anime => "num_watched_episodes",
            MediaVariant::Manga => "num_chapters_read",
        }
    }

    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::status("myanimelist", status, body).into())
        }
    }

    async fn get(&self, ctx: &Context, url: &str) -> Result<reqwest::Response> {
        let request = self
            .transport
            .client()
            .get(url)
            .bearer_auth(&self.access_token)
            .build()
            .map_err(ApiError::Http)?;
        let response = self.transport.execute(ctx, request).await?;
        Self::check_response(response).await
    }
}

impl ServiceAdapter for MalClient {
    fn variant(&self) -> MediaVariant {
        self.variant
    }

    async fn get_user_list(&self, ctx: &Context) -> Result<Vec<MediaEntity>> {
        let mut items = Vec::new();
        let mut url = format!(
            "{BASE_URL}/v2/users/@me/{}?fields=list_status,{}&limit=100&nsfw=true",
            self.list_path_segment(),
            self.fields()
        );

        loop {
            let response = self.get(ctx, &url).await?;
            let page: MalListResponse =
                response.json().await.map_err(|e| ApiError::Parse(e.to_string(), "myanimelist"))?;
            items.extend(page.data);

            match page.paging.next {
                Some(next) => url = next,
                None => break,
            }
        }

        Ok(items.into_iter().map(|item| item.into_media_entity(self.variant)).collect())
    }

    async fn get_by_id(&self, ctx: &Context, id: u64) -> Result<Option<MediaEntity>> {
        let url = format!("{BASE_URL}/v2/{}/{id}?fields={}", self.path_segment(), self.fields());
        let response = self.get(ctx, &url).await?;
        let node: MalNode = response.json().await.map_err(|e| ApiError::Parse(e.to_string(), "myanimelist"))?;
        Ok(Some(node.into_media_entity(self.variant)))
    }

    async fn get_by_name(&self, ctx: &Context, name: &str) -> Result<Vec<MediaEntity>> {
        let url = format!("{BASE_URL}/v2/{}", self.path_segment());
        let request = self
            .transport
            .client()
            .get(&url)
            .bearer_auth(&self.access_token)
            .query(&[("q", name), ("limit", "10"), ("fields", self.fields())])
            .build()
            .map_err(ApiError::Http)?;
        let response = self.transport.execute(ctx, request).await?;
        let response = Self::check_response(response).await?;
        let search: MalSearchResponse =
            response.json().await.map_err(|e| ApiError::Parse(e.to_string(), "myanimelist"))?;
        Ok(search.data.into_iter().map(|item| item.node.into_media_entity(self.variant)).collect())
    }

    async fn get_by_mal_id(&self, _ctx: &Context, _mal_id: u64) -> Result<Option<MediaEntity>> {
        // AniList-only; MAL has no cross-namespace lookup of its own.
        Ok(None)
    }

    async fn update(&self, ctx: &Context, id: u64, fields: UpdateFields) -> Result<()> {
        let url = format!("{BASE_URL}/v2/{}/{id}/my_list_status", self.path_segment());

        let mut params: Vec<(&str, String)> = Vec::new();
        if let Some(progress) = fields.progress {
            params.push((self.status_field(), progress.to_string()));
        }
        if let Some(volumes) = fields.progress_volumes {
            params.push(("num_volumes_read", volumes.to_string()));
        }
        if let Some(status) = fields.status {
            if let Some(s) = to_mal_str(status, self.variant) {
                params.push(("status", s.to_string()));
            }
        }
        if let Some(score) = fields.score {
            params.push(("score", mal_score(score).to_string()));
        }
        if let Some(date) = fields.started_at.and_then(format_date) {
            params.push(("start_date", date));
        }
        if let Some(date) = fields.finished_at.and_then(format_date) {
            params.push(("finish_date", date));
        }

        let request = self
            .transport
            .client()
            .patch(&url)
            .bearer_auth(&self.access_token)
            .form(&params)
            .build()
            .map_err(ApiError::Http)?;
        let response = self.transport.execute(ctx, request).await?;
        Self::check_response(response).await?;
        Ok(())
    }

    async fn get_user_score_format(&self, _ctx: &Context) -> Result<ScoreFormat> {
        // MAL has no alternate scoring formats; 0-10 is the only scale.
        Ok(ScoreFormat::default())
    }
}
