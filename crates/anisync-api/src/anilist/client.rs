use std::sync::Arc;

use anisync_core::context::Context;
use anisync_core::error::{Result, SyncError};
use anisync_core::models::{MediaEntity, MediaVariant};
use anisync_core::retry::RetryTransport;
use anisync_core::service::{ServiceAdapter, UpdateFields};
use anisync_core::translate::{denormalize_to_anilist, normalize_from_anilist, to_anilist_str, ScoreFormat};
use tokio::sync::RwLock;

use super::types::{
    parse_score_format, AniListFuzzyDate, AniListMedia, GraphQLResponse, MediaListCollectionResponse,
    MediaListEntry, MediaResponse, PageResponse, ViewerResponse,
};
use crate::error::ApiError;

const API_URL: &str = "https://graphql.anilist.co";

const VIEWER_QUERY: &str = r#"
query {
    Viewer {
        id
        mediaListOptions { scoreFormat }
    }
}
"#;

const MEDIA_FIELDS: &str = r#"
    id
    idMal
    title { romaji english native }
    episodes
    chapters
    volumes
"#;

const USER_LIST_QUERY: &str = r#"
query ($userId: Int, $type: MediaType) {
    MediaListCollection(userId: $userId, type: $type) {
        lists {
            entries {
                mediaId
                progress
                progressVolumes
                score(format: POINT_100)
                status
                startedAt { year month day }
                completedAt { year month day }
                media { %MEDIA_FIELDS% }
            }
        }
    }
}
"#;

const SEARCH_QUERY: &str = r#"
query ($search: String, $type: MediaType) {
    Page(perPage: 10) {
        media(search: $search, type: $type) { %MEDIA_FIELDS% }
    }
}
"#;

const GET_MEDIA_QUERY: &str = r#"
query ($id: Int, $type: MediaType) {
    Media(id: $id, type: $type) { %MEDIA_FIELDS% }
}
"#;

const GET_MEDIA_BY_MAL_ID_QUERY: &str = r#"
query ($idMal: Int, $type: MediaType) {
    Media(idMal: $idMal, type: $type) { %MEDIA_FIELDS% }
}
"#;

const UPDATE_MUTATION: &str = r#"
mutation ($mediaId: Int, $progress: Int, $progressVolumes: Int, $status: MediaListStatus,
          $score: Float, $startedAt: FuzzyDateInput, $completedAt: FuzzyDateInput) {
    SaveMediaListEntry(mediaId: $mediaId, progress: $progress, progressVolumes: $progressVolumes,
                       status: $status, scoreRaw: null, score: $score,
                       startedAt: $startedAt, completedAt: $completedAt) {
        id
    }
}
"#;

const TOGGLE_FAVOURITE_MUTATION: &str = r#"
mutation ($animeId: Int, $mangaId: Int) {
    ToggleFavourite(animeId: $animeId, mangaId: $mangaId) {
        anime { nodes { id } }
    }
}
"#;

fn media_query(template: &str) -> String {
    template.replace("%MEDIA_FIELDS%", MEDIA_FIELDS)
}

/// AniList GraphQL adapter for one media variant. AniList serves both anime
/// and manga behind the same `Media`/`MediaList` shape distinguished by a
/// `type` argument, so one client handles both depending on `variant`.
pub struct AniListClient {
    variant: MediaVariant,
    access_token: String,
    transport: RetryTransport,
    score_format: RwLock<Option<ScoreFormat>>,
}

impl AniListClient {
    pub fn new(variant: MediaVariant, access_token: String) -> Self {
        Self {
            variant,
            access_token,
            transport: RetryTransport::new(reqwest::Client::new()),
            score_format: RwLock::new(None),
        }
    }

    fn type_str(&self) -> &'static str {
        match self.variant {
            MediaVariant::Anime => "ANIME",
            MediaVariant::Manga => "MANGA",
        }
    }

    async fn graphql_request<T: serde::de::DeserializeOwned>(
        &self,
        ctx: &Context,
        operation: &str,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<T> {
        tracing::debug!(operation, "AniList GraphQL request");

        let request = self
            .transport
            .client()
            .post(API_URL)
            .bearer_auth(&self.access_token)
            .json(&serde_json::json!({ "query": query, "variables": variables }))
            .build()
            .map_err(ApiError::Http)?;

        let response = self.transport.execute(ctx, request).await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::status("anilist", status.as_u16(), body).into());
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Parse(e.to_string(), "anilist").into())
    }

    async fn viewer_id_and_format(&self, ctx: &Context) -> Result<(u64, ScoreFormat)> {
        let resp: GraphQLResponse<ViewerResponse> =
            self.graphql_request(ctx, "Viewer", VIEWER_QUERY, serde_json::json!({})).await?;
        let format = resp
            .data
            .viewer
            .media_list_options
            .map(|o| parse_score_format(&o.score_format))
            .unwrap_or_default();
        Ok((resp.data.viewer.id, format))
    }
}

impl ServiceAdapter for AniListClient {
    fn variant(&self) -> MediaVariant {
        self.variant
    }

    async fn get_user_list(&self, ctx: &Context) -> Result<Vec<MediaEntity>> {
        let (user_id, format) = self.viewer_id_and_format(ctx).await?;
        *self.score_format.write().await = Some(format);

        let resp: GraphQLResponse<MediaListCollectionResponse> = self
            .graphql_request(
                ctx,
                "UserList",
                &media_query(USER_LIST_QUERY),
                serde_json::json!({ "userId": user_id, "type": self.type_str() }),
            )
            .await?;

        resp.data
            .media_list_collection
            .lists
            .into_iter()
            .flat_map(|group| group.entries)
            .map(|raw| normalize_entry(raw, self.variant, format))
            .collect()
    }

    async fn get_by_id(&self, ctx: &Context, id: u64) -> Result<Option<MediaEntity>> {
        let resp: GraphQLResponse<MediaResponse> = self
            .graphql_request(
                ctx,
                "GetMedia",
                &media_query(GET_MEDIA_QUERY),
                serde_json::json!({ "id": id, "type": self.type_str() }),
            )
            .await?;
        Ok(Some(resp.data.media.into_media_entity(self.variant)))
    }

    async fn get_by_name(&self, ctx: &Context, name: &str) -> Result<Vec<MediaEntity>> {
        let resp: GraphQLResponse<PageResponse> = self
            .graphql_request(
                ctx,
                "Search",
                &media_query(SEARCH_QUERY),
                serde_json::json!({ "search": name, "type": self.type_str() }),
            )
            .await?;
        Ok(resp.data.page.media.into_iter().map(|m| m.into_media_entity(self.variant)).collect())
    }

    async fn get_by_mal_id(&self, ctx: &Context, mal_id: u64) -> Result<Option<MediaEntity>> {
        let resp: std::result::Result<GraphQLResponse<MediaResponse>, SyncError> = self
            .graphql_request(
                ctx,
                "GetMediaByMalId",
                &media_query(GET_MEDIA_BY_MAL_ID_QUERY),
                serde_json::json!({ "idMal": mal_id, "type": self.type_str() }),
            )
            .await;
        match resp {
            Ok(resp) => Ok(Some(resp.data.media.into_media_entity(self.variant))),
            Err(SyncError::Api(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn update(&self, ctx: &Context, id: u64, fields: UpdateFields) -> Result<()> {
        let format = match *self.score_format.read().await {
            Some(f) => f,
            None => {
                let (_, f) = self.viewer_id_and_format(ctx).await?;
                *self.score_format.write().await = Some(f);
                f
            }
        };

        let mut vars = serde_json::json!({ "mediaId": id });
        if let Some(progress) = fields.progress {
            vars["progress"] = serde_json::json!(progress);
        }
        if let Some(volumes) = fields.progress_volumes {
            vars["progressVolumes"] = serde_json::json!(volumes);
        }
        if let Some(status) = fields.status {
            if let Some(s) = to_anilist_str(status) {
                vars["status"] = serde_json::json!(s);
            }
        }
        if let Some(score) = fields.score {
            vars["score"] = serde_json::json!(denormalize_to_anilist(score, format));
        }
        if let Some(date) = fields.started_at {
            vars["startedAt"] = AniListFuzzyDate::from(date).to_input_json();
        }
        if let Some(date) = fields.finished_at {
            vars["completedAt"] = AniListFuzzyDate::from(date).to_input_json();
        }

        let _: serde_json::Value =
            self.graphql_request(ctx, "UpdateLibraryEntry", UPDATE_MUTATION, vars).await?;
        Ok(())
    }

    async fn get_user_score_format(&self, ctx: &Context) -> Result<ScoreFormat> {
        if let Some(format) = *self.score_format.read().await {
            return Ok(format);
        }
        let (_, format) = self.viewer_id_and_format(ctx).await?;
        *self.score_format.write().await = Some(format);
        Ok(format)
    }

    async fn toggle_favourite(&self, ctx: &Context, id: u64) -> Result<()> {
        let vars = match self.variant {
            MediaVariant::Anime => serde_json::json!({ "animeId": id, "mangaId": null }),
            MediaVariant::Manga => serde_json::json!({ "animeId": null, "mangaId": id }),
        };
        let _: serde_json::Value =
            self.graphql_request(ctx, "ToggleFavourite", TOGGLE_FAVOURITE_MUTATION, vars).await?;
        Ok(())
    }
}

/// The list query always requests `score(format: POINT_100)` regardless of
/// the viewer's configured format (only needed for writes), so reads always
/// normalize from `Point100`.
fn normalize_entry(raw: MediaListEntry, variant: MediaVariant, _format: ScoreFormat) -> Result<MediaEntity> {
    let raw_score = raw.score;
    let mut entry = raw.into_media_entity(variant);
    entry.score = normalize_from_anilist(raw_score, ScoreFormat::Point100)?;
    Ok(entry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_query_interpolates_shared_fields() {
        let q = media_query(GET_MEDIA_QUERY);
        assert!(q.contains("idMal"));
        assert!(!q.contains("%MEDIA_FIELDS%"));
    }
}
