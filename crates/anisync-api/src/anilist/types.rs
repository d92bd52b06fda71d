use serde::Deserialize;

use anisync_core::models::{FuzzyDate as CoreFuzzyDate, MediaEntity, MediaTitle, MediaVariant, Status};
use anisync_core::translate::{from_anilist_str, ScoreFormat};

#[derive(Debug, Deserialize)]
pub struct GraphQLResponse<T> {
    pub data: T,
}

#[derive(Debug, Deserialize)]
pub struct ViewerResponse {
    #[serde(rename = "Viewer")]
    pub viewer: ViewerData,
}

#[derive(Debug, Deserialize)]
pub struct ViewerData {
    pub id: u64,
    #[serde(rename = "mediaListOptions")]
    pub media_list_options: Option<MediaListOptions>,
}

#[derive(Debug, Deserialize)]
pub struct MediaListOptions {
    #[serde(rename = "scoreFormat")]
    pub score_format: String,
}

#[derive(Debug, Deserialize)]
pub struct MediaListCollectionResponse {
    #[serde(rename = "MediaListCollection")]
    pub media_list_collection: MediaListCollection,
}

#[derive(Debug, Deserialize)]
pub struct MediaListCollection {
    pub lists: Vec<MediaListGroup>,
}

#[derive(Debug, Deserialize)]
pub struct MediaListGroup {
    pub entries: Vec<MediaListEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaListEntry {
    pub media_id: u64,
    pub progress: u32,
    pub progress_volumes: Option<u32>,
    pub score: f64,
    pub status: String,
    pub started_at: AniListFuzzyDate,
    pub completed_at: AniListFuzzyDate,
    pub media: AniListMedia,
}

#[derive(Debug, Deserialize, Default, Clone, Copy)]
pub struct AniListFuzzyDate {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub day: Option<u32>,
}

impl From<AniListFuzzyDate> for CoreFuzzyDate {
    fn from(d: AniListFuzzyDate) -> Self {
        CoreFuzzyDate { year: d.year, month: d.month, day: d.day }
    }
}

impl From<CoreFuzzyDate> for AniListFuzzyDate {
    fn from(d: CoreFuzzyDate) -> Self {
        AniListFuzzyDate { year: d.year, month: d.month, day: d.day }
    }
}

impl AniListFuzzyDate {
    /// `{year, month, day}` input object for mutation variables. AniList
    /// ignores an absent variable entirely, which is how null dates are
    /// omitted from writes.
    pub fn to_input_json(self) -> serde_json::Value {
        serde_json::json!({ "year": self.year, "month": self.month, "day": self.day })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AniListMedia {
    pub id: u64,
    pub title: AniListTitle,
    pub episodes: Option<u32>,
    pub chapters: Option<u32>,
    pub volumes: Option<u32>,
    pub id_mal: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct AniListTitle {
    pub romaji: Option<String>,
    pub english: Option<String>,
    pub native: Option<String>,
}

impl MediaListEntry {
    pub fn into_media_entity(self, variant: MediaVariant) -> MediaEntity {
        MediaEntity {
            variant,
            id_anilist: self.media.id,
            id_mal: self.media.id_mal.unwrap_or(0),
            title: MediaTitle {
                english: self.media.title.english.unwrap_or_default(),
                native: self.media.title.native.unwrap_or_default(),
                romaji: self.media.title.romaji.unwrap_or_default(),
            },
            status: from_anilist_str(&self.status),
            progress: self.progress,
            progress_volumes: if variant == MediaVariant::Manga { self.progress_volumes } else { None },
            score: 0, // normalized by the caller, which knows the viewer's ScoreFormat
            started_at: Some(self.started_at.into()).filter(|d: &CoreFuzzyDate| !d.is_empty()),
            finished_at: Some(self.completed_at.into()).filter(|d: &CoreFuzzyDate| !d.is_empty()),
            episodes: self.media.episodes.unwrap_or(0),
            chapters: self.media.chapters.unwrap_or(0),
            volumes: self.media.volumes.unwrap_or(0),
            is_favourite: false,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct MediaResponse {
    #[serde(rename = "Media")]
    pub media: AniListMedia,
}

#[derive(Debug, Deserialize)]
pub struct PageResponse {
    #[serde(rename = "Page")]
    pub page: Page,
}

#[derive(Debug, Deserialize)]
pub struct Page {
    pub media: Vec<AniListMedia>,
}

impl AniListMedia {
    pub fn into_media_entity(self, variant: MediaVariant) -> MediaEntity {
        MediaEntity {
            variant,
            id_anilist: self.id,
            id_mal: self.id_mal.unwrap_or(0),
            title: MediaTitle {
                english: self.title.english.unwrap_or_default(),
                native: self.title.native.unwrap_or_default(),
                romaji: self.title.romaji.unwrap_or_default(),
            },
            status: Status::Unknown,
            progress: 0,
            progress_volumes: None,
            score: 0,
            started_at: None,
            finished_at: None,
            episodes: self.episodes.unwrap_or(0),
            chapters: self.chapters.unwrap_or(0),
            volumes: self.volumes.unwrap_or(0),
            is_favourite: false,
        }
    }
}

pub fn parse_score_format(raw: &str) -> ScoreFormat {
    ScoreFormat::from_anilist_str(raw)
}
