use serde::Deserialize;

use anisync_core::models::{FuzzyDate, MediaEntity, MediaTitle, MediaVariant};
use anisync_core::translate::{denormalize_to_mal, from_mal_str};

#[derive(Debug, Deserialize)]
pub struct MalListResponse {
    pub data: Vec<MalListItem>,
    pub paging: MalPaging,
}

#[derive(Debug, Deserialize)]
pub struct MalPaging {
    pub next: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MalListItem {
    pub node: MalNode,
    pub list_status: MalListStatus,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct MalListStatus {
    pub status: String,
    #[serde(default)]
    pub num_episodes_watched: u32,
    #[serde(default)]
    pub num_chapters_read: u32,
    #[serde(default)]
    pub num_volumes_read: u32,
    #[serde(default)]
    pub score: u8,
    pub start_date: Option<String>,
    pub finish_date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MalNode {
    pub id: u64,
    pub title: String,
    pub alternative_titles: Option<MalAlternativeTitles>,
    pub num_episodes: Option<u32>,
    pub num_chapters: Option<u32>,
    pub num_volumes: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct MalAlternativeTitles {
    pub en: Option<String>,
    pub ja: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MalSearchResponse {
    pub data: Vec<MalListItem>,
}

fn parse_date(s: &Option<String>) -> Option<FuzzyDate> {
    let s = s.as_ref()?;
    let parts: Vec<&str> = s.split('-').collect();
    match parts.as_slice() {
        [y, m, d] => Some(FuzzyDate {
            year: y.parse().ok(),
            month: m.parse().ok(),
            day: d.parse().ok(),
        }),
        [y] => Some(FuzzyDate { year: y.parse().ok(), month: None, day: None }),
        _ => None,
    }
}

/// Formats a [`FuzzyDate`] as MAL's `YYYY-MM-DD` (or partial) date string.
pub fn format_date(date: FuzzyDate) -> Option<String> {
    match (date.year, date.month, date.day) {
        (Some(y), Some(m), Some(d)) => Some(format!("{y:04}-{m:02}-{d:02}")),
        (Some(y), Some(m), None) => Some(format!("{y:04}-{m:02}")),
        (Some(y), None, None) => Some(format!("{y:04}")),
        _ => None,
    }
}

impl MalListItem {
    pub fn into_media_entity(self, variant: MediaVariant) -> MediaEntity {
        let progress = match variant {
            MediaVariant::Anime => self.list_status.num_episodes_watched,
            MediaVariant::Manga => self.list_status.num_chapters_read,
        };
        MediaEntity {
            variant,
            id_anilist: 0,
            id_mal: self.node.id,
            title: MediaTitle {
                english: self.node.alternative_titles.as_ref().and_then(|t| t.en.clone()).unwrap_or_default(),
                native: self.node.alternative_titles.as_ref().and_then(|t| t.ja.clone()).unwrap_or_default(),
                romaji: self.node.title,
            },
            status: from_mal_str(&self.list_status.status),
            progress,
            progress_volumes: if variant == MediaVariant::Manga {
                Some(self.list_status.num_volumes_read)
            } else {
                None
            },
            score: self.list_status.score.min(10),
            started_at: parse_date(&self.list_status.start_date),
            finished_at: parse_date(&self.list_status.finish_date),
            episodes: self.node.num_episodes.unwrap_or(0),
            chapters: self.node.num_chapters.unwrap_or(0),
            volumes: self.node.num_volumes.unwrap_or(0),
            is_favourite: false,
        }
    }
}

impl MalNode {
    pub fn into_media_entity(self, variant: MediaVariant) -> MediaEntity {
        MediaEntity {
            variant,
            id_anilist: 0,
            id_mal: self.id,
            title: MediaTitle {
                english: self.alternative_titles.as_ref().and_then(|t| t.en.clone()).unwrap_or_default(),
                native: self.alternative_titles.as_ref().and_then(|t| t.ja.clone()).unwrap_or_default(),
                romaji: self.title,
            },
            status: anisync_core::models::Status::Unknown,
            progress: 0,
            progress_volumes: None,
            score: 0,
            started_at: None,
            finished_at: None,
            episodes: self.num_episodes.unwrap_or(0),
            chapters: self.num_chapters.unwrap_or(0),
            volumes: self.num_volumes.unwrap_or(0),
            is_favourite: false,
        }
    }
}

pub fn mal_score(score: u8) -> u8 {
    denormalize_to_mal(score)
}
