use serde::{Deserialize, Serialize};

/// Which list a [`MediaEntity`] belongs to. Anime and manga share almost every
/// field but differ in a few status labels and in which progress totals apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MediaVariant {
    Anime,
    Manga,
}

impl MediaVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Anime => "anime",
            Self::Manga => "manga",
        }
    }
}

impl std::fmt::Display for MediaVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user's list status, unified across the `watching`/`reading` wording split
/// between anime and manga. Display wording is variant-dependent; see
/// [`Status::label_for`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    InProgress,
    Completed,
    OnHold,
    Dropped,
    Planning,
    Unknown,
}

impl Status {
    /// Human-readable label, accounting for the anime/manga wording split
    /// (e.g. "Watching" vs "Reading", "Plan to Watch" vs "Plan to Read").
    pub fn label_for(&self, variant: MediaVariant) -> &'static str {
        match (self, variant) {
            (Self::InProgress, MediaVariant::Anime) => "Watching",
            (Self::InProgress, MediaVariant::Manga) => "Reading",
            (Self::Completed, _) => "Completed",
            (Self::OnHold, _) => "On Hold",
            (Self::Dropped, _) => "Dropped",
            (Self::Planning, MediaVariant::Anime) => "Plan to Watch",
            (Self::Planning, MediaVariant::Manga) => "Plan to Read",
            (Self::Unknown, _) => "Unknown",
        }
    }

    pub const ALL: &'static [Status] = &[
        Self::InProgress,
        Self::Completed,
        Self::OnHold,
        Self::Dropped,
        Self::Planning,
        Self::Unknown,
    ];
}

/// A calendar date that may have any combination of year/month/day missing,
/// as returned by both services. Time-of-day is never tracked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FuzzyDate {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub day: Option<u32>,
}

impl FuzzyDate {
    pub fn is_empty(&self) -> bool {
        self.year.is_none() && self.month.is_none() && self.day.is_none()
    }

    /// Treats an all-`None` date as equivalent to `None` itself so callers
    /// don't need to special-case the service that always sends the struct.
    pub fn as_option(self) -> Option<Self> {
        if self.is_empty() {
            None
        } else {
            Some(self)
        }
    }
}

/// Which service an entry, cache row, or outcome originated from or targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// AniList is the source of truth, MyAnimeList is the target.
    Forward,
    /// MyAnimeList is the source of truth, AniList is the target.
    Reverse,
}

impl Direction {
    pub fn reversed(self) -> Self {
        match self {
            Self::Forward => Self::Reverse,
            Self::Reverse => Self::Forward,
        }
    }
}

/// The three title variants a service may report. Any may be empty; display
/// code should fall back through `preferred()`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MediaTitle {
    pub english: String,
    pub native: String,
    pub romaji: String,
}

impl MediaTitle {
    /// Returns the best available display title, preferring English, then
    /// the romanization, then the native script.
    pub fn preferred(&self) -> &str {
        [&self.english, &self.romaji, &self.native]
            .into_iter()
            .find(|s| !s.is_empty())
            .map(String::as_str)
            .unwrap_or("Unknown title")
    }

    pub fn is_empty(&self) -> bool {
        self.english.is_empty() && self.native.is_empty() && self.romaji.is_empty()
    }
}

/// A single anime or manga record as seen on one service's list.
///
/// Records are immutable within a sync pass: service adapters and lookup
/// providers construct them, the engine only ever reads and compares.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaEntity {
    pub variant: MediaVariant,
    /// 0 means "unknown on AniList".
    pub id_anilist: u64,
    /// 0 means "unknown on MyAnimeList".
    pub id_mal: u64,
    pub title: MediaTitle,
    pub status: Status,
    pub progress: u32,
    /// Manga only; `None` on anime entries.
    pub progress_volumes: Option<u32>,
    /// Normalized 0-10, 0 = no score.
    pub score: u8,
    pub started_at: Option<FuzzyDate>,
    pub finished_at: Option<FuzzyDate>,
    /// Total episodes (anime). 0 = unknown/ongoing.
    pub episodes: u32,
    /// Total chapters (manga). 0 = unknown/ongoing.
    pub chapters: u32,
    /// Total volumes (manga). 0 = unknown/ongoing.
    pub volumes: u32,
    pub is_favourite: bool,
}

impl MediaEntity {
    /// The identifier this entry carries on the named service, or 0 if it
    /// doesn't have one there yet.
    pub fn id_on(&self, direction: Direction) -> u64 {
        match direction {
            Direction::Forward => self.id_mal,
            Direction::Reverse => self.id_anilist,
        }
    }

    /// The identifier of the service this entry was read from (the source of
    /// truth for `direction`).
    pub fn source_id(&self, direction: Direction) -> u64 {
        match direction {
            Direction::Forward => self.id_anilist,
            Direction::Reverse => self.id_mal,
        }
    }

    /// `finished_at` only matters once the entry is complete; see the
    /// equality/omission rule in the data model notes.
    pub fn finished_at_if_meaningful(&self) -> Option<FuzzyDate> {
        if self.status == Status::Completed {
            self.finished_at
        } else {
            None
        }
    }

    pub fn total_for_progress(&self) -> u32 {
        match self.variant {
            MediaVariant::Anime => self.episodes,
            MediaVariant::Manga => self.chapters,
        }
    }
}
