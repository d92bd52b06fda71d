use crate::models::{MediaVariant, Status};

/// Maps a unified [`Status`] to AniList's `MediaListStatus` enum value.
/// Returns `None` for `Status::Unknown` — unknown statuses are never written.
pub fn to_anilist_str(status: Status) -> Option<&'static str> {
    match status {
        Status::InProgress => Some("CURRENT"),
        Status::Completed => Some("COMPLETED"),
        Status::OnHold => Some("PAUSED"),
        Status::Dropped => Some("DROPPED"),
        Status::Planning => Some("PLANNING"),
        Status::Unknown => None,
    }
}

pub fn from_anilist_str(s: &str) -> Status {
    match s {
        "CURRENT" | "REPEATING" => Status::InProgress,
        "COMPLETED" => Status::Completed,
        "PAUSED" => Status::OnHold,
        "DROPPED" => Status::Dropped,
        "PLANNING" => Status::Planning,
        _ => Status::Unknown,
    }
}

/// Maps a unified [`Status`] to MyAnimeList's status value, which is spelled
/// differently for anime (`watching`) and manga (`reading`).
/// Returns `None` for `Status::Unknown` — unknown statuses are never written.
pub fn to_mal_str(status: Status, variant: MediaVariant) -> Option<&'static str> {
    match (status, variant) {
        (Status::InProgress, MediaVariant::Anime) => Some("watching"),
        (Status::InProgress, MediaVariant::Manga) => Some("reading"),
        (Status::Completed, _) => Some("completed"),
        (Status::OnHold, _) => Some("on_hold"),
        (Status::Dropped, _) => Some("dropped"),
        (Status::Planning, MediaVariant::Anime) => Some("plan_to_watch"),
        (Status::Planning, MediaVariant::Manga) => Some("plan_to_read"),
        (Status::Unknown, _) => None,
    }
}

pub fn from_mal_str(s: &str) -> Status {
    match s {
        "watching" | "reading" => Status::InProgress,
        "completed" => Status::Completed,
        "on_hold" => Status::OnHold,
        "dropped" => Status::Dropped,
        "plan_to_watch" | "plan_to_read" => Status::Planning,
        _ => Status::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_never_serializes() {
        assert_eq!(to_anilist_str(Status::Unknown), None);
        assert_eq!(to_mal_str(Status::Unknown, MediaVariant::Anime), None);
    }

    #[test]
    fn in_progress_wording_differs_by_variant() {
        assert_eq!(to_mal_str(Status::InProgress, MediaVariant::Anime), Some("watching"));
        assert_eq!(to_mal_str(Status::InProgress, MediaVariant::Manga), Some("reading"));
    }

    #[test]
    fn round_trips_through_anilist_vocabulary() {
        for status in [Status::InProgress, Status::Completed, Status::OnHold, Status::Dropped, Status::Planning] {
            let s = to_anilist_str(status).unwrap();
            assert_eq!(from_anilist_str(s), status);
        }
    }
}
