use crate::models::MediaEntity;

/// A "special" is 0 or 1 episodes; matching it against a genuine multi-episode
/// series almost always indicates spin-off confusion rather than a real hit.
const SPECIAL_MAX_EPISODES: u32 = 1;
const SERIES_MIN_EPISODES: u32 = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectionReason {
    MalIdMismatch { source_mal_id: u64, target_mal_id: u64 },
    SpecialVsSeries { source_episodes: u32, target_episodes: u32 },
}

impl RejectionReason {
    pub fn reason_str(&self) -> &'static str {
        match self {
            Self::MalIdMismatch { .. } => "MAL ID mismatch",
            Self::SpecialVsSeries { .. } => "episode count mismatch (special vs series)",
        }
    }

    pub fn detail(&self) -> String {
        match self {
            Self::MalIdMismatch { source_mal_id, target_mal_id } => {
                format!("{source_mal_id} vs {target_mal_id}")
            }
            Self::SpecialVsSeries { source_episodes, target_episodes } => {
                format!("({source_episodes} vs {target_episodes})")
            }
        }
    }
}

/// Applies the match-rejection guards to a title-match candidate.
/// Returns `Some(reason)` if the match should be rejected.
pub fn reject_match(source: &MediaEntity, target: &MediaEntity) -> Option<RejectionReason> {
    if source.id_mal != 0 && target.id_mal != 0 && source.id_mal != target.id_mal {
        return Some(RejectionReason::MalIdMismatch {
            source_mal_id: source.id_mal,
            target_mal_id: target.id_mal,
        });
    }
    // Agreeing non-zero MAL IDs settle identity outright; the special-vs-series
    // guard below exists only to catch spin-off confusion in the absence of
    // that signal, per the data-model invariant that matching MAL IDs denote
    // the same work.
    if source.id_mal != 0 && source.id_mal == target.id_mal {
        return None;
    }

    let source_is_special = source.episodes <= SPECIAL_MAX_EPISODES;
    let target_is_series = target.episodes > SERIES_MIN_EPISODES - 1;
    let titles_identical = source.title.preferred() == target.title.preferred();
    if source_is_special && target_is_series && !titles_identical {
        return Some(RejectionReason::SpecialVsSeries {
            source_episodes: source.episodes,
            target_episodes: target.episodes,
        });
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MediaTitle, MediaVariant, Status};

    fn entry(id_mal: u64, title: &str, episodes: u32) -> MediaEntity {
        MediaEntity {
            variant: MediaVariant::Anime,
            id_anilist: 0,
            id_mal,
            title: MediaTitle { english: title.to_string(), native: String::new(), romaji: String::new() },
            status: Status::InProgress,
            progress: 0,
            progress_volumes: None,
            score: 0,
            started_at: None,
            finished_at: None,
            episodes,
            chapters: 0,
            volumes: 0,
            is_favourite: false,
        }
    }

    #[test]
    fn mal_id_mismatch_is_rejected() {
        let source = entry(111, "Title A", 12);
        let target = entry(222, "Title A", 12);
        assert_eq!(
            reject_match(&source, &target),
            Some(RejectionReason::MalIdMismatch { source_mal_id: 111, target_mal_id: 222 })
        );
    }

    #[test]
    fn special_vs_series_is_rejected_unless_titles_identical() {
        let source = entry(0, "X なぁ、未来。", 0);
        let target = entry(55102, "X", 13);
        assert_eq!(
            reject_match(&source, &target),
            Some(RejectionReason::SpecialVsSeries { source_episodes: 0, target_episodes: 13 })
        );

        let identical = entry(55102, "X なぁ、未来。", 13);
        assert_eq!(reject_match(&source, &identical), None);
    }

    #[test]
    fn agreeing_mal_ids_are_accepted() {
        let source = entry(38680, "Fruits Basket 1st Season", 0);
        let target = entry(38680, "Fruits Basket (2019)", 25);
        assert_eq!(reject_match(&source, &target), None);
    }
}
