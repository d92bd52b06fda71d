use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;

use crate::models::{MediaEntity, MediaVariant};
use crate::normalize::normalize;

/// Result of attempting to match a source title against the existing-targets
/// index.
#[derive(Debug, Clone)]
pub enum MatchResult<'a> {
    /// Exact normalized-title match.
    Matched(&'a MediaEntity),
    /// Fuzzy match with confidence score (0.0-1.0).
    Fuzzy(&'a MediaEntity, f64),
    NoMatch,
}

/// Minimum fuzzy confidence to consider a match valid.
const FUZZY_THRESHOLD: f64 = 0.6;

/// Attempts to match a source title against a list of same-variant target
/// candidates: exact normalized match first, then fuzzy, then give up.
pub fn match_title<'a>(query: &str, candidates: &'a [MediaEntity], variant: MediaVariant) -> MatchResult<'a> {
    if query.is_empty() || candidates.is_empty() {
        return MatchResult::NoMatch;
    }

    let normalized_query = normalize(query);
    let same_variant = candidates.iter().filter(|c| c.variant == variant);

    for entry in same_variant.clone() {
        if all_titles(entry).iter().any(|t| normalize(t) == normalized_query) {
            return MatchResult::Matched(entry);
        }
    }

    let matcher = SkimMatcherV2::default();
    let max_possible = matcher
        .fuzzy_match(&normalized_query, &normalized_query)
        .unwrap_or(1)
        .max(1);

    let mut best_score: i64 = 0;
    let mut best_entry: Option<&MediaEntity> = None;

    for entry in same_variant {
        let score = best_fuzzy_score(&matcher, &normalized_query, entry);
        if score > best_score {
            best_score = score;
            best_entry = Some(entry);
        }
    }

    if let Some(entry) = best_entry {
        let confidence = best_score as f64 / max_possible as f64;
        if confidence >= FUZZY_THRESHOLD {
            return MatchResult::Fuzzy(entry, confidence);
        }
    }

    MatchResult::NoMatch
}

fn best_fuzzy_score(matcher: &SkimMatcherV2, query: &str, entry: &MediaEntity) -> i64 {
    all_titles(entry)
        .iter()
        .filter_map(|t| matcher.fuzzy_match(&normalize(t), query))
        .max()
        .unwrap_or(0)
}

/// Collects the English, romaji, and native titles of an entry (skipping
/// empty fields) for matching purposes.
pub fn all_titles(entry: &MediaEntity) -> Vec<&str> {
    [&entry.title.english, &entry.title.romaji, &entry.title.native]
        .into_iter()
        .filter(|t| !t.is_empty())
        .map(String::as_str)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MediaTitle, Status};

    fn entry(id_anilist: u64, english: &str, romaji: &str, native: &str, variant: MediaVariant) -> MediaEntity {
        MediaEntity {
            variant,
            id_anilist,
            id_mal: 0,
            title: MediaTitle {
                english: english.to_string(),
                romaji: romaji.to_string(),
                native: native.to_string(),
            },
            status: Status::InProgress,
            progress: 0,
            progress_volumes: None,
            score: 0,
            started_at: None,
            finished_at: None,
            episodes: 0,
            chapters: 0,
            volumes: 0,
            is_favourite: false,
        }
    }

    fn frieren() -> MediaEntity {
        entry(1, "Frieren: Beyond Journey's End", "Sousou no Frieren", "葬送のフリーレン", MediaVariant::Anime)
    }

    fn aot() -> MediaEntity {
        entry(2, "Attack on Titan", "Shingeki no Kyojin", "", MediaVariant::Anime)
    }

    #[test]
    fn exact_match() {
        let candidates = vec![frieren(), aot()];
        match match_title("Sousou no Frieren", &candidates, MediaVariant::Anime) {
            MatchResult::Matched(e) => assert_eq!(e.id_anilist, 1),
            other => panic!("expected Matched, got {other:?}"),
        }
    }

    #[test]
    fn exact_match_ignores_case_and_colon() {
        let candidates = vec![frieren()];
        match match_title("frieren beyond journeys end", &candidates, MediaVariant::Anime) {
            MatchResult::Matched(e) => assert_eq!(e.id_anilist, 1),
            other => panic!("expected Matched, got {other:?}"),
        }
    }

    #[test]
    fn fuzzy_match_on_close_variant() {
        let candidates = vec![frieren(), aot()];
        match match_title("Frieren Beyond Journey End", &candidates, MediaVariant::Anime) {
            MatchResult::Fuzzy(e, _) | MatchResult::Matched(e) => assert_eq!(e.id_anilist, 1),
            other => panic!("expected Fuzzy or Matched, got {other:?}"),
        }
    }

    #[test]
    fn no_match_for_unrelated_title() {
        let candidates = vec![frieren()];
        assert!(matches!(
            match_title("Completely Different Series", &candidates, MediaVariant::Anime),
            MatchResult::NoMatch
        ));
    }

    #[test]
    fn cross_variant_candidates_are_ignored() {
        let manga_version = entry(3, "Frieren: Beyond Journey's End", "Sousou no Frieren", "", MediaVariant::Manga);
        let candidates = vec![manga_version];
        assert!(matches!(
            match_title("Sousou no Frieren", &candidates, MediaVariant::Anime),
            MatchResult::NoMatch
        ));
    }

    #[test]
    fn empty_inputs_never_match() {
        assert!(matches!(match_title("", &[frieren()], MediaVariant::Anime), MatchResult::NoMatch));
        assert!(matches!(match_title("test", &[], MediaVariant::Anime), MatchResult::NoMatch));
    }
}
