//! Title normalization for cross-service matching.
//!
//! The normalization is deliberately simple relative to what dedicated anime
//! database tools tend to use: lowercase, strip a small set of punctuation,
//! collapse every colon into a space (titles often carry a subtitle after
//! one), drop parenthesized groups, collapse whitespace. It is total
//! (defined for any input) and idempotent (`normalize(normalize(s)) ==
//! normalize(s)`) — a colon-replacement rule that stopped at the first `:`
//! left later colons for a second call to eat, so every occurrence is
//! replaced in one pass instead.

/// Normalize a title for exact or fuzzy matching.
pub fn normalize(s: &str) -> String {
    let s = strip_parenthesized(s);
    let s = replace_colons(&s);
    let s = s.to_lowercase();
    let s = strip_punctuation(&s);
    collapse_whitespace(&s)
}

/// Removes `!`, `?`, and `.` entirely.
fn strip_punctuation(s: &str) -> String {
    s.chars().filter(|c| !matches!(c, '!' | '?' | '.')).collect()
}

/// Replaces every `:` with a space. Titles often carry a subtitle after a
/// colon; replacing all of them (rather than only the first) keeps the
/// function a fixed point of itself, since a result with no colons left
/// can't be changed by a second pass.
fn replace_colons(s: &str) -> String {
    s.replace(':', " ")
}

/// Removes any `(...)` groups, including their contents. Unbalanced
/// parentheses are left untouched rather than risk eating the whole tail
/// of the string.
fn strip_parenthesized(s: &str) -> String {
    if !s.contains('(') || !s.contains(')') {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len());
    let mut depth = 0usize;
    for c in s.chars() {
        match c {
            '(' => depth += 1,
            ')' if depth > 0 => depth -= 1,
            _ if depth == 0 => out.push(c),
            _ => {}
        }
    }
    out
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_strips_selected_punctuation() {
        assert_eq!(normalize("Attack on Titan!?"), "attack on titan");
        assert_eq!(normalize("Steins;Gate 0."), "steins;gate 0");
    }

    #[test]
    fn every_colon_becomes_a_space() {
        assert_eq!(
            normalize("Fate/stay night: Unlimited Blade Works"),
            "fate/stay night unlimited blade works"
        );
        assert_eq!(normalize("A: B: C"), "a b c");
    }

    #[test]
    fn parenthesized_groups_are_removed() {
        assert_eq!(normalize("Spy x Family (TV)"), "spy x family");
        assert_eq!(normalize("Title (2023) (Uncut)"), "title");
    }

    #[test]
    fn unbalanced_parens_are_left_alone() {
        assert_eq!(normalize("A (B"), "a (b");
    }

    #[test]
    fn whitespace_collapses() {
        assert_eq!(normalize("  Too   Many   Spaces  "), "too many spaces");
    }

    #[test]
    fn normalization_is_idempotent() {
        let samples = [
            "Attack on Titan!?",
            "Fate/stay night: Unlimited Blade Works",
            "A: B: C",
            "Spy x Family (TV)",
            "",
            "   ",
            "(((nested)))",
        ];
        for s in samples {
            let once = normalize(s);
            let twice = normalize(&once);
            assert_eq!(once, twice, "not idempotent for {s:?}");
        }
    }

    #[test]
    fn total_for_empty_and_whitespace_only() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   "), "");
    }
}
