use crate::models::FuzzyDate;

/// Equality under the "source has no information must not overwrite target"
/// rule: a nil source date is equal to any target date, but a non-nil
/// source date is only equal to an identical target date.
pub fn source_equal_to_target(source: Option<FuzzyDate>, target: Option<FuzzyDate>) -> bool {
    match (source.filter(|d| !d.is_empty()), target.filter(|d| !d.is_empty())) {
        (None, _) => true,
        (Some(_), None) => false,
        (Some(a), Some(b)) => a == b,
    }
}

/// Whether a date field should be included in an outbound mutation. A null
/// date is always omitted so it never overwrites a manually set value on the
/// target service.
pub fn should_include_in_update(date: Option<FuzzyDate>) -> bool {
    date.is_some_and(|d| !d.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32) -> FuzzyDate {
        FuzzyDate { year: Some(y), month: None, day: None }
    }

    #[test]
    fn nil_source_is_equal_to_anything() {
        assert!(source_equal_to_target(None, None));
        assert!(source_equal_to_target(None, Some(date(2020))));
    }

    #[test]
    fn non_nil_source_requires_exact_match() {
        assert!(!source_equal_to_target(Some(date(2020)), None));
        assert!(!source_equal_to_target(Some(date(2020)), Some(date(2021))));
        assert!(source_equal_to_target(Some(date(2020)), Some(date(2020))));
    }

    #[test]
    fn null_date_never_included_in_update() {
        assert!(!should_include_in_update(None));
        assert!(should_include_in_update(Some(date(2020))));
    }
}
