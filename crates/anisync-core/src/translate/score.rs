use crate::error::{Result, SyncError};

/// AniList's per-user scoring format. Read once at startup from the viewer
/// query and held for the duration of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScoreFormat {
    Point100,
    Point10Decimal,
    #[default]
    Point10,
    Point5,
    Point3,
}

impl ScoreFormat {
    pub fn from_anilist_str(s: &str) -> Self {
        match s {
            "POINT_100" => Self::Point100,
            "POINT_10_DECIMAL" => Self::Point10Decimal,
            "POINT_10" => Self::Point10,
            "POINT_5" => Self::Point5,
            "POINT_3" => Self::Point3,
            _ => Self::Point10,
        }
    }

    fn max_raw(self) -> f64 {
        match self {
            Self::Point100 => 100.0,
            Self::Point10Decimal | Self::Point10 => 10.0,
            Self::Point5 => 5.0,
            Self::Point3 => 3.0,
        }
    }
}

/// Converts a raw AniList score (in the viewer's [`ScoreFormat`]) to the
/// engine's normalized 0-10 integer scale. A raw value of 0 always maps to 0
/// ("no score"), regardless of format.
pub fn normalize_from_anilist(raw: f64, format: ScoreFormat) -> Result<u8> {
    if raw == 0.0 {
        return Ok(0);
    }
    let normalized = match format {
        ScoreFormat::Point100 => raw / 10.0,
        ScoreFormat::Point10Decimal | ScoreFormat::Point10 => raw,
        ScoreFormat::Point5 => raw * 2.0,
        // No exact integer scale from 3 to 10; round to the nearest tenth-step.
        ScoreFormat::Point3 => raw * (10.0 / 3.0),
    };
    let rounded = normalized.round();
    if !(0.0..=10.0).contains(&rounded) {
        return Err(SyncError::ScoreOutOfRange(rounded as i32));
    }
    Ok(rounded as u8)
}

/// Converts a normalized 0-10 score back to the viewer's [`ScoreFormat`] for
/// writing to AniList. A normalized score of 0 always denormalizes to 0
/// ("no score"), never to a non-zero value in the target format.
pub fn denormalize_to_anilist(score: u8, format: ScoreFormat) -> f64 {
    if score == 0 {
        return 0.0;
    }
    let raw = match format {
        ScoreFormat::Point100 => f64::from(score) * 10.0,
        ScoreFormat::Point10Decimal | ScoreFormat::Point10 => f64::from(score),
        ScoreFormat::Point5 => f64::from(score) / 2.0,
        ScoreFormat::Point3 => (f64::from(score) / (10.0 / 3.0)).round(),
    };
    raw.min(format.max_raw())
}

/// Converts a normalized 0-10 score to MyAnimeList's native 0-10 integer
/// scale. MAL has no alternate formats, so this is an identity clamp.
pub fn denormalize_to_mal(score: u8) -> u8 {
    score.min(10)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_always_no_score() {
        assert_eq!(normalize_from_anilist(0.0, ScoreFormat::Point100).unwrap(), 0);
        assert_eq!(denormalize_to_anilist(0, ScoreFormat::Point5), 0.0);
    }

    #[test]
    fn point_100_divides_by_ten() {
        assert_eq!(normalize_from_anilist(85.0, ScoreFormat::Point100).unwrap(), 9);
        assert_eq!(normalize_from_anilist(100.0, ScoreFormat::Point100).unwrap(), 10);
    }

    #[test]
    fn point_5_doubles() {
        assert_eq!(normalize_from_anilist(3.0, ScoreFormat::Point5).unwrap(), 6);
    }

    #[test]
    fn point_3_rounds_to_nearest_tenth_step() {
        // 1 -> 3.33 -> 3, 2 -> 6.67 -> 7, 3 -> 10.0 -> 10
        assert_eq!(normalize_from_anilist(1.0, ScoreFormat::Point3).unwrap(), 3);
        assert_eq!(normalize_from_anilist(2.0, ScoreFormat::Point3).unwrap(), 7);
        assert_eq!(normalize_from_anilist(3.0, ScoreFormat::Point3).unwrap(), 10);
    }

    #[test]
    fn denormalize_never_exceeds_format_max() {
        assert_eq!(denormalize_to_anilist(10, ScoreFormat::Point5), 5.0);
        assert_eq!(denormalize_to_anilist(10, ScoreFormat::Point3), 3.0);
    }

    #[test]
    fn mal_clamps_to_ten() {
        assert_eq!(denormalize_to_mal(10), 10);
    }
}
