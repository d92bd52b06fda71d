use crate::models::{MediaEntity, MediaVariant, Status};
use crate::translate::source_equal_to_target;

/// Fields that can differ between a source entry and its resolved target,
/// used both for the equality check and to build the human-readable diff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Status,
    Score,
    Progress,
    ProgressVolumes,
    StartedAt,
    FinishedAt,
}

/// True if `source/source_total == target/target_total` under integer
/// division, absorbing episode-count drift between catalogs. Two
/// entries with unknown totals (0) never qualify — there's nothing to
/// divide by.
fn relative_progress_equal(source: u32, source_total: u32, target: u32, target_total: u32) -> bool {
    source_total != 0 && target_total != 0 && source / source_total == target / target_total
}

fn dates_equal(source: &MediaEntity, target: &MediaEntity) -> bool {
    if source.status != Status::Completed {
        return true;
    }
    source_equal_to_target(source.started_at, target.started_at)
        && source_equal_to_target(source.finished_at_if_meaningful(), target.finished_at_if_meaningful())
}

/// Lists the fields that differ between `source` and `target`, per the
/// variant-specific equality rule. An empty result means "no changes".
pub fn diff_fields(source: &MediaEntity, target: &MediaEntity) -> Vec<Field> {
    let mut fields = Vec::new();

    if source.status != target.status {
        fields.push(Field::Status);
    }
    if source.score != target.score {
        fields.push(Field::Score);
    }

    let progress_equal = source.progress == target.progress
        || relative_progress_equal(source.progress, source.total_for_progress(), target.progress, target.total_for_progress());
    if !progress_equal {
        fields.push(Field::Progress);
    }

    if source.variant == MediaVariant::Manga && source.progress_volumes != target.progress_volumes {
        fields.push(Field::ProgressVolumes);
    }

    if source.status == Status::Completed {
        if !source_equal_to_target(source.started_at, target.started_at) {
            fields.push(Field::StartedAt);
        }
        if !source_equal_to_target(source.finished_at_if_meaningful(), target.finished_at_if_meaningful()) {
            fields.push(Field::FinishedAt);
        }
    }

    fields
}

/// Whether `source` and `target` are equivalent for sync purposes — no
/// update is needed. Mirrors `diff_fields` being empty, but written
/// separately since the engine's hot path only needs the boolean.
pub fn same_progress_with_target(source: &MediaEntity, target: &MediaEntity) -> bool {
    diff_fields(source, target).is_empty() && dates_equal(source, target)
}

/// Renders a diff listing only the differing fields, for logs and dry-run
/// output.
pub fn render_diff(source: &MediaEntity, target: &MediaEntity, fields: &[Field]) -> String {
    fields
        .iter()
        .map(|field| match field {
            Field::Status => format!("status: {:?} -> {:?}", target.status, source.status),
            Field::Score => format!("score: {} -> {}", target.score, source.score),
            Field::Progress => format!("progress: {} -> {}", target.progress, source.progress),
            Field::ProgressVolumes => format!(
                "progress_volumes: {:?} -> {:?}",
                target.progress_volumes, source.progress_volumes
            ),
            Field::StartedAt => format!("started_at: {:?} -> {:?}", target.started_at, source.started_at),
            Field::FinishedAt => {
                format!("finished_at: {:?} -> {:?}", target.finished_at, source.finished_at)
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FuzzyDate, MediaTitle};

    fn base(status: Status, progress: u32, episodes: u32, score: u8) -> MediaEntity {
        MediaEntity {
            variant: MediaVariant::Anime,
            id_anilist: 1,
            id_mal: 1,
            title: MediaTitle::default(),
            status,
            progress,
            progress_volumes: None,
            score,
            started_at: None,
            finished_at: None,
            episodes,
            chapters: 0,
            volumes: 0,
            is_favourite: false,
        }
    }

    #[test]
    fn identical_entries_have_no_diff() {
        let a = base(Status::InProgress, 5, 12, 8);
        let b = a.clone();
        assert!(same_progress_with_target(&a, &b));
    }

    #[test]
    fn relative_progress_absorbs_episode_count_drift() {
        let source = base(Status::InProgress, 11, 12, 0);
        let target = base(Status::InProgress, 22, 24, 0);
        assert!(same_progress_with_target(&source, &target));
    }

    #[test]
    fn non_completed_ignores_finished_at_difference() {
        let mut source = base(Status::InProgress, 5, 12, 0);
        source.started_at = Some(FuzzyDate { year: Some(2023), month: Some(6), day: Some(1) });
        source.finished_at = Some(FuzzyDate { year: Some(2023), month: Some(6), day: Some(15) });
        let mut target = source.clone();
        target.finished_at = Some(FuzzyDate { year: Some(2023), month: Some(7), day: Some(15) });
        assert!(same_progress_with_target(&source, &target));
    }

    #[test]
    fn completed_requires_both_dates_to_match() {
        let mut source = base(Status::Completed, 12, 12, 0);
        source.started_at = Some(FuzzyDate { year: Some(2023), month: Some(6), day: Some(1) });
        source.finished_at = Some(FuzzyDate { year: Some(2023), month: Some(6), day: Some(15) });
        let mut target = source.clone();
        target.finished_at = None;
        assert!(!same_progress_with_target(&source, &target));
        let fields = diff_fields(&source, &target);
        assert!(fields.contains(&Field::FinishedAt));
    }

    #[test]
    fn nil_source_date_does_not_force_an_update() {
        let source = base(Status::Completed, 12, 12, 0);
        let mut target = source.clone();
        target.started_at = Some(FuzzyDate { year: Some(2023), month: Some(1), day: Some(1) });
        assert!(same_progress_with_target(&source, &target));
    }
}
