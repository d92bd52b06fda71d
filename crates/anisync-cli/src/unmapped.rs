use std::path::Path;

use anisync_core::cache::write_atomic;
use anisync_core::report::{Outcome, SyncReport};
use anyhow::Result;
use serde::Serialize;

/// One entry in the unmapped-entries report, written so a user can
/// hand-author manual mappings for the next run rather than re-running the
/// full strategy chain to rediscover misses.
#[derive(Debug, Serialize)]
struct UnmappedEntry {
    title: String,
    id_anilist: u64,
    id_mal: u64,
    media_type: &'static str,
}

/// Writes every [`Outcome::Unmapped`] outcome accumulated across one or more
/// passes to `path` as a JSON array, overwriting any previous contents.
pub fn write_unmapped_report(path: &Path, reports: &[std::sync::Arc<SyncReport>]) -> Result<()> {
    let entries: Vec<UnmappedEntry> = reports
        .iter()
        .flat_map(|r| r.outcomes())
        .filter_map(|outcome| match outcome {
            Outcome::Unmapped { title, id_anilist, id_mal, media_type } => {
                Some(UnmappedEntry { title, id_anilist, id_mal, media_type: media_type.as_str() })
            }
            _ => None,
        })
        .collect();

    let bytes = serde_json::to_vec_pretty(&entries)?;
    write_atomic(path, &bytes)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anisync_core::models::MediaVariant;

    #[test]
    fn writes_only_unmapped_outcomes() {
        let report = std::sync::Arc::new(SyncReport::new());
        report.record_outcome(Outcome::Unmapped {
            title: "Lone Wolf".into(),
            id_anilist: 0,
            id_mal: 0,
            media_type: MediaVariant::Anime,
        });
        report.record_outcome(Outcome::Updated { title: "Other".into(), diff: "score".into() });

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("unmapped.json");
        write_unmapped_report(&path, &[report]).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let parsed: Vec<serde_json::Value> = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0]["title"], "Lone Wolf");
    }
}
