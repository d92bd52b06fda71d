use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{MediaVariant, Status};

/// Why an entry was skipped rather than updated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SkipReason {
    UnknownStatus,
    Ignored,
    NoIdentifier,
    NoChanges,
    DryRun,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UnknownStatus => "unknown status",
            Self::Ignored => "on ignore list",
            Self::NoIdentifier => "no usable identifier",
            Self::NoChanges => "no changes",
            Self::DryRun => "dry run",
        }
    }
}

/// A title-matching warning deferred from the strategy chain — a rejected
/// match guess, not an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Warning {
    pub title: String,
    pub reason: String,
    pub detail: String,
    pub media_type: MediaVariant,
}

/// The outcome of processing a single source entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Outcome {
    Updated { title: String, diff: String },
    WouldUpdate { title: String, diff: String },
    Skipped { title: String, reason: SkipReason },
    /// Every strategy in the chain missed. Carries both IDs and the media
    /// type so an unmapped-entries report can be written for manual-mapping
    /// feedback.
    Unmapped { title: String, id_anilist: u64, id_mal: u64, media_type: MediaVariant },
    Errored { title: String, message: String },
}

/// Append-only record of a single reconciliation pass. Mutated from the pass
/// loop and, for warnings, from strategy code — guarded by an internal mutex
/// so passes running concurrently (different variant/direction combinations)
/// can share report-writing code without a data race.
#[derive(Debug, Default)]
pub struct SyncReport {
    inner: Mutex<ReportInner>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ReportInner {
    total: u64,
    updated: u64,
    would_update: u64,
    skipped: HashMap<String, u64>,
    errored: u64,
    per_status: HashMap<String, u64>,
    warnings: Vec<Warning>,
    outcomes: Vec<Outcome>,
    started_at: Option<DateTime<Utc>>,
    ended_at: Option<DateTime<Utc>>,
}

impl SyncReport {
    pub fn new() -> Self {
        let mut inner = ReportInner::default();
        inner.started_at = Some(Utc::now());
        Self { inner: Mutex::new(inner) }
    }

    pub fn finish(&self) {
        self.inner.lock().unwrap().ended_at = Some(Utc::now());
    }

    pub fn record_status(&self, status: Status, variant: MediaVariant) {
        let mut inner = self.inner.lock().unwrap();
        inner.total += 1;
        *inner.per_status.entry(status.label_for(variant).to_string()).or_insert(0) += 1;
    }

    pub fn record_outcome(&self, outcome: Outcome) {
        let mut inner = self.inner.lock().unwrap();
        match &outcome {
            Outcome::Updated { .. } => inner.updated += 1,
            Outcome::WouldUpdate { .. } => inner.would_update += 1,
            Outcome::Skipped { reason, .. } => {
                *inner.skipped.entry(reason.as_str().to_string()).or_insert(0) += 1;
            }
            Outcome::Errored { .. } => inner.errored += 1,
            Outcome::Unmapped { .. } => {
                *inner.skipped.entry("unmapped".to_string()).or_insert(0) += 1;
            }
        }
        inner.outcomes.push(outcome);
    }

    pub fn record_warning(&self, warning: Warning) {
        self.inner.lock().unwrap().warnings.push(warning);
    }

    pub fn updated_count(&self) -> u64 {
        self.inner.lock().unwrap().updated
    }

    pub fn would_update_count(&self) -> u64 {
        self.inner.lock().unwrap().would_update
    }

    pub fn errored_count(&self) -> u64 {
        self.inner.lock().unwrap().errored
    }

    pub fn total_count(&self) -> u64 {
        self.inner.lock().unwrap().total
    }

    pub fn warnings(&self) -> Vec<Warning> {
        self.inner.lock().unwrap().warnings.clone()
    }

    pub fn outcomes(&self) -> Vec<Outcome> {
        self.inner.lock().unwrap().outcomes.clone()
    }

    /// Renders the end-of-pass summary shown to the user: updated, skipped
    /// (with reason counts), errored, and warnings grouped by media type.
    pub fn render_summary(&self) -> String {
        let inner = self.inner.lock().unwrap();
        let mut out = String::new();
        out.push_str(&format!(
            "processed {} | updated {} | would-update {} | errored {}\n",
            inner.total, inner.updated, inner.would_update, inner.errored
        ));
        if !inner.skipped.is_empty() {
            out.push_str("skipped:\n");
            for (reason, count) in &inner.skipped {
                out.push_str(&format!("  {reason}: {count}\n"));
            }
        }
        if !inner.warnings.is_empty() {
            out.push_str("warnings:\n");
            for w in &inner.warnings {
                out.push_str(&format!("  [{}] {}: {} ({})\n", w.media_type, w.title, w.reason, w.detail));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_track_outcomes() {
        let report = SyncReport::new();
        report.record_outcome(Outcome::Updated { title: "A".into(), diff: "score".into() });
        report.record_outcome(Outcome::Skipped { title: "B".into(), reason: SkipReason::NoChanges });
        report.record_outcome(Outcome::Errored { title: "C".into(), message: "boom".into() });
        assert_eq!(report.updated_count(), 1);
        assert_eq!(report.errored_count(), 1);
        assert_eq!(report.outcomes().len(), 3);
    }

    #[test]
    fn warnings_accumulate() {
        let report = SyncReport::new();
        report.record_warning(Warning {
            title: "X".into(),
            reason: "mal id mismatch".into(),
            detail: "111 vs 222".into(),
            media_type: MediaVariant::Anime,
        });
        assert_eq!(report.warnings().len(), 1);
    }
}
