use std::collections::HashSet;

use crate::models::{Direction, MediaVariant};

/// Explicit configuration for one reconciliation run.
///
/// The reference system threads dry-run/force/direction through process-wide
/// flags; here they are an explicit value passed into the engine at
/// construction so a process can run multiple passes with different options
/// without global state (see the design notes on global mutable state).
#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub direction: Direction,
    pub variants: Vec<MediaVariant>,
    /// Bypasses the progress-comparison step; every resolved entry is updated.
    pub force: bool,
    /// Resolves and diffs but never dispatches an update.
    pub dry_run: bool,
    /// Case-insensitive titles to always skip.
    pub ignore_list: HashSet<String>,
    /// Whether to consult the offline mapping database.
    pub use_offline_db: bool,
    /// Whether to consult the ARM-style remote mapping API.
    pub use_arm_api: bool,
    pub verbose: bool,
}

impl SyncOptions {
    pub fn is_ignored(&self, title: &str) -> bool {
        let lowered = title.to_lowercase();
        self.ignore_list.iter().any(|entry| entry.to_lowercase() == lowered)
    }
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            direction: Direction::Forward,
            variants: vec![MediaVariant::Anime, MediaVariant::Manga],
            force: false,
            dry_run: false,
            ignore_list: HashSet::new(),
            use_offline_db: true,
            use_arm_api: true,
            verbose: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ignore_list_is_case_insensitive() {
        let mut opts = SyncOptions::default();
        opts.ignore_list.insert("Some Show".to_string());
        assert!(opts.is_ignored("some show"));
        assert!(opts.is_ignored("SOME SHOW"));
        assert!(!opts.is_ignored("other show"));
    }
}
