use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Command-line shell for the AniList <-> MyAnimeList reconciliation engine.
#[derive(Parser)]
#[command(name = "anisync", author, version, about, long_about = None)]
pub struct Cli {
    /// Path to a config file, overriding the platform default.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Service {
    Anilist,
    Mal,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Authorize this tool against AniList or MyAnimeList and save the token.
    Login {
        service: Service,
    },
    /// Forget a saved token for one service.
    Logout {
        service: Service,
    },
    /// Show whether a token is on file for each service, and its expiry.
    Status,
    /// Run one reconciliation pass.
    Sync(SyncArgs),
    /// Run reconciliation on a repeating interval.
    Watch(WatchArgs),
}

#[derive(Args, Clone, Debug)]
pub struct SyncArgs {
    /// Bypass the progress comparison and update every resolved entry.
    #[arg(long)]
    pub force: bool,

    /// Resolve and diff but never dispatch an update.
    #[arg(long)]
    pub dry_run: bool,

    /// Sync manga instead of anime.
    #[arg(long)]
    pub manga: bool,

    /// Sync both anime and manga.
    #[arg(long)]
    pub all: bool,

    /// Emit a `[DECISION]` trace for every strategy step.
    #[arg(long)]
    pub verbose: bool,

    /// MyAnimeList is the source, AniList is the target (reverse direction).
    /// Default is forward (AniList source, MAL target).
    #[arg(long)]
    pub reverse_direction: bool,

    /// Consult the offline anime-relations database. Overrides config when
    /// passed explicitly.
    #[arg(long)]
    pub offline_db: bool,

    /// Disables the offline database even if the config enables it.
    #[arg(long)]
    pub no_offline_db: bool,

    /// Consult the ARM-style remote mapping API. Overrides config when
    /// passed explicitly.
    #[arg(long)]
    pub arm_api: bool,

    /// Disables the ARM-style API even if the config enables it.
    #[arg(long)]
    pub no_arm_api: bool,
}

impl SyncArgs {
    /// Whether to run anime, manga, or both, honoring `--manga`/`--all`.
    pub fn variants(&self) -> Vec<anisync_core::models::MediaVariant> {
        use anisync_core::models::MediaVariant;
        if self.all {
            vec![MediaVariant::Anime, MediaVariant::Manga]
        } else if self.manga {
            vec![MediaVariant::Manga]
        } else {
            vec![MediaVariant::Anime]
        }
    }

    pub fn resolve_offline_db(&self, configured: bool) -> bool {
        if self.no_offline_db {
            false
        } else if self.offline_db {
            true
        } else {
            configured
        }
    }

    pub fn resolve_arm_api(&self, configured: bool) -> bool {
        if self.no_arm_api {
            false
        } else if self.arm_api {
            true
        } else {
            configured
        }
    }
}

#[derive(Args, Clone, Debug)]
pub struct WatchArgs {
    #[command(flatten)]
    pub sync: SyncArgs,

    /// Hours between passes. Clamped to the 1-168 range.
    #[arg(long, default_value_t = 24)]
    pub interval: u64,

    /// Run one pass immediately and exit instead of looping.
    #[arg(long)]
    pub once: bool,
}

pub const MIN_WATCH_INTERVAL_HOURS: u64 = 1;
pub const MAX_WATCH_INTERVAL_HOURS: u64 = 168;

#[cfg(test)]
mod tests {
    use super::*;
    use anisync_core::models::MediaVariant;

    fn args(all: bool, manga: bool) -> SyncArgs {
        SyncArgs {
            force: false,
            dry_run: false,
            manga,
            all,
            verbose: false,
            reverse_direction: false,
            offline_db: false,
            no_offline_db: false,
            arm_api: false,
            no_arm_api: false,
        }
    }

    #[test]
    fn defaults_to_anime_only() {
        assert_eq!(args(false, false).variants(), vec![MediaVariant::Anime]);
    }

    #[test]
    fn manga_flag_selects_manga_only() {
        assert_eq!(args(false, true).variants(), vec![MediaVariant::Manga]);
    }

    #[test]
    fn all_flag_selects_both() {
        assert_eq!(args(true, false).variants(), vec![MediaVariant::Anime, MediaVariant::Manga]);
    }

    #[test]
    fn explicit_no_offline_db_wins_over_config() {
        let mut a = args(false, false);
        a.no_offline_db = true;
        assert!(!a.resolve_offline_db(true));
    }

    #[test]
    fn unset_flags_fall_back_to_config() {
        let a = args(false, false);
        assert!(a.resolve_offline_db(true));
        assert!(!a.resolve_offline_db(false));
    }
}
