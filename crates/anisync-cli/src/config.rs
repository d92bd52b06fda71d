use std::path::PathBuf;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

const DEFAULT_CONFIG: &str = include_str!("../config/default.toml");

/// Top-level CLI configuration. The core reconciliation engine never reads
/// this directly — the CLI
/// translates it into a [`anisync_core::options::SyncOptions`] and a pair of
/// service adapters before handing control to the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub general: GeneralConfig,
    pub anilist: AniListConfig,
    pub mal: MalConfig,
    pub sync: SyncConfig,
    pub watch: WatchConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub log_level: String,
    /// Silences noisy connection-reset spam from the retry transport's
    /// underlying HTTP stack at the tracing-filter level.
    pub suppress_connection_errors: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self { log_level: "info".to_string(), suppress_connection_errors: false }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AniListConfig {
    pub client_id: String,
    pub client_secret: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MalConfig {
    pub client_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub offline_db: bool,
    pub arm_api: bool,
    pub ignore_list: Vec<String>,
    pub manual_mappings: Vec<ManualMappingEntry>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self { offline_db: true, arm_api: true, ignore_list: Vec::new(), manual_mappings: Vec::new() }
    }
}

/// One user-supplied manual override, highest priority in the strategy
/// chain. `source_id` and `target_id` are interpreted in
/// whichever namespace the configured sync direction reads from/writes to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManualMappingEntry {
    pub source_id: u64,
    pub target_id: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Bounds enforced by the `watch` subcommand: 1-168 hours.
    pub interval_hours: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self { interval_hours: 24 }
    }
}

impl AppConfig {
    /// Loads the user config file if present, falling back to the built-in
    /// defaults otherwise. This is an either/or resolution, not a deep merge.
    pub fn load() -> Result<Self> {
        match Self::user_config_path() {
            Some(path) if path.exists() => Self::load_from_path(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn load_from_path(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::user_config_path().context("no config directory available on this platform")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(&path, content)?;
        Ok(())
    }

    /// Environment variables override file values for the two OAuth client
    /// IDs/secret.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("ANISYNC_ANILIST_CLIENT_ID") {
            self.anilist.client_id = v;
        }
        if let Ok(v) = std::env::var("ANISYNC_ANILIST_CLIENT_SECRET") {
            self.anilist.client_secret = v;
        }
        if let Ok(v) = std::env::var("ANISYNC_MAL_CLIENT_ID") {
            self.mal.client_id = v;
        }
        if let Ok(v) = std::env::var("ANISYNC_LOG_LEVEL") {
            self.general.log_level = v;
        }
    }

    pub fn user_config_path() -> Option<PathBuf> {
        Self::project_dirs().map(|d| d.config_dir().join("config.toml"))
    }

    pub fn cache_dir() -> PathBuf {
        Self::project_dirs().map(|d| d.cache_dir().to_path_buf()).unwrap_or_else(|| PathBuf::from("cache"))
    }

    pub fn token_path() -> PathBuf {
        Self::project_dirs().map(|d| d.data_dir().join("tokens.json")).unwrap_or_else(|| PathBuf::from("tokens.json"))
    }

    pub fn unmapped_path() -> PathBuf {
        Self::cache_dir().join("unmapped.json")
    }

    pub fn log_dir() -> PathBuf {
        Self::project_dirs().map(|d| d.data_dir().join("logs")).unwrap_or_else(|| PathBuf::from("logs"))
    }

    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("", "", "anisync")
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        toml::from_str(DEFAULT_CONFIG).expect("built-in default config is valid TOML")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_parses() {
        let config = AppConfig::default();
        assert_eq!(config.general.log_level, "info");
        assert!(config.sync.offline_db);
        assert!(config.sync.arm_api);
        assert_eq!(config.watch.interval_hours, 24);
    }

    #[test]
    fn roundtrips_through_toml() {
        let config = AppConfig::default();
        let serialized = toml::to_string_pretty(&config).unwrap();
        let deserialized: AppConfig = toml::from_str(&serialized).unwrap();
        assert_eq!(deserialized.general.log_level, config.general.log_level);
    }

    #[test]
    fn env_overrides_take_precedence() {
        std::env::set_var("ANISYNC_MAL_CLIENT_ID", "from-env");
        let mut config = AppConfig::default();
        config.apply_env_overrides();
        assert_eq!(config.mal.client_id, "from-env");
        std::env::remove_var("ANISYNC_MAL_CLIENT_ID");
    }
}
