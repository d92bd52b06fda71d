use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::MediaVariant;
use crate::providers::IdMapping;

/// Default time-to-live for an ID-mapping cache entry.
pub const DEFAULT_TTL_DAYS: i64 = 30;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheEntry {
    anilist_id: Option<u64>,
    mal_id: Option<u64>,
    cached_at: DateTime<Utc>,
}

impl CacheEntry {
    fn is_expired(&self, ttl: ChronoDuration) -> bool {
        Utc::now() - self.cached_at >= ttl
    }

    fn to_mapping(&self) -> IdMapping {
        IdMapping { anilist_id: self.anilist_id, mal_id: self.mal_id }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct CacheFile {
    entries: HashMap<String, CacheEntry>,
}

fn key(provider: &str, media_type: MediaVariant, source_id: u64) -> String {
    format!("{provider}:{media_type}:{source_id}")
}

/// Per-provider JSON-on-disk cache of `(provider, media_type, id) -> mapping`
/// lookups, including cached negatives ("known not to map"). Loaded fully on
/// construction, flushed atomically (temp file + rename) only when dirty.
pub struct MappingCache {
    path: PathBuf,
    ttl: ChronoDuration,
    state: RwLock<CacheFile>,
    dirty: std::sync::atomic::AtomicBool,
}

impl MappingCache {
    /// Loads the cache file at `path` if present; a missing or corrupt file
    /// starts an empty cache rather than failing the whole run.
    pub fn load(path: impl Into<PathBuf>, ttl_days: i64) -> Self {
        let path = path.into();
        let state = std::fs::read_to_string(&path)
            .ok()
            .and_then(|s| serde_json::from_str(&s).ok())
            .unwrap_or_default();
        Self {
            path,
            ttl: ChronoDuration::days(ttl_days),
            state: RwLock::new(state),
            dirty: std::sync::atomic::AtomicBool::new(false),
        }
    }

    /// Returns the cached mapping for this key, if present and unexpired.
    /// An unexpired cached negative comes back as `Some(IdMapping::default())`
    /// (both fields `None`) rather than `None`, so callers can distinguish
    /// "don't bother looking this up again" from "no cache entry at all".
    pub fn get(&self, provider: &str, media_type: MediaVariant, source_id: u64) -> Option<IdMapping> {
        let state = self.state.read().unwrap();
        let entry = state.entries.get(&key(provider, media_type, source_id))?;
        if entry.is_expired(self.ttl) {
            None
        } else {
            Some(entry.to_mapping())
        }
    }

    pub fn put(&self, provider: &str, media_type: MediaVariant, source_id: u64, mapping: IdMapping) {
        let mut state = self.state.write().unwrap();
        state.entries.insert(
            key(provider, media_type, source_id),
            CacheEntry { anilist_id: mapping.anilist_id, mal_id: mapping.mal_id, cached_at: Utc::now() },
        );
        drop(state);
        self.dirty.store(true, std::sync::atomic::Ordering::SeqCst);
    }

    /// Flushes to disk only if a mutation occurred since load/last flush.
    /// Writes via a temp file in the same directory followed by a rename, so
    /// a crash mid-write can never leave a half-written cache file behind.
    pub fn flush(&self) -> Result<()> {
        if !self.dirty.swap(false, std::sync::atomic::Ordering::SeqCst) {
            return Ok(());
        }
        let state = self.state.read().unwrap();
        write_atomic(&self.path, &serde_json::to_vec_pretty(&*state)?)
    }
}

/// Writes `contents` to `path` via a temp file in the same directory
/// followed by a rename, so a crash mid-write never leaves a half-written
/// file. Shared by the mapping cache, the offline database, and the token
/// store.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let tmp_path = path.with_extension("tmp");
    std::fs::write(&tmp_path, contents)?;
    std::fs::rename(&tmp_path, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn miss_then_put_then_hit() {
        let dir = tempdir().unwrap();
        let cache = MappingCache::load(dir.path().join("hato.json"), DEFAULT_TTL_DAYS);
        assert!(cache.get("hato", MediaVariant::Anime, 1).is_none());

        cache.put("hato", MediaVariant::Anime, 1, IdMapping { anilist_id: Some(10), mal_id: Some(20) });
        let mapping = cache.get("hato", MediaVariant::Anime, 1).unwrap();
        assert_eq!(mapping.anilist_id, Some(10));
    }

    #[test]
    fn negative_entries_are_cached_and_distinct_from_absence() {
        let dir = tempdir().unwrap();
        let cache = MappingCache::load(dir.path().join("arm.json"), DEFAULT_TTL_DAYS);
        cache.put("arm", MediaVariant::Anime, 5, IdMapping::default());
        let cached = cache.get("arm", MediaVariant::Anime, 5).unwrap();
        assert!(cached.is_empty());
    }

    #[test]
    fn flush_writes_atomically_and_round_trips() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("hato.json");
        let cache = MappingCache::load(&path, DEFAULT_TTL_DAYS);
        cache.put("hato", MediaVariant::Manga, 7, IdMapping { anilist_id: None, mal_id: Some(99) });
        cache.flush().unwrap();
        assert!(path.exists());
        assert!(!path.with_extension("tmp").exists());

        let reloaded = MappingCache::load(&path, DEFAULT_TTL_DAYS);
        let mapping = reloaded.get("hato", MediaVariant::Manga, 7).unwrap();
        assert_eq!(mapping.mal_id, Some(99));
    }

    #[test]
    fn clean_cache_skips_rewrite() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.json");
        let cache = MappingCache::load(&path, DEFAULT_TTL_DAYS);
        cache.flush().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn expired_entry_is_treated_as_absent() {
        let dir = tempdir().unwrap();
        let cache = MappingCache::load(dir.path().join("arm.json"), 0);
        cache.put("arm", MediaVariant::Anime, 1, IdMapping { anilist_id: Some(1), mal_id: None });
        std::thread::sleep(std::time::Duration::from_millis(5));
        assert!(cache.get("arm", MediaVariant::Anime, 1).is_none());
    }
}
