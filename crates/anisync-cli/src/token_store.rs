use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

/// One service's persisted OAuth2 credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenRecord {
    pub access_token: String,
    pub refresh_token: Option<String>,
    /// `None` for AniList, whose access tokens don't expire and so need no
    /// refresh path.
    pub expires_at: Option<DateTime<Utc>>,
}

impl TokenRecord {
    pub fn is_expired(&self) -> bool {
        matches!(self.expires_at, Some(exp) if Utc::now() >= exp)
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct TokenFile {
    #[serde(flatten)]
    services: HashMap<String, TokenRecord>,
}

/// Single JSON file holding every site's tokens, guarded by an RW
/// lock since the CLI's auth-refresh path and the watch-mode scheduler may
/// both touch it concurrently.
pub struct TokenStore {
    path: PathBuf,
    state: RwLock<TokenFile>,
}

impl TokenStore {
    pub async fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let state = match tokio::fs::read_to_string(&path).await {
            Ok(content) => serde_json::from_str(&content)
                .with_context(|| format!("failed to parse token file: {}", path.display()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => TokenFile::default(),
            Err(e) => return Err(e).context("failed to read token file"),
        };
        Ok(Self { path, state: RwLock::new(state) })
    }

    pub async fn get(&self, service: &str) -> Option<TokenRecord> {
        self.state.read().await.services.get(service).cloned()
    }

    pub async fn set(&self, service: &str, record: TokenRecord) -> Result<()> {
        self.state.write().await.services.insert(service.to_string(), record);
        self.flush().await
    }

    pub async fn remove(&self, service: &str) -> Result<()> {
        self.state.write().await.services.remove(service);
        self.flush().await
    }

    async fn flush(&self) -> Result<()> {
        let bytes = {
            let state = self.state.read().await;
            serde_json::to_vec_pretty(&*state)?
        };
        write_atomic_fsync(&self.path, &bytes).await
    }
}

/// Same temp-file + rename discipline as [`anisync_core::cache::write_atomic`],
/// plus an explicit `fsync` on the renamed file — tokens are sensitive enough
/// that a power loss right after `rename` should not be able to leave a
/// zero-length or truncated file behind.
async fn write_atomic_fsync(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let tmp_path = path.with_extension("tmp");
    tokio::fs::write(&tmp_path, contents).await?;
    tokio::fs::rename(&tmp_path, path).await?;
    let file = tokio::fs::File::open(path).await?;
    file.sync_all().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::load(dir.path().join("tokens.json")).await.unwrap();
        assert!(store.get("anilist").await.is_none());
    }

    #[tokio::test]
    async fn set_then_reload_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tokens.json");
        let store = TokenStore::load(&path).await.unwrap();
        store
            .set("mal", TokenRecord { access_token: "abc".into(), refresh_token: Some("r".into()), expires_at: None })
            .await
            .unwrap();

        let reloaded = TokenStore::load(&path).await.unwrap();
        let record = reloaded.get("mal").await.unwrap();
        assert_eq!(record.access_token, "abc");
        assert!(!path.with_extension("tmp").exists());
    }

    #[tokio::test]
    async fn remove_clears_entry() {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::load(dir.path().join("tokens.json")).await.unwrap();
        store.set("anilist", TokenRecord { access_token: "x".into(), refresh_token: None, expires_at: None }).await.unwrap();
        store.remove("anilist").await.unwrap();
        assert!(store.get("anilist").await.is_none());
    }

    #[test]
    fn expiry_check() {
        let expired = TokenRecord { access_token: "x".into(), refresh_token: None, expires_at: Some(Utc::now() - chrono::Duration::seconds(1)) };
        assert!(expired.is_expired());
        let fresh = TokenRecord { access_token: "x".into(), refresh_token: None, expires_at: Some(Utc::now() + chrono::Duration::seconds(60)) };
        assert!(!fresh.is_expired());
        let no_expiry = TokenRecord { access_token: "x".into(), refresh_token: None, expires_at: None };
        assert!(!no_expiry.is_expired());
    }
}
