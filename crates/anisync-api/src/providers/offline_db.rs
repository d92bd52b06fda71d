use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use anisync_core::cache::write_atomic;
use anisync_core::context::Context;
use anisync_core::error::Result;
use anisync_core::models::MediaVariant;
use anisync_core::providers::{IdMapping, IdNamespace, MappingProvider};
use anisync_core::retry::RetryTransport;
use async_trait::async_trait;
use semver::Version;
use serde::Deserialize;

use crate::error::ApiError;

fn parse_tag(tag: &str) -> Option<Version> {
    Version::parse(tag.trim_start_matches('v')).ok()
}

const RELEASE_ASSET_URL: &str =
    "https://github.com/manami-project/anime-offline-database/releases/latest/download/anime-offline-database.json";
const RELEASE_API_URL: &str =
    "https://api.github.com/repos/manami-project/anime-offline-database/releases/latest";

#[derive(Debug, Deserialize)]
struct OfflineDbFile {
    data: Vec<OfflineDbRecord>,
}

#[derive(Debug, Deserialize)]
struct OfflineDbRecord {
    sources: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct GitHubRelease {
    tag_name: String,
}

#[derive(Debug, Default)]
struct Maps {
    mal_to_anilist: HashMap<u64, u64>,
    anilist_to_mal: HashMap<u64, u64>,
}

fn extract_id(url: &str, marker: &str) -> Option<u64> {
    let idx = url.find(marker)?;
    url[idx + marker.len()..]
        .split(|c: char| !c.is_ascii_digit())
        .next()
        .and_then(|s| s.parse().ok())
}

fn build_maps(file: OfflineDbFile) -> Maps {
    let mut maps = Maps::default();
    for record in file.data {
        let mal_id = record.sources.iter().find_map(|s| extract_id(s, "myanimelist.net/anime/"));
        let anilist_id = record.sources.iter().find_map(|s| extract_id(s, "anilist.co/anime/"));
        if let (Some(mal), Some(anilist)) = (mal_id, anilist_id) {
            maps.mal_to_anilist.insert(mal, anilist);
            maps.anilist_to_mal.insert(anilist, mal);
        }
    }
    maps
}

/// In-memory MAL<->AniList anime mapping loaded once per run from a GitHub
/// release asset. Anime-only; the upstream project doesn't track manga
/// relations.
pub struct OfflineDbProvider {
    cache_dir: PathBuf,
    transport: RetryTransport,
    maps: RwLock<Maps>,
}

impl OfflineDbProvider {
    fn db_path(&self) -> PathBuf {
        self.cache_dir.join("anime-offline-database.json")
    }

    fn version_path(&self) -> PathBuf {
        self.cache_dir.join("version.txt")
    }

    /// Loads the cached database from `cache_dir`, downloading it first if
    /// absent. When `auto_update` is set, checks GitHub for a newer tag and
    /// re-downloads if found; any network failure during that check falls
    /// back silently to the cached copy.
    pub async fn load(ctx: &Context, cache_dir: PathBuf, auto_update: bool) -> Result<Self> {
        let transport = RetryTransport::new(
            reqwest::Client::builder()
                .user_agent("anisync (+https://github.com/anisync-rs/anisync)")
                .build()
                .map_err(ApiError::Http)?,
        );
        let provider = Self { cache_dir, transport, maps: RwLock::new(Maps::default()) };

        let db_path = provider.db_path();
        if !db_path.exists() {
            provider.download(ctx).await?;
        } else if auto_update {
            if let Err(err) = provider.update_if_newer(ctx).await {
                tracing::warn!(%err, "offline DB update check failed, using cached copy");
            }
        }

        let reader = std::io::BufReader::new(std::fs::File::open(provider.db_path())?);
        let file: OfflineDbFile = serde_json::from_reader(reader)?;
        *provider.maps.write().unwrap() = build_maps(file);
        Ok(provider)
    }

    async fn download(&self, ctx: &Context) -> Result<()> {
        let request = self.transport.client().get(RELEASE_ASSET_URL).build().map_err(ApiError::Http)?;
        let response = self.transport.execute(ctx, request).await?;
        let bytes = response.bytes().await.map_err(ApiError::Http)?;
        write_atomic(&self.db_path(), &bytes)?;
        Ok(())
    }

    async fn update_if_newer(&self, ctx: &Context) -> Result<()> {
        let request = self.transport.client().get(RELEASE_API_URL).build().map_err(ApiError::Http)?;
        let response = self.transport.execute(ctx, request).await?;
        let release: GitHubRelease =
            response.json().await.map_err(|e| ApiError::Parse(e.to_string(), "github"))?;

        let current = std::fs::read_to_string(self.version_path()).unwrap_or_default();
        let current = current.trim();

        let is_newer = match (parse_tag(current), parse_tag(&release.tag_name)) {
            (Some(current), Some(latest)) => latest > current,
            _ => current != release.tag_name,
        };

        if is_newer {
            self.download(ctx).await?;
            write_atomic(&self.version_path(), release.tag_name.as_bytes())?;
        }
        Ok(())
    }
}

#[async_trait]
impl MappingProvider for OfflineDbProvider {
    async fn lookup(
        &self,
        _ctx: &Context,
        namespace: IdNamespace,
        media_type: MediaVariant,
        id: u64,
    ) -> Result<Option<IdMapping>> {
        if media_type != MediaVariant::Anime {
            return Ok(None);
        }
        let maps = self.maps.read().unwrap();
        let mapping = match namespace {
            IdNamespace::MyAnimeList => {
                maps.mal_to_anilist.get(&id).map(|&anilist_id| IdMapping { anilist_id: Some(anilist_id), mal_id: Some(id) })
            }
            IdNamespace::AniList => {
                maps.anilist_to_mal.get(&id).map(|&mal_id| IdMapping { anilist_id: Some(id), mal_id: Some(mal_id) })
            }
        };
        Ok(mapping)
    }

    fn name(&self) -> &'static str {
        "offline_db"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_v_prefixed_tags() {
        assert_eq!(parse_tag("v2.3.1"), Some(Version::new(2, 3, 1)));
        assert_eq!(parse_tag("2.3.1"), Some(Version::new(2, 3, 1)));
        assert_eq!(parse_tag("latest"), None);
    }

    #[test]
    fn extracts_ids_from_source_urls() {
        assert_eq!(extract_id("https://myanimelist.net/anime/1535", "myanimelist.net/anime/"), Some(1535));
        assert_eq!(extract_id("https://anilist.co/anime/21", "anilist.co/anime/"), Some(21));
        assert_eq!(extract_id("https://anidb.net/anime/1234", "myanimelist.net/anime/"), None);
    }

    #[test]
    fn builds_bidirectional_maps() {
        let file = OfflineDbFile {
            data: vec![OfflineDbRecord {
                sources: vec![
                    "https://myanimelist.net/anime/1535".to_string(),
                    "https://anilist.co/anime/21".to_string(),
                ],
            }],
        };
        let maps = build_maps(file);
        assert_eq!(maps.mal_to_anilist.get(&1535), Some(&21));
        assert_eq!(maps.anilist_to_mal.get(&21), Some(&1535));
    }
}
