pub mod anilist;
pub mod mal;

use anyhow::Result;
use chrono::{Duration, Utc};

use crate::token_store::{TokenRecord, TokenStore};

/// Runs the AniList OAuth2 authorization-code flow and persists the result.
/// AniList access tokens don't expire, so there is no refresh path.
pub async fn login_anilist(store: &TokenStore, client_id: &str, client_secret: &str) -> Result<()> {
    let token = anilist::authorize(client_id, client_secret).await?;
    store
        .set("anilist", TokenRecord { access_token: token.access_token, refresh_token: None, expires_at: None })
        .await
}

/// Runs the MAL OAuth2 PKCE flow and persists the resulting access + refresh
/// tokens along with a computed expiry.
pub async fn login_mal(store: &TokenStore, client_id: &str) -> Result<()> {
    let token = mal::authorize(client_id).await?;
    let expires_at = token.expires_in.map(|secs| Utc::now() + Duration::seconds(secs as i64));
    store
        .set("mal", TokenRecord { access_token: token.access_token, refresh_token: token.refresh_token, expires_at })
        .await
}

/// Returns a valid MAL access token, refreshing it first if it has expired.
/// AniList tokens are returned as-is since they carry no expiry.
pub async fn ensure_fresh_mal_token(store: &TokenStore, client_id: &str) -> Result<String> {
    let record = store.get("mal").await.ok_or_else(|| anyhow::anyhow!("not logged in to MyAnimeList"))?;
    if !record.is_expired() {
        return Ok(record.access_token);
    }
    let refresh_token = record
        .refresh_token
        .ok_or_else(|| anyhow::anyhow!("MyAnimeList token expired and no refresh token is on file"))?;
    let refreshed = mal::refresh(client_id, &refresh_token).await?;
    let expires_at = refreshed.expires_in.map(|secs| Utc::now() + Duration::seconds(secs as i64));
    let access_token = refreshed.access_token.clone();
    store
        .set(
            "mal",
            TokenRecord {
                access_token: refreshed.access_token,
                refresh_token: refreshed.refresh_token,
                expires_at,
            },
        )
        .await?;
    Ok(access_token)
}
