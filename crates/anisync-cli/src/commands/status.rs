use anyhow::Result;

use crate::config::AppConfig;
use crate::token_store::TokenStore;

/// Surfaces token presence/expiry for both services without performing a
/// sync.
pub async fn run() -> Result<()> {
    let tokens = TokenStore::load(AppConfig::token_path()).await?;

    for (label, key) in [("AniList", "anilist"), ("MyAnimeList", "mal")] {
        match tokens.get(key).await {
            Some(record) => {
                let expiry = match record.expires_at {
                    Some(exp) if record.is_expired() => format!("expired at {exp}"),
                    Some(exp) => format!("valid until {exp}"),
                    None => "never expires".to_string(),
                };
                println!("{label}: logged in ({expiry})");
            }
            None => println!("{label}: not logged in"),
        }
    }

    Ok(())
}
