use anyhow::{bail, Result};

use crate::auth;
use crate::cli::Service;
use crate::config::AppConfig;
use crate::token_store::TokenStore;

pub async fn run(config: &AppConfig, service: Service) -> Result<()> {
    let tokens = TokenStore::load(AppConfig::token_path()).await?;

    match service {
        Service::Anilist => {
            if config.anilist.client_id.is_empty() || config.anilist.client_secret.is_empty() {
                bail!("anilist.client_id and anilist.client_secret must be set in the config file");
            }
            auth::login_anilist(&tokens, &config.anilist.client_id, &config.anilist.client_secret).await?;
            println!("Logged in to AniList.");
        }
        Service::Mal => {
            if config.mal.client_id.is_empty() {
                bail!("mal.client_id must be set in the config file");
            }
            auth::login_mal(&tokens, &config.mal.client_id).await?;
            println!("Logged in to MyAnimeList.");
        }
    }

    Ok(())
}
