use anyhow::Result;

use crate::cli::Service;
use crate::config::AppConfig;
use crate::token_store::TokenStore;

pub async fn run(service: Service) -> Result<()> {
    let tokens = TokenStore::load(AppConfig::token_path()).await?;
    let name = match service {
        Service::Anilist => "anilist",
        Service::Mal => "mal",
    };
    tokens.remove(name).await?;
    println!("Removed saved token for {name}.");
    Ok(())
}
