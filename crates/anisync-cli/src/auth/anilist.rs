use std::io::{Read, Write};
use std::net::TcpListener;

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use url::Url;

const AUTH_URL: &str = "https://anilist.co/api/v2/oauth/authorize";
const TOKEN_URL: &str = "https://anilist.co/api/v2/oauth/token";
const REDIRECT_URI: &str = "http://localhost:19742";

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
}

/// Runs the OAuth2 Authorization Code Grant flow for AniList:
/// 1. Open the system browser to AniList's consent page.
/// 2. Listen on localhost:19742 for the redirect carrying `?code=...`.
/// 3. Exchange the code for an access token.
pub async fn authorize(client_id: &str, client_secret: &str) -> Result<TokenResponse> {
    let auth_url =
        format!("{AUTH_URL}?client_id={client_id}&redirect_uri={REDIRECT_URI}&response_type=code");

    tracing::info!("opening AniList authorization URL in browser");
    open::that(&auth_url).map_err(|e| anyhow!("failed to open browser: {e}"))?;

    let code = listen_for_redirect()?;
    exchange_code(client_id, client_secret, &code).await
}

fn listen_for_redirect() -> Result<String> {
    let listener =
        TcpListener::bind("127.0.0.1:19742").map_err(|e| anyhow!("failed to bind localhost:19742: {e}"))?;

    tracing::info!("waiting for AniList OAuth redirect on localhost:19742...");

    let (mut stream, _) = listener.accept().context("failed to accept redirect connection")?;

    let mut buf = [0u8; 4096];
    let n = stream.read(&mut buf).context("failed to read redirect request")?;
    let request = String::from_utf8_lossy(&buf[..n]);

    let path = request
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .ok_or_else(|| anyhow!("malformed HTTP request from redirect"))?;

    let parsed = Url::parse(&format!("http://localhost{path}")).context("failed to parse redirect URL")?;
    let code = parsed
        .query_pairs()
        .find(|(k, _)| k == "code")
        .map(|(_, v)| v.to_string())
        .ok_or_else(|| anyhow!("no 'code' parameter in redirect"))?;

    let response = "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\n\r\n\
                    <html><body><h2>Authorization successful!</h2>\
                    <p>You can close this tab and return to the terminal.</p></body></html>";
    let _ = stream.write_all(response.as_bytes());

    Ok(code)
}

async fn exchange_code(client_id: &str, client_secret: &str, code: &str) -> Result<TokenResponse> {
    let http = reqwest::Client::new();
    let resp = http
        .post(TOKEN_URL)
        .json(&serde_json::json!({
            "grant_type": "authorization_code",
            "client_id": client_id,
            "client_secret": client_secret,
            "redirect_uri": REDIRECT_URI,
            "code": code,
        }))
        .send()
        .await
        .context("AniList token exchange request failed")?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        return Err(anyhow!("AniList token exchange returned HTTP {status}: {body}"));
    }

    resp.json::<TokenResponse>().await.context("failed to parse AniList token response")
}
