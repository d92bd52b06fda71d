use std::io::{Read, Write};
use std::net::TcpListener;

use anyhow::{anyhow, Context, Result};
use rand::Rng;
use serde::Deserialize;
use url::Url;

const AUTH_URL: &str = "https://myanimelist.net/v1/oauth2/authorize";
const TOKEN_URL: &str = "https://myanimelist.net/v1/oauth2/token";
const REDIRECT_URI: &str = "http://localhost:19742";
const VERIFIER_LEN: usize = 128;

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: Option<u64>,
}

/// Runs the full OAuth2 PKCE authorization flow for MyAnimeList:
/// 1. Generate a PKCE verifier (MAL requires the `plain` method, so the
///    challenge sent in the authorize request is the verifier itself).
/// 2. Open the browser to MAL's consent page.
/// 3. Listen on localhost:19742 for the redirect with `?code=...`.
/// 4. Exchange the code for tokens.
pub async fn authorize(client_id: &str) -> Result<TokenResponse> {
    let verifier = generate_verifier();

    let auth_url = format!(
        "{AUTH_URL}?response_type=code\
         &client_id={client_id}\
         &code_challenge={verifier}\
         &code_challenge_method=plain\
         &redirect_uri={REDIRECT_URI}"
    );

    tracing::info!("opening MyAnimeList authorization URL in browser");
    open::that(&auth_url).map_err(|e| anyhow!("failed to open browser: {e}"))?;

    let code = listen_for_redirect()?;
    exchange_code(client_id, &code, &verifier).await
}

/// Refreshes an expired MAL access token.
pub async fn refresh(client_id: &str, refresh_token: &str) -> Result<TokenResponse> {
    let http = reqwest::Client::new();
    let resp = http
        .post(TOKEN_URL)
        .form(&[("client_id", client_id), ("grant_type", "refresh_token"), ("refresh_token", refresh_token)])
        .send()
        .await
        .context("MAL token refresh request failed")?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        return Err(anyhow!("MAL token refresh returned HTTP {status}: {body}"));
    }

    resp.json::<TokenResponse>().await.context("failed to parse MAL refresh response")
}

/// Generates a cryptographically random, URL-safe PKCE verifier of
/// [`VERIFIER_LEN`] characters, the maximum MAL's PKCE implementation
/// accepts.
fn generate_verifier() -> String {
    const CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-._~";
    let mut rng = rand::thread_rng();
    (0..VERIFIER_LEN).map(|_| CHARS[rng.gen_range(0..CHARS.len())] as char).collect()
}

fn listen_for_redirect() -> Result<String> {
    let listener =
        TcpListener::bind("127.0.0.1:19742").map_err(|e| anyhow!("failed to bind localhost:19742: {e}"))?;

    tracing::info!("waiting for MAL OAuth redirect on localhost:19742...");

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

async fn exchange_code(client_id: &str, code: &str, verifier: &str) -> Result<TokenResponse> {
    let http = reqwest::Client::new();
    let resp = http
        .post(TOKEN_URL)
        .form(&[
            ("client_id", client_id),
            ("grant_type", "authorization_code"),
            ("code", code),
            ("code_verifier", verifier),
            ("redirect_uri", REDIRECT_URI),
        ])
        .send()
        .await
        .context("MAL token exchange request failed")?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        return Err(anyhow!("MAL token exchange returned HTTP {status}: {body}"));
    }

    resp.json::<TokenResponse>().await.context("failed to parse MAL token response")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verifier_is_correct_length_and_alphabet() {
        let verifier = generate_verifier();
        assert_eq!(verifier.len(), VERIFIER_LEN);
        assert!(verifier.chars().all(|c| c.is_ascii_alphanumeric() || "-._~".contains(c)));
    }

    #[test]
    fn verifiers_are_not_constant() {
        assert_ne!(generate_verifier(), generate_verifier());
    }
}
