//! LinkedIn OAuth 2.0: three-legged authorization code flow.
//!
//! Stateless request/response helpers: build the authorization URL, exchange
//! the returned code for tokens, refresh tokens. CSRF protection uses a random
//! `state` that the caller stores (cookie) and checks with [`verify_state`]
//! before calling [`LinkedInOAuth::exchange_code`].

use linkpost_core::config::LinkedInConfig;
use linkpost_core::error::{LinkPostError, Result};
use linkpost_core::types::TokenDetails;
use rand::Rng;
use rand::distributions::Alphanumeric;
use serde::Deserialize;
use std::time::Duration;

/// Scopes requested by the redirect-based login.
pub const LOGIN_SCOPES: &[&str] = &["openid", "profile", "email", "w_member_social"];

/// Scopes requested by the API-driven auth URL when none are given.
pub const POSTING_SCOPES: &[&str] = &["w_member_social", "r_liteprofile"];

const STATE_LEN: usize = 16;

/// Raw token endpoint response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    refresh_token_expires_in: Option<u64>,
    #[serde(default)]
    scope: Option<String>,
}

impl From<TokenResponse> for TokenDetails {
    fn from(t: TokenResponse) -> Self {
        TokenDetails {
            access_token: t.access_token,
            expires_in: t.expires_in,
            refresh_token: t.refresh_token,
            refresh_token_expires_in: t.refresh_token_expires_in,
            scope: t.scope,
        }
    }
}

/// OAuth client for LinkedIn.
pub struct LinkedInOAuth {
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    oauth_url: String,
    client: reqwest::Client,
}

impl LinkedInOAuth {
    pub fn new(config: &LinkedInConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LinkPostError::Http(format!("Failed to build HTTP client: {e}")))?;

        tracing::info!(
            "🔑 LinkedIn OAuth configured (client_id={}, redirect_uri={}, secret_set={})",
            if config.client_id.is_empty() { "<unset>" } else { &config.client_id },
            config.redirect_uri,
            !config.client_secret.is_empty()
        );

        Ok(Self {
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            redirect_uri: config.redirect_uri.clone(),
            oauth_url: config.oauth_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Authorization URL the user should be sent to.
    pub fn authorization_url<S: AsRef<str>>(&self, scopes: &[S], state: &str) -> Result<String> {
        if self.redirect_uri.is_empty() {
            return Err(LinkPostError::Config("Redirect URI is not configured".into()));
        }
        if self.client_id.is_empty() {
            return Err(LinkPostError::Config("LinkedIn client id is not configured".into()));
        }

        let scope = scopes
            .iter()
            .map(|s| s.as_ref().trim())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        let mut url = reqwest::Url::parse(&format!("{}/authorization", self.oauth_url))
            .map_err(|e| LinkPostError::Config(format!("Invalid OAuth URL: {e}")))?;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("response_type", "code")
                .append_pair("client_id", &self.client_id)
                .append_pair("redirect_uri", &self.redirect_uri)
                .append_pair("scope", &scope);
            if !state.is_empty() {
                query.append_pair("state", state);
            }
        }
        Ok(url.to_string())
    }

    /// Exchange an authorization code for tokens.
    pub async fn exchange_code(&self, code: &str) -> Result<TokenDetails> {
        if code.trim().is_empty() {
            return Err(LinkPostError::InvalidInput("authorization code is required".into()));
        }
        self.require_credentials()?;
        tracing::info!("🔄 Exchanging authorization code (redirect_uri={})", self.redirect_uri);

        let tokens = self
            .token_request(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("client_id", &self.client_id),
                ("client_secret", &self.client_secret),
                ("redirect_uri", &self.redirect_uri),
            ])
            .await
            .map_err(|e| LinkPostError::Auth(format!("Failed to exchange code for token: {e}")))?;

        tracing::info!("✅ Exchanged authorization code for access token");
        Ok(tokens)
    }

    /// Obtain a fresh access token from a refresh token.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenDetails> {
        if refresh_token.trim().is_empty() {
            return Err(LinkPostError::InvalidInput("refresh token is required".into()));
        }
        self.require_credentials()?;

        let tokens = self
            .token_request(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
                ("client_id", &self.client_id),
                ("client_secret", &self.client_secret),
            ])
            .await
            .map_err(|e| LinkPostError::Auth(format!("Failed to refresh token: {e}")))?;

        tracing::info!("✅ Refreshed access token");
        Ok(tokens)
    }

    fn require_credentials(&self) -> Result<()> {
        if self.client_id.is_empty() || self.client_secret.is_empty() {
            return Err(LinkPostError::Auth(
                "LinkedIn client credentials are not configured".into(),
            ));
        }
        Ok(())
    }

    async fn token_request(&self, form: &[(&str, &str)]) -> Result<TokenDetails> {
        let url = format!("{}/accessToken", self.oauth_url);
        let resp = self
            .client
            .post(&url)
            .form(form)
            .send()
            .await
            .map_err(|e| LinkPostError::Http(format!("token endpoint unreachable: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            tracing::error!("❌ LinkedIn token endpoint returned {status}: {text}");
            return Err(LinkPostError::Http(format!("status {status}")));
        }

        let body: TokenResponse = resp
            .json()
            .await
            .map_err(|e| LinkPostError::Http(format!("invalid token response: {e}")))?;
        Ok(body.into())
    }
}

/// Random alphanumeric CSRF state.
pub fn generate_state() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(STATE_LEN)
        .map(char::from)
        .collect()
}

/// Check the `state` echoed by the provider against the one we stored.
pub fn verify_state(expected: Option<&str>, received: Option<&str>) -> Result<()> {
    match (expected, received) {
        (Some(e), Some(r)) if !e.is_empty() && e == r => Ok(()),
        _ => {
            tracing::warn!("🚫 OAuth state mismatch — possible CSRF");
            Err(LinkPostError::StateMismatch)
        }
    }
}
