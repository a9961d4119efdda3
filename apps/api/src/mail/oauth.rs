//! Gmail OAuth2 access-token refresh
//!
//! The service only ever holds a long-lived refresh token. Access tokens are
//! exchanged on demand and cached until shortly before they expire.

use oauth2::{
    basic::BasicClient, AuthUrl, ClientId, ClientSecret, RefreshToken, TokenResponse, TokenUrl,
};
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::{MailError, MailResult};
use crate::config::GmailConfig;

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";

/// Seconds of remaining validity below which a token is treated as expired.
const EXPIRY_MARGIN_SECS: i64 = 300;

/// An access token and its expiry
#[derive(Debug, Clone)]
pub struct TokenPair {
    /// Access token for SMTP XOAUTH2
    pub access_token: String,
    /// Token expiration timestamp (Unix seconds)
    pub expires_at: Option<i64>,
}

impl TokenPair {
    /// Check if the access token is expired or about to expire
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(chrono::Utc::now().timestamp())
    }

    fn is_expired_at(&self, now: i64) -> bool {
        match self.expires_at {
            Some(expires_at) => expires_at - now < EXPIRY_MARGIN_SECS,
            // No expiry reported: never reuse it
            None => true,
        }
    }
}

/// Exchanges the configured refresh token for short-lived access tokens.
pub struct GmailTokenProvider {
    client: BasicClient,
    refresh_token: RefreshToken,
    cached: Mutex<Option<TokenPair>>,
}

impl GmailTokenProvider {
    pub fn new(config: &GmailConfig) -> MailResult<Self> {
        let auth_url = AuthUrl::new(GOOGLE_AUTH_URL.to_string())
            .map_err(|e| MailError::TokenRefresh(format!("Invalid auth URL: {e}")))?;
        let token_url = TokenUrl::new(config.token_url.clone())
            .map_err(|e| MailError::TokenRefresh(format!("Invalid token URL: {e}")))?;

        let client = BasicClient::new(
            ClientId::new(config.client_id.clone()),
            Some(ClientSecret::new(config.client_secret.clone())),
            auth_url,
            Some(token_url),
        );

        Ok(Self {
            client,
            refresh_token: RefreshToken::new(config.refresh_token.clone()),
            cached: Mutex::new(None),
        })
    }

    /// Returns a valid access token, refreshing it if the cached one is stale.
    pub async fn access_token(&self) -> MailResult<String> {
        let mut cached = self.cached.lock().await;

        if let Some(token) = cached.as_ref().filter(|t| !t.is_expired()) {
            debug!("Reusing cached Gmail access token");
            return Ok(token.access_token.clone());
        }

        let token = self.refresh().await?;
        let access_token = token.access_token.clone();
        *cached = Some(token);
        Ok(access_token)
    }

    /// Drops the cached token so the next call performs a fresh exchange.
    pub async fn invalidate(&self) {
        *self.cached.lock().await = None;
    }

    async fn refresh(&self) -> MailResult<TokenPair> {
        info!("Refreshing Gmail OAuth2 access token");

        let token_response = self
            .client
            .exchange_refresh_token(&self.refresh_token)
            .request_async(oauth2::reqwest::async_http_client)
            .await
            .map_err(|e| MailError::TokenRefresh(e.to_string()))?;

        let access_token = token_response.access_token().secret().clone();
        if access_token.is_empty() {
            return Err(MailError::TokenRefresh(
                "Failed to obtain access token".to_string(),
            ));
        }

        let expires_at = token_response
            .expires_in()
            .map(|duration| chrono::Utc::now().timestamp() + duration.as_secs() as i64);

        Ok(TokenPair {
            access_token,
            expires_at,
        })
    }
}
