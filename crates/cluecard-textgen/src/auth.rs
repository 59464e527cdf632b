//! Credentials and the process-wide access-token cache.
//!
//! Refresh is serialized: the cache holds an async mutex across the fetch,
//! so concurrent callers that find the token stale wait for one refresh
//! instead of each re-authenticating.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use cluecard_core::error::GenerationError;
use serde::Deserialize;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info};

/// Tokens are refreshed this long before they expire.
pub const DEFAULT_REFRESH_MARGIN: Duration = Duration::from_secs(60);

/// How requests to the generation service are authorized.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// A static bearer key.
    ApiKey(String),
    /// OAuth2 client-credentials grant.
    ClientCredentials {
        /// Token endpoint.
        token_url: String,
        /// Client identifier.
        client_id: String,
        /// Client secret.
        client_secret: String,
    },
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ApiKey(_) => f.write_str("ApiKey(..)"),
            Self::ClientCredentials {
                token_url,
                client_id,
                ..
            } => f
                .debug_struct("ClientCredentials")
                .field("token_url", token_url)
                .field("client_id", client_id)
                .finish_non_exhaustive(),
        }
    }
}

/// A bearer token and when it stops being valid.
#[derive(Debug, Clone)]
pub struct AccessToken {
    /// The bearer value.
    pub value: String,
    /// Expiry instant.
    pub expires_at: Instant,
}

impl AccessToken {
    /// A token valid for `lifetime` from now.
    #[must_use]
    pub fn expiring_in(value: impl Into<String>, lifetime: Duration) -> Self {
        Self {
            value: value.into(),
            expires_at: Instant::now() + lifetime,
        }
    }

    fn is_fresh(&self, margin: Duration) -> bool {
        Instant::now() + margin < self.expires_at
    }
}

/// Obtains a new access token.
#[async_trait]
pub trait TokenFetcher: Send + Sync {
    /// Fetches a fresh token.
    ///
    /// # Errors
    ///
    /// Returns `GenerationError::Transport` when the token endpoint cannot be
    /// reached or rejects the request.
    async fn fetch(&self) -> Result<AccessToken, GenerationError>;
}

/// Caches one token and refreshes it shortly before expiry.
pub struct TokenCache<F> {
    fetcher: F,
    refresh_margin: Duration,
    current: Mutex<Option<AccessToken>>,
}

impl<F: TokenFetcher> TokenCache<F> {
    /// Creates an empty cache over `fetcher`.
    #[must_use]
    pub fn new(fetcher: F, refresh_margin: Duration) -> Self {
        Self {
            fetcher,
            refresh_margin,
            current: Mutex::new(None),
        }
    }

    /// Returns a valid bearer value, fetching one if needed.
    ///
    /// # Errors
    ///
    /// Propagates the fetcher's error.
    pub async fn bearer(&self) -> Result<String, GenerationError> {
        let mut current = self.current.lock().await;
        if let Some(token) = current.as_ref().filter(|t| t.is_fresh(self.refresh_margin)) {
            return Ok(token.value.clone());
        }

        debug!("refreshing access token");
        let token = self.fetcher.fetch().await?;
        let value = token.value.clone();
        *current = Some(token);
        Ok(value)
    }

    /// Drops the cached token so the next call re-authenticates.
    pub async fn invalidate(&self) {
        *self.current.lock().await = None;
    }
}

impl<F> fmt::Debug for TokenCache<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCache")
            .field("refresh_margin", &self.refresh_margin)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    3600
}

/// OAuth2 client-credentials grant over HTTP.
#[derive(Debug, Clone)]
pub struct ClientCredentialsFetcher {
    client: reqwest::Client,
    token_url: String,
    client_id: String,
    client_secret: String,
}

impl ClientCredentialsFetcher {
    /// Creates a fetcher posting to `token_url`.
    #[must_use]
    pub fn new(
        client: reqwest::Client,
        token_url: String,
        client_id: String,
        client_secret: String,
    ) -> Self {
        Self {
            client,
            token_url,
            client_id,
            client_secret,
        }
    }
}

#[async_trait]
impl TokenFetcher for ClientCredentialsFetcher {
    async fn fetch(&self) -> Result<AccessToken, GenerationError> {
        let response = self
            .client
            .post(&self.token_url)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
            ])
            .send()
            .await
            .map_err(|e| GenerationError::Transport(format!("token request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GenerationError::Transport(format!(
                "token endpoint returned {status}"
            )));
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::Transport(format!("invalid token response: {e}")))?;

        info!(expires_in = body.expires_in, "obtained access token");
        Ok(AccessToken::expiring_in(
            body.access_token,
            Duration::from_secs(body.expires_in),
        ))
    }
}
