//! OpenAI-compatible chat-completions client.

use std::time::Duration;

use async_trait::async_trait;
use cluecard_core::error::GenerationError;
use cluecard_core::textgen::{GenerationRequest, TextGenerator};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::auth::{
    ClientCredentialsFetcher, Credentials, DEFAULT_REFRESH_MARGIN, TokenCache,
};

/// Default chat-completions endpoint.
pub const DEFAULT_URL: &str = "https://api.openai.com/v1/chat/completions";
/// Default model name.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Connection settings for the generation service.
#[derive(Debug, Clone)]
pub struct TextGenSettings {
    /// Chat-completions URL.
    pub url: String,
    /// Model name sent with each request.
    pub model: String,
    /// `None` leaves the client unconfigured: every call fails fast.
    pub credentials: Option<Credentials>,
    /// Upper bound on one HTTP exchange.
    pub request_timeout: Duration,
    /// Sampling temperature.
    pub temperature: f32,
    /// Completion length cap.
    pub max_tokens: u32,
}

impl Default for TextGenSettings {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_owned(),
            model: DEFAULT_MODEL.to_owned(),
            credentials: None,
            request_timeout: Duration::from_secs(30),
            temperature: 0.8,
            max_tokens: 1024,
        }
    }
}

enum Authorizer {
    Static(String),
    Cached(TokenCache<ClientCredentialsFetcher>),
}

impl Authorizer {
    async fn bearer(&self) -> Result<String, GenerationError> {
        match self {
            Self::Static(key) => Ok(key.clone()),
            Self::Cached(cache) => cache.bearer().await,
        }
    }
}

/// [`TextGenerator`] backed by an HTTP chat-completions endpoint.
pub struct HttpTextGenerator {
    client: Client,
    url: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    authorizer: Option<Authorizer>,
}

impl std::fmt::Debug for HttpTextGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTextGenerator")
            .field("url", &self.url)
            .field("model", &self.model)
            .field("configured", &self.authorizer.is_some())
            .finish_non_exhaustive()
    }
}

impl HttpTextGenerator {
    /// Builds a client from `settings`.
    ///
    /// # Errors
    ///
    /// Returns `GenerationError::Configuration` if the HTTP client cannot be
    /// constructed.
    pub fn new(settings: TextGenSettings) -> Result<Self, GenerationError> {
        let client = Client::builder()
            .timeout(settings.request_timeout)
            .build()
            .map_err(|e| GenerationError::Configuration(format!("http client: {e}")))?;

        let authorizer = settings.credentials.map(|credentials| match credentials {
            Credentials::ApiKey(key) => Authorizer::Static(key),
            Credentials::ClientCredentials {
                token_url,
                client_id,
                client_secret,
            } => Authorizer::Cached(TokenCache::new(
                ClientCredentialsFetcher::new(client.clone(), token_url, client_id, client_secret),
                DEFAULT_REFRESH_MARGIN,
            )),
        });

        if authorizer.is_none() {
            warn!("no text-generation credentials configured; card creation will fail");
        }

        Ok(Self {
            client,
            url: settings.url,
            model: settings.model,
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
            authorizer,
        })
    }

    /// Whether credentials were supplied.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.authorizer.is_some()
    }
}

#[async_trait]
impl TextGenerator for HttpTextGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        let authorizer = self.authorizer.as_ref().ok_or_else(|| {
            GenerationError::Configuration("text-generation credentials are not configured".into())
        })?;
        let bearer = authorizer.bearer().await?;

        let body = ChatRequest {
            model: &self.model,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            messages: [
                Message {
                    role: "system",
                    content: &request.system,
                },
                Message {
                    role: "user",
                    content: &request.user,
                },
            ],
        };

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&bearer)
            .json(&body)
            .send()
            .await
            .map_err(|e| GenerationError::Transport(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            if let Authorizer::Cached(cache) = authorizer {
                cache.invalidate().await;
            }
        }
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(GenerationError::Transport(format!(
                "generation service returned {status}: {detail}"
            )));
        }

        let completion: ChatResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::MalformedResponse(e.to_string()))?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| GenerationError::MalformedResponse("empty completion".into()))?;

        debug!(chars = content.len(), "completion received");
        Ok(content)
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    max_tokens: u32,
    messages: [Message<'a>; 2],
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}
