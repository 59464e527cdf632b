//! Text-generation capability.
//!
//! The clue orchestrator only needs "send instructions, get text back". Any
//! provider (an HTTP chat-completions endpoint, a scripted fake) plugs in
//! behind [`TextGenerator`].

use async_trait::async_trait;
use serde::Serialize;

use crate::error::GenerationError;

/// One request to the generation service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationRequest {
    /// System-level instructions (tone and global constraints).
    pub system: String,
    /// User-level instructions (role plan, hard constraints, context facts).
    pub user: String,
}

/// A service that turns instructions into raw text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Sends `request` and returns the raw response text.
    ///
    /// # Errors
    ///
    /// Returns `GenerationError::Configuration` when credentials are missing
    /// and `GenerationError::Transport` for network, timeout or status
    /// failures. Callers treat an empty string as a malformed response.
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError>;
}
