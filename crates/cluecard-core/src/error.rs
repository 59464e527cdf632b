//! Domain error types.

use thiserror::Error;
use uuid::Uuid;

/// Top-level domain error type.
#[derive(Debug, Error)]
pub enum DomainError {
    /// An aggregate was not found.
    #[error("aggregate not found: {0}")]
    AggregateNotFound(Uuid),

    /// Optimistic concurrency conflict.
    #[error("concurrency conflict on aggregate {aggregate_id}: expected version {expected}, found {actual}")]
    ConcurrencyConflict {
        /// The aggregate that had the conflict.
        aggregate_id: Uuid,
        /// The expected version.
        expected: i64,
        /// The actual version found.
        actual: i64,
    },

    /// A validation error in domain logic.
    #[error("validation error: {0}")]
    Validation(String),

    /// A required external-service setting is missing.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The clue generator ran out of attempts and no fallback was usable.
    #[error("clue generation exhausted after {attempts} attempts")]
    GenerationExhausted {
        /// Attempts spent before giving up.
        attempts: u32,
        /// Raw output of the last attempt that reached the service, if any.
        last_output: Option<String>,
    },

    /// An infrastructure/persistence error.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}

/// Failures raised while drafting a clue ladder.
///
/// Only `Configuration` and `Exhausted` ever leave the orchestrator; the
/// others are per-attempt outcomes that are retried locally.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    /// Credentials for the generation service are absent.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Network failure, timeout or non-2xx status from the service.
    #[error("transport error: {0}")]
    Transport(String),

    /// Response did not contain the expected clue list.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// A candidate clue revealed the answer.
    #[error("clue in slot {slot} leaks the answer")]
    LeakRejected {
        /// 1-based slot of the offending clue.
        slot: usize,
    },

    /// A candidate clue broke the style rules.
    #[error("clue in slot {slot} violates the style rules")]
    StyleRejected {
        /// 1-based slot of the offending clue.
        slot: usize,
    },

    /// The attempt budget ran out without a fully valid ladder.
    #[error("generation exhausted after {attempts} attempts")]
    Exhausted {
        /// Attempts spent.
        attempts: u32,
        /// Raw output of the last attempt that produced a response.
        last_output: Option<String>,
    },
}

impl GenerationError {
    /// Whether the orchestrator may spend another attempt after this error.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::Configuration(_) | Self::Exhausted { .. })
    }
}

impl From<GenerationError> for DomainError {
    fn from(err: GenerationError) -> Self {
        match err {
            GenerationError::Configuration(message) => Self::Configuration(message),
            GenerationError::Exhausted {
                attempts,
                last_output,
            } => Self::GenerationExhausted {
                attempts,
                last_output,
            },
            other => Self::Infrastructure(other.to_string()),
        }
    }
}
