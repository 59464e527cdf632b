//! Engine configuration.
//!
//! Every field has a default, so an empty YAML document (or no file at all)
//! yields the canonical rule set.

use std::path::Path;
use std::time::Duration;

use cluecard_core::error::DomainError;
use serde::{Deserialize, Serialize};

use crate::domain::policy::TimingPolicy;
use crate::domain::validation::RuleSet;
use crate::generation::fallback::FallbackPool;

/// What to do when the attempt budget runs out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExhaustionPolicy {
    /// Fail card creation with `GenerationExhausted`.
    #[default]
    Fail,
    /// Serve the pre-authored fallback pool instead.
    Fallback,
}

/// Retry-loop settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    /// Attempts per card, including the first.
    pub max_attempts: u32,
    /// Per-attempt deadline for the generation service.
    pub request_timeout_ms: u64,
    /// Fixed pause between attempts.
    pub backoff_ms: u64,
    /// Each clue is cut to this many words before validation.
    pub max_words_per_clue: usize,
    /// Behaviour once `max_attempts` is spent.
    pub on_exhaustion: ExhaustionPolicy,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            max_attempts: 7,
            request_timeout_ms: 20_000,
            backoff_ms: 750,
            max_words_per_clue: 20,
            on_exhaustion: ExhaustionPolicy::Fail,
        }
    }
}

impl GenerationSettings {
    /// Per-attempt deadline.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Pause between attempts.
    #[must_use]
    pub fn backoff(&self) -> Duration {
        Duration::from_millis(self.backoff_ms)
    }
}

/// Everything the clue engine needs besides the generator itself.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Party size → ladder length and countdown.
    pub timing: TimingPolicy,
    /// Leak and style rules.
    pub rules: RuleSet,
    /// Retry loop.
    pub generation: GenerationSettings,
    /// Pre-authored clues used when generation is exhausted.
    pub fallback: FallbackPool,
}

impl EngineConfig {
    /// Parses a YAML document.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Configuration` if the document is not valid.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, DomainError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml)
            .map_err(|e| DomainError::Configuration(format!("invalid engine config: {e}")))
    }

    /// Reads and parses a YAML file.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Configuration` if the file cannot be read or
    /// parsed.
    pub fn load(path: &Path) -> Result<Self, DomainError> {
        let yaml = std::fs::read_to_string(path).map_err(|e| {
            DomainError::Configuration(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_yaml_str(&yaml)
    }
}
