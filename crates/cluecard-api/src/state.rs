//! Shared application state.

use std::sync::{Arc, Mutex};

use cluecard_core::clock::Clock;
use cluecard_core::repository::EventRepository;
use cluecard_core::rng::DeterministicRng;
use cluecard_core::textgen::TextGenerator;
use cluecard_ladder::config::EngineConfig;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Clock for event timestamps.
    pub clock: Arc<dyn Clock + Send + Sync>,
    /// RNG for fallback-pool offsets. Locked only in synchronous sections.
    pub rng: Arc<Mutex<dyn DeterministicRng + Send>>,
    /// Card store.
    pub event_repository: Arc<dyn EventRepository>,
    /// Text-generation service.
    pub text_generator: Arc<dyn TextGenerator>,
    /// Timing, validation and retry settings.
    pub engine: Arc<EngineConfig>,
    /// Whether credentials for the generation service were supplied.
    pub generation_configured: bool,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(
        clock: Arc<dyn Clock + Send + Sync>,
        rng: Arc<Mutex<dyn DeterministicRng + Send>>,
        event_repository: Arc<dyn EventRepository>,
        text_generator: Arc<dyn TextGenerator>,
        engine: Arc<EngineConfig>,
    ) -> Self {
        Self {
            clock,
            rng,
            event_repository,
            text_generator,
            engine,
            generation_configured: true,
        }
    }

    /// Records whether the generation service has credentials.
    #[must_use]
    pub fn with_generation_configured(mut self, configured: bool) -> Self {
        self.generation_configured = configured;
        self
    }
}
