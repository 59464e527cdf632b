//! Retry state: attempt budget plus accumulated guidance.
//!
//! Guidance is a set, so adding the same override twice is a no-op and the
//! order in which rejections arrived does not change the next request.

use std::collections::BTreeSet;

use cluecard_core::error::GenerationError;

use crate::domain::validation::LadderReview;

/// Extra instruction added after a rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GuidanceOverride {
    /// Added after any leak.
    AvoidProperNouns,
    /// Added after any style failure.
    SimplifyVocabulary,
}

impl GuidanceOverride {
    /// The sentence appended to the next request.
    #[must_use]
    pub fn instruction(self) -> &'static str {
        match self {
            Self::AvoidProperNouns => {
                "Do not use any proper nouns at all: no names of people, places, bands, studios or works."
            }
            Self::SimplifyVocabulary => {
                "Use simple everyday words and one plain sentence per clue, the way a friend would say it out loud."
            }
        }
    }
}

/// The `Drafting(attempt, guidance)` state of the orchestrator.
#[derive(Debug, Clone)]
pub struct DraftState {
    attempt: u32,
    max_attempts: u32,
    guidance: BTreeSet<GuidanceOverride>,
    last_output: Option<String>,
    last_rejection: Option<GenerationError>,
}

impl DraftState {
    /// A fresh session with `max_attempts` attempts (at least one).
    #[must_use]
    pub fn new(max_attempts: u32) -> Self {
        Self {
            attempt: 0,
            max_attempts: max_attempts.max(1),
            guidance: BTreeSet::new(),
            last_output: None,
            last_rejection: None,
        }
    }

    /// Starts the next attempt and returns its 1-based number, or `None`
    /// once the budget is spent.
    pub fn begin_attempt(&mut self) -> Option<u32> {
        if self.attempt >= self.max_attempts {
            return None;
        }
        self.attempt += 1;
        Some(self.attempt)
    }

    /// Attempts started so far.
    #[must_use]
    pub fn attempts_made(&self) -> u32 {
        self.attempt
    }

    /// Attempts still available.
    #[must_use]
    pub fn attempts_left(&self) -> u32 {
        self.max_attempts - self.attempt
    }

    /// Guidance to include in the next request.
    #[must_use]
    pub fn guidance(&self) -> &BTreeSet<GuidanceOverride> {
        &self.guidance
    }

    /// Adds one override.
    pub fn add_guidance(&mut self, guidance: GuidanceOverride) {
        self.guidance.insert(guidance);
    }

    /// Narrows future requests based on which checkers fired.
    pub fn absorb(&mut self, review: &LadderReview) {
        if let Some(rejection) = review.first_rejection() {
            self.last_rejection = Some(rejection);
        }
        if !review.leaking_slots.is_empty() {
            self.add_guidance(GuidanceOverride::AvoidProperNouns);
        }
        if !review.style_slots.is_empty() {
            self.add_guidance(GuidanceOverride::SimplifyVocabulary);
        }
    }

    /// Keeps the raw service output for diagnostics.
    pub fn record_output(&mut self, raw: &str) {
        self.last_output = Some(raw.to_owned());
    }

    /// Raw output of the most recent attempt that produced one.
    #[must_use]
    pub fn last_output(&self) -> Option<&str> {
        self.last_output.as_deref()
    }

    /// The most recent leak or style rejection, leaks first within a ladder.
    #[must_use]
    pub fn last_rejection(&self) -> Option<&GenerationError> {
        self.last_rejection.as_ref()
    }

    /// The terminal error for this session.
    #[must_use]
    pub fn into_exhausted(self) -> GenerationError {
        GenerationError::Exhausted {
            attempts: self.attempt,
            last_output: self.last_output,
        }
    }
}
