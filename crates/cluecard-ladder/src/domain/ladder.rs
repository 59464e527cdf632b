//! A finished clue ladder and where it came from.

use serde::{Deserialize, Serialize};

/// How a ladder was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LadderSource {
    /// Drafted by the generation service and accepted on `attempts`.
    Generated {
        /// Attempt on which the ladder was accepted.
        attempts: u32,
    },
    /// Taken from the pre-authored pool after `attempts` failed drafts.
    Fallback {
        /// Attempts spent before falling back.
        attempts: u32,
    },
}

/// Ordered clues, vaguest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClueLadder {
    /// The clues.
    pub clues: Vec<String>,
    /// Provenance.
    pub source: LadderSource,
}

impl ClueLadder {
    /// A ladder accepted from the generation service.
    #[must_use]
    pub fn generated(clues: Vec<String>, attempts: u32) -> Self {
        Self {
            clues,
            source: LadderSource::Generated { attempts },
        }
    }

    /// A ladder served from the fallback pool.
    #[must_use]
    pub fn fallback(clues: Vec<String>, attempts: u32) -> Self {
        Self {
            clues,
            source: LadderSource::Fallback { attempts },
        }
    }

    /// Number of slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.clues.len()
    }

    /// True for a ladder with no slots.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clues.is_empty()
    }
}
