//! The thing players try to guess.

use std::collections::BTreeMap;
use std::fmt;

use cluecard_core::error::DomainError;
use serde::{Deserialize, Serialize};

/// Closed set of subject kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubjectKind {
    /// A film.
    Movie,
    /// A track, answered as `"<track> - <artist>"`.
    Music,
}

impl SubjectKind {
    /// Lower-case wire name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Movie => "movie",
            Self::Music => "music",
        }
    }

    /// How the subject is referred to in instructions.
    #[must_use]
    pub fn noun(self) -> &'static str {
        match self {
            Self::Movie => "film",
            Self::Music => "song",
        }
    }
}

impl fmt::Display for SubjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A film or song together with the facts used to write clues about it.
///
/// `answer_text` is what must never appear in a clue. `context_facts` (year,
/// genres, contributors, album, ...) are handed to the generator as
/// background only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    /// Film or music.
    pub kind: SubjectKind,
    /// The exact answer.
    pub answer_text: String,
    /// Auxiliary descriptive fields, ordered by key.
    #[serde(default)]
    pub context_facts: BTreeMap<String, String>,
}

impl Subject {
    /// Creates a subject with no context facts.
    #[must_use]
    pub fn new(kind: SubjectKind, answer_text: impl Into<String>) -> Self {
        Self {
            kind,
            answer_text: answer_text.into(),
            context_facts: BTreeMap::new(),
        }
    }

    /// Adds one context fact.
    #[must_use]
    pub fn with_fact(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context_facts.insert(key.into(), value.into());
        self
    }

    /// Checks the subject can be turned into a card.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the answer text is blank.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.answer_text.trim().is_empty() {
            return Err(DomainError::Validation(
                "subject answer_text must not be blank".to_owned(),
            ));
        }
        Ok(())
    }

    /// Exact-match guess check: trimmed and case-insensitive.
    #[must_use]
    pub fn matches_guess(&self, guess: &str) -> bool {
        guess.trim().to_lowercase() == self.answer_text.trim().to_lowercase()
    }
}
