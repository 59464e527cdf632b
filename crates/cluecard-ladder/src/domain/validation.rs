//! Validation pipeline: the leak detector and the style checker.
//!
//! Both checks are pure functions of a [`RuleSet`] and the candidate text.
//! Thresholds and word lists are data so a deployment can tune them from the
//! engine config without touching the retry loop.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use cluecard_core::error::GenerationError;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::subject::{Subject, SubjectKind};

/// Four-digit 19xx/20xx year not embedded in a longer number ("1990s" counts).
static YEAR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|\D)(?:19|20)\d{2}(?:\D|$)").expect("valid year regex"));

const LIST_SEPARATORS: [&str; 4] = [":", ";", " / ", " | "];

/// Tunable leak and style rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleSet {
    /// Words ignored when comparing answer and clue tokens.
    pub stopwords: BTreeSet<String>,
    /// Answers with at most this many meaningful tokens leak on a single
    /// shared token.
    pub short_answer_max_tokens: usize,
    /// Longer answers leak once this many tokens are shared.
    pub long_answer_shared_tokens: usize,
    /// A music track or artist name needs at least this many tokens before
    /// token overlap is considered.
    pub music_part_min_tokens: usize,
    /// Shared tokens with a track or artist name that count as a leak.
    pub music_part_shared_tokens: usize,
    /// Clues shorter than this many words are rejected.
    pub min_words: usize,
    /// Reject clues that read like a list (`:` `;` ` / ` ` | `).
    pub reject_list_separators: bool,
    /// Award, platform and meta terms that must not appear.
    pub banned_terms: Vec<String>,
    /// Critic-voice vocabulary that must not appear.
    pub literary_terms: Vec<String>,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            stopwords: words(&[
                "the", "a", "an", "and", "or", "of", "to", "in", "on", "for", "with", "from",
                "by", "at", "is", "it", "this", "that", "as", "are",
            ])
            .into_iter()
            .collect(),
            short_answer_max_tokens: 2,
            long_answer_shared_tokens: 3,
            music_part_min_tokens: 2,
            music_part_shared_tokens: 2,
            min_words: 6,
            reject_list_separators: true,
            banned_terms: words(&[
                "oscar",
                "oscars",
                "academy award",
                "grammy",
                "grammys",
                "golden globe",
                "emmy",
                "bafta",
                "palme d'or",
                "billboard award",
                "netflix",
                "hulu",
                "disney plus",
                "prime video",
                "hbo",
                "spotify",
                "apple music",
                "youtube",
                "imdb",
                "tmdb",
                "box office",
                "released",
                "premiered",
                "answer",
                "title",
            ]),
            literary_terms: words(&[
                "allegory",
                "allegorical",
                "existential",
                "existentialism",
                "juxtapose",
                "juxtaposes",
                "juxtaposition",
                "dichotomy",
                "zeitgeist",
                "ennui",
                "liminal",
                "ethereal",
                "tapestry",
                "poignant",
                "visceral",
                "catharsis",
                "cathartic",
                "meditation",
                "motif",
                "thematic",
                "metaphor",
                "evocative",
                "nuanced",
                "subversive",
            ]),
        }
    }
}

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|w| (*w).to_owned()).collect()
}

/// Outcome of running both checkers on one candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClueCheck {
    /// The leak detector fired.
    pub leaks: bool,
    /// The style checker fired.
    pub violates_style: bool,
}

impl ClueCheck {
    /// True when both checkers passed.
    #[must_use]
    pub fn is_accepted(self) -> bool {
        !self.leaks && !self.violates_style
    }
}

/// Per-slot results for a whole candidate ladder.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LadderReview {
    /// 1-based slots that failed the leak detector.
    pub leaking_slots: Vec<usize>,
    /// 1-based slots that failed the style checker.
    pub style_slots: Vec<usize>,
}

impl LadderReview {
    /// True when every slot passed both checkers.
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        self.leaking_slots.is_empty() && self.style_slots.is_empty()
    }

    /// The first rejection, leaks before style.
    #[must_use]
    pub fn first_rejection(&self) -> Option<GenerationError> {
        if let Some(&slot) = self.leaking_slots.first() {
            return Some(GenerationError::LeakRejected { slot });
        }
        self.style_slots
            .first()
            .map(|&slot| GenerationError::StyleRejected { slot })
    }
}

impl RuleSet {
    /// Lower-cased alphanumeric tokens of `text`, stopwords removed.
    #[must_use]
    pub fn tokenize(&self, text: &str) -> BTreeSet<String> {
        normalized_words(text)
            .into_iter()
            .filter(|token| !self.stopwords.contains(token))
            .collect()
    }

    /// Whether `candidate` reveals or nearly reveals `answer_text`.
    #[must_use]
    pub fn leaks(&self, answer_text: &str, candidate: &str, kind: SubjectKind) -> bool {
        if answer_text.is_empty() {
            return false;
        }
        let lowered = candidate.to_lowercase();
        if lowered.contains(&answer_text.to_lowercase()) {
            return true;
        }
        let answer = answer_text.trim().to_lowercase();
        if answer.is_empty() {
            return false;
        }
        if lowered.contains(&answer) {
            return true;
        }

        let candidate_tokens = self.tokenize(candidate);

        if kind == SubjectKind::Music {
            if let Some((track, artist)) = split_music_answer(answer_text) {
                return self.music_part_leaks(track, &lowered, &candidate_tokens)
                    || self.music_part_leaks(artist, &lowered, &candidate_tokens);
            }
        }

        let answer_tokens = self.tokenize(&answer);
        let shared = answer_tokens.intersection(&candidate_tokens).count();
        if answer_tokens.len() <= self.short_answer_max_tokens {
            shared >= 1
        } else {
            shared >= self.long_answer_shared_tokens
        }
    }

    fn music_part_leaks(
        &self,
        part: &str,
        lowered_candidate: &str,
        candidate_tokens: &BTreeSet<String>,
    ) -> bool {
        let raw = part.trim().to_lowercase();
        if raw.is_empty() {
            return false;
        }
        if lowered_candidate.contains(&raw) {
            return true;
        }
        let tokens = self.tokenize(&raw);
        tokens.len() >= self.music_part_min_tokens
            && tokens.intersection(candidate_tokens).count() >= self.music_part_shared_tokens
    }

    /// Whether `candidate` breaks the conversational-sentence style rules.
    #[must_use]
    pub fn violates_style(&self, candidate: &str) -> bool {
        let text = candidate.trim();
        if text.is_empty() || text.split_whitespace().count() < self.min_words {
            return true;
        }
        if self.reject_list_separators && LIST_SEPARATORS.iter().any(|sep| text.contains(sep)) {
            return true;
        }
        if YEAR_PATTERN.is_match(text) {
            return true;
        }

        let tokens = normalized_words(text);
        self.banned_terms
            .iter()
            .chain(&self.literary_terms)
            .any(|term| contains_phrase(&tokens, &normalized_words(term)))
    }

    /// Runs both checkers on one candidate.
    #[must_use]
    pub fn check(&self, subject: &Subject, candidate: &str) -> ClueCheck {
        ClueCheck {
            leaks: self.leaks(&subject.answer_text, candidate, subject.kind),
            violates_style: self.violates_style(candidate),
        }
    }

    /// Runs both checkers on every slot of a candidate ladder.
    #[must_use]
    pub fn review_ladder(&self, subject: &Subject, clues: &[String]) -> LadderReview {
        let mut review = LadderReview::default();
        for (index, clue) in clues.iter().enumerate() {
            let check = self.check(subject, clue);
            if check.leaks {
                review.leaking_slots.push(index + 1);
            }
            if check.violates_style {
                review.style_slots.push(index + 1);
            }
        }
        review
    }
}

/// Splits `"<track> - <artist>"` on the first separator.
#[must_use]
pub fn split_music_answer(answer_text: &str) -> Option<(&str, &str)> {
    answer_text
        .split_once(" - ")
        .map(|(track, artist)| (track.trim(), artist.trim()))
}

fn normalized_words(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn contains_phrase(tokens: &[String], phrase: &[String]) -> bool {
    !phrase.is_empty() && tokens.windows(phrase.len()).any(|window| window == phrase)
}
