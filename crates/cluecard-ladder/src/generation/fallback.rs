//! Pre-authored clues served when generation is exhausted.

use serde::{Deserialize, Serialize};

use crate::domain::subject::SubjectKind;

/// Generic clues per subject kind. Deliberately vague so they fit any
/// subject; gameplay continues, just with less help from the clues.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackPool {
    /// Clues for films.
    pub movie: Vec<String>,
    /// Clues for songs.
    pub music: Vec<String>,
}

impl Default for FallbackPool {
    fn default() -> Self {
        Self {
            movie: owned(&[
                "Think about the kind of night you would pick this one for.",
                "Picture who you would most want sitting next to you while watching.",
                "Imagine how the opening scene sets the mood for everything after.",
                "Most people remember how they felt walking out more than any detail.",
                "Consider the world it builds and how far it feels from everyday life.",
                "Think about the music that plays over the biggest moments.",
                "It is the kind of story people love to quote with friends.",
                "The ending is what people tend to argue about afterwards.",
            ]),
            music: owned(&[
                "Think about the kind of room where this gets everybody moving.",
                "Picture the moment in a night out when this would come on.",
                "Imagine singing the chorus with a few friends in the car.",
                "Listen in your head for the beat before the vocals even start.",
                "Consider whether this is a song for dancing or for driving.",
                "It is the kind of track people turn up without thinking twice.",
                "Remember the last time you heard it somewhere you did not expect.",
                "Most people know the chorus better than the verses.",
            ]),
        }
    }
}

fn owned(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| (*s).to_owned()).collect()
}

impl FallbackPool {
    /// The configured clues for `kind`.
    #[must_use]
    pub fn clues_for(&self, kind: SubjectKind) -> &[String] {
        match kind {
            SubjectKind::Movie => &self.movie,
            SubjectKind::Music => &self.music,
        }
    }
}

/// Repeats `pool` cyclically, starting at `offset`, until `length` clues are
/// collected. Returns `None` for an empty pool.
#[must_use]
pub fn cycle_to_length(pool: &[String], length: usize, offset: usize) -> Option<Vec<String>> {
    if pool.is_empty() {
        return None;
    }
    let start = offset % pool.len();
    Some(
        pool.iter()
            .cycle()
            .skip(start)
            .take(length)
            .cloned()
            .collect(),
    )
}
