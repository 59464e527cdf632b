//! Progressive reveal protocol.
//!
//! What a viewer sees is derived from scratch on every request from the
//! persisted ladder and the client's `(step, show)` pair. Nothing is
//! remembered between calls and out-of-range input is clamped, never
//! rejected.

use serde::Serialize;

/// Upper bound applied to incoming `step` values.
pub const MAX_STEP: i64 = 99;

/// What is currently visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ViewState {
    /// 0-based index of the visible clue, if any.
    pub visible_clue_index: Option<usize>,
    /// Whether the answer is visible.
    pub reveal_answer: bool,
}

/// The three states of the reveal state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum RevealPhase {
    /// Waiting between reveals, or out of range.
    Hidden,
    /// One clue is on screen.
    ShowingClue {
        /// 0-based clue index.
        index: usize,
    },
    /// The answer is on screen.
    ShowingAnswer,
}

impl ViewState {
    /// Nothing visible.
    #[must_use]
    pub fn hidden() -> Self {
        Self {
            visible_clue_index: None,
            reveal_answer: false,
        }
    }

    /// The state-machine view of this state.
    #[must_use]
    pub fn phase(&self) -> RevealPhase {
        match (self.visible_clue_index, self.reveal_answer) {
            (_, true) => RevealPhase::ShowingAnswer,
            (Some(index), false) => RevealPhase::ShowingClue { index },
            (None, false) => RevealPhase::Hidden,
        }
    }
}

/// Clamps a client-supplied step into `[0, MAX_STEP]`.
#[must_use]
pub fn clamp_step(step: i64) -> usize {
    usize::try_from(step.clamp(0, MAX_STEP)).unwrap_or(0)
}

/// Resolves what to display for `ladder` at `(step, show)`.
#[must_use]
pub fn resolve_view<T>(ladder: &[T], step: i64, show: bool) -> ViewState {
    if !show {
        return ViewState::hidden();
    }

    let step = clamp_step(step);
    let length = ladder.len();

    if (1..=length).contains(&step) {
        ViewState {
            visible_clue_index: Some(step - 1),
            reveal_answer: false,
        }
    } else if step == length + 1 {
        ViewState {
            visible_clue_index: None,
            reveal_answer: true,
        }
    } else {
        ViewState::hidden()
    }
}
