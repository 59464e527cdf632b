//! Difficulty and timing policy: party size decides ladder length and the
//! countdown each clue gets.

use serde::{Deserialize, Serialize};

/// Smallest party a card is planned for.
pub const MIN_PARTY_SIZE: u8 = 2;
/// Largest party a card is planned for.
pub const MAX_PARTY_SIZE: u8 = 12;
/// No countdown is ever shorter than this.
pub const COUNTDOWN_FLOOR_SECONDS: u32 = 5;

/// Ladder length and countdown for one card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LadderPlan {
    /// Party size after clamping.
    pub party_size: u8,
    /// Number of clue slots.
    pub ladder_length: usize,
    /// Seconds on the countdown for each clue.
    pub countdown_seconds: u32,
}

/// Tunable base for the countdown step function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingPolicy {
    /// The countdown for a party of three or four.
    pub base_countdown_seconds: u32,
}

impl Default for TimingPolicy {
    fn default() -> Self {
        Self {
            base_countdown_seconds: 8,
        }
    }
}

/// Clamps a requested party size into `[MIN_PARTY_SIZE, MAX_PARTY_SIZE]`.
#[must_use]
pub fn clamp_party_size(party_size: i64) -> u8 {
    let clamped = party_size.clamp(i64::from(MIN_PARTY_SIZE), i64::from(MAX_PARTY_SIZE));
    u8::try_from(clamped).unwrap_or(MAX_PARTY_SIZE)
}

impl TimingPolicy {
    /// Plans a card for `party_size` players.
    ///
    /// One clue slot per expected player. Larger groups get a little more
    /// time to deliberate, small groups a little less.
    #[must_use]
    pub fn plan(&self, party_size: i64) -> LadderPlan {
        let party_size = clamp_party_size(party_size);
        let base = self.base_countdown_seconds;
        let countdown = match party_size {
            ..=2 => base.saturating_sub(1),
            3..=4 => base,
            5..=6 => base.saturating_add(1),
            _ => base.saturating_add(2),
        };

        LadderPlan {
            party_size,
            ladder_length: usize::from(party_size),
            countdown_seconds: countdown.max(COUNTDOWN_FLOOR_SECONDS),
        }
    }
}
