//! Commands for the clue ladder context.

use cluecard_core::command::Command;
use uuid::Uuid;

use super::subject::Subject;

/// Commit a subject to a new card and draft its ladder.
#[derive(Debug, Clone)]
pub struct CreateCard {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The card to create.
    pub card_id: Uuid,
    /// What players will guess.
    pub subject: Subject,
    /// Expected number of players; clamped by the timing policy.
    pub party_size: i64,
}

impl Command for CreateCard {
    fn command_type(&self) -> &'static str {
        "card.create"
    }

    fn aggregate_id(&self) -> Uuid {
        self.card_id
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}
