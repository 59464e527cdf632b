//! Domain events for the clue ladder context.

use cluecard_core::event::{DomainEvent, EventMetadata};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ladder::LadderSource;
use super::subject::Subject;

/// Emitted once, when a card and its ladder are written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardCreated {
    /// The card identifier.
    pub card_id: Uuid,
    /// The subject to guess.
    pub subject: Subject,
    /// Party size after clamping.
    pub party_size: u8,
    /// The accepted ladder, vaguest clue first.
    pub clue_ladder: Vec<String>,
    /// Countdown per clue, in seconds.
    pub countdown_seconds: u32,
    /// Whether the ladder was generated or came from the fallback pool.
    pub ladder_source: LadderSource,
}

/// Event payload variants for the clue ladder context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CardEventKind {
    /// A card was created.
    CardCreated(CardCreated),
}

/// Domain event envelope for the clue ladder context.
#[derive(Debug, Clone)]
pub struct CardEvent {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// Event-specific payload.
    pub kind: CardEventKind,
}

impl DomainEvent for CardEvent {
    fn event_type(&self) -> &'static str {
        match &self.kind {
            CardEventKind::CardCreated(_) => "card.created",
        }
    }

    fn to_payload(&self) -> serde_json::Value {
        // Serialization of derived Serialize types to Value is infallible.
        serde_json::to_value(&self.kind).expect("CardEventKind serialization is infallible")
    }

    fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }
}
