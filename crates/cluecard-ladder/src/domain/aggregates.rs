//! Aggregate root for a card.

use cluecard_core::aggregate::AggregateRoot;
use cluecard_core::clock::Clock;
use cluecard_core::error::DomainError;
use cluecard_core::event::EventMetadata;
use uuid::Uuid;

use super::events::{CardCreated, CardEvent, CardEventKind};
use super::ladder::{ClueLadder, LadderSource};
use super::policy::LadderPlan;
use super::subject::Subject;

/// A card: one subject with its ladder and countdown.
///
/// The ladder is written by exactly one `card.created` event and is
/// read-only afterwards.
#[derive(Debug)]
pub struct Card {
    /// Aggregate identifier.
    pub id: Uuid,
    /// Current version (event count).
    pub(crate) version: i64,
    pub(crate) subject: Option<Subject>,
    pub(crate) party_size: u8,
    pub(crate) clue_ladder: Vec<String>,
    pub(crate) countdown_seconds: u32,
    pub(crate) ladder_source: Option<LadderSource>,
    /// Uncommitted events pending persistence.
    uncommitted_events: Vec<CardEvent>,
}

impl Card {
    /// Creates an empty, not-yet-created card.
    #[must_use]
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            version: 0,
            subject: None,
            party_size: 0,
            clue_ladder: Vec::new(),
            countdown_seconds: 0,
            ladder_source: None,
            uncommitted_events: Vec::new(),
        }
    }

    /// Whether the card has been created (persisted or pending).
    #[must_use]
    pub fn is_created(&self) -> bool {
        self.subject.is_some() || !self.uncommitted_events.is_empty()
    }

    /// The subject, once created.
    #[must_use]
    pub fn subject(&self) -> Option<&Subject> {
        self.subject.as_ref()
    }

    /// The ladder, vaguest clue first.
    #[must_use]
    pub fn clue_ladder(&self) -> &[String] {
        &self.clue_ladder
    }

    /// Countdown per clue, in seconds.
    #[must_use]
    pub fn countdown_seconds(&self) -> u32 {
        self.countdown_seconds
    }

    /// Party size the card was planned for.
    #[must_use]
    pub fn party_size(&self) -> u8 {
        self.party_size
    }

    /// Provenance of the ladder, once created.
    #[must_use]
    pub fn ladder_source(&self) -> Option<LadderSource> {
        self.ladder_source
    }

    #[allow(clippy::cast_possible_wrap)]
    fn next_sequence_number(&self) -> i64 {
        self.version + self.uncommitted_events.len() as i64 + 1
    }

    /// Writes the card, producing a `CardCreated` event.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the card already exists or the
    /// ladder length does not match the plan.
    pub fn create(
        &mut self,
        subject: Subject,
        plan: LadderPlan,
        ladder: ClueLadder,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        if self.is_created() {
            return Err(DomainError::Validation(format!(
                "card {} already has a clue ladder",
                self.id
            )));
        }
        if ladder.len() != plan.ladder_length {
            return Err(DomainError::Validation(format!(
                "ladder has {} clues, plan requires {}",
                ladder.len(),
                plan.ladder_length
            )));
        }

        let event = CardEvent {
            metadata: EventMetadata {
                event_id: Uuid::new_v4(),
                event_type: "card.created".to_owned(),
                aggregate_id: self.id,
                sequence_number: self.next_sequence_number(),
                correlation_id,
                causation_id: correlation_id,
                occurred_at: clock.now(),
            },
            kind: CardEventKind::CardCreated(CardCreated {
                card_id: self.id,
                subject,
                party_size: plan.party_size,
                clue_ladder: ladder.clues,
                countdown_seconds: plan.countdown_seconds,
                ladder_source: ladder.source,
            }),
        };

        self.uncommitted_events.push(event);
        Ok(())
    }
}

impl AggregateRoot for Card {
    type Event = CardEvent;

    fn aggregate_id(&self) -> Uuid {
        self.id
    }

    fn version(&self) -> i64 {
        self.version
    }

    fn apply(&mut self, event: &Self::Event) {
        match &event.kind {
            CardEventKind::CardCreated(payload) => {
                self.subject = Some(payload.subject.clone());
                self.party_size = payload.party_size;
                self.clue_ladder.clone_from(&payload.clue_ladder);
                self.countdown_seconds = payload.countdown_seconds;
                self.ladder_source = Some(payload.ladder_source);
            }
        }
        self.version += 1;
    }

    fn uncommitted_events(&self) -> &[Self::Event] {
        &self.uncommitted_events
    }

    fn clear_uncommitted_events(&mut self) {
        self.uncommitted_events.clear();
    }
}
