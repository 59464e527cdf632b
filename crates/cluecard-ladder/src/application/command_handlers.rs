//! Command handlers for the clue ladder context.
//!
//! A card is written exactly once: validate the subject, plan the ladder,
//! drive the generator until a ladder is accepted, then persist a single
//! `card.created` event.

use std::sync::Mutex;

use cluecard_core::aggregate::AggregateRoot;
use cluecard_core::clock::Clock;
use cluecard_core::command::Command;
use cluecard_core::error::DomainError;
use cluecard_core::event::{DomainEvent, EventMetadata};
use cluecard_core::repository::{EventRepository, StoredEvent};
use cluecard_core::rng::DeterministicRng;
use cluecard_core::textgen::TextGenerator;
use tracing::info;
use uuid::Uuid;

use crate::config::{EngineConfig, ExhaustionPolicy};
use crate::domain::aggregates::Card;
use crate::domain::commands::CreateCard;
use crate::domain::events::{CardEvent, CardEventKind};
use crate::generation::LadderOrchestrator;

/// Reconstitutes a `Card` from stored events.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if event deserialization fails.
pub(crate) fn reconstitute(
    card_id: Uuid,
    existing_events: &[StoredEvent],
) -> Result<Card, DomainError> {
    let mut card = Card::new(card_id);
    for stored in existing_events {
        let kind: CardEventKind = serde_json::from_value(stored.payload.clone()).map_err(|e| {
            DomainError::Infrastructure(format!("event deserialization failed: {e}"))
        })?;
        let event = CardEvent {
            metadata: EventMetadata::from_stored(stored),
            kind,
        };
        card.apply(&event);
    }
    Ok(card)
}

/// Handles the `CreateCard` command.
///
/// The RNG is locked only to pick the fallback-pool offset, never across an
/// await.
///
/// # Errors
///
/// Returns `DomainError::Validation` for a blank answer,
/// `DomainError::ConcurrencyConflict` if the card already exists,
/// `DomainError::Configuration` if the generator has no credentials,
/// `DomainError::GenerationExhausted` if no ladder could be produced, and
/// `DomainError::Infrastructure` for storage failures.
pub async fn handle_create_card(
    command: &CreateCard,
    config: &EngineConfig,
    generator: &dyn TextGenerator,
    clock: &dyn Clock,
    rng: &Mutex<dyn DeterministicRng + Send>,
    repo: &dyn EventRepository,
) -> Result<Vec<StoredEvent>, DomainError> {
    command.subject.validate()?;

    let existing_events = repo.load_events(command.card_id).await?;
    if let Some(last) = existing_events.last() {
        return Err(DomainError::ConcurrencyConflict {
            aggregate_id: command.card_id,
            expected: 0,
            actual: last.sequence_number,
        });
    }
    let mut card = reconstitute(command.card_id, &existing_events)?;

    let plan = config.timing.plan(command.party_size);

    let fallback_offset = if config.generation.on_exhaustion == ExhaustionPolicy::Fallback {
        let pool_len = config.fallback.clues_for(command.subject.kind).len();
        let max = u32::try_from(pool_len.saturating_sub(1)).unwrap_or(u32::MAX);
        let mut rng_guard = rng
            .lock()
            .map_err(|e| DomainError::Infrastructure(format!("RNG mutex poisoned: {e}")))?;
        rng_guard.next_u32_range(0, max)
    } else {
        0
    };

    let ladder = LadderOrchestrator::new(generator, config)
        .generate_ladder(&command.subject, plan.ladder_length, fallback_offset)
        .await?;

    info!(
        command_type = command.command_type(),
        card_id = %command.aggregate_id(),
        kind = %command.subject.kind,
        ladder_length = plan.ladder_length,
        countdown_seconds = plan.countdown_seconds,
        source = ?ladder.source,
        "card created"
    );

    card.create(
        command.subject.clone(),
        plan,
        ladder,
        command.correlation_id,
        clock,
    )?;

    let stored_events: Vec<StoredEvent> = card
        .uncommitted_events()
        .iter()
        .map(DomainEvent::to_stored)
        .collect();

    repo.append_events(command.card_id, card.version(), &stored_events)
        .await?;

    Ok(stored_events)
}
