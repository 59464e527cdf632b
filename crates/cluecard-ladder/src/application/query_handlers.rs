//! Query handlers for the clue ladder context.
//!
//! The host view exposes the whole card. The viewer view runs the reveal
//! protocol over the stored ladder and returns only what is on screen for
//! the given `(step, show)` pair. Guesses are scored against the stored
//! answer without exposing it.

use cluecard_core::aggregate::AggregateRoot;
use cluecard_core::error::DomainError;
use cluecard_core::repository::EventRepository;
use serde::Serialize;
use uuid::Uuid;

use crate::application::command_handlers;
use crate::domain::aggregates::Card;
use crate::domain::ladder::LadderSource;
use crate::domain::reveal::{self, RevealPhase};
use crate::domain::subject::Subject;

/// Read-only host view of a card.
#[derive(Debug, Serialize)]
pub struct CardView {
    /// The card identifier.
    pub card_id: Uuid,
    /// Subject, including the answer.
    pub subject: Subject,
    /// Party size after clamping.
    pub party_size: u8,
    /// The ladder, vaguest clue first.
    pub clue_ladder: Vec<String>,
    /// Countdown per clue, in seconds.
    pub countdown_seconds: u32,
    /// Whether the ladder was generated or came from the fallback pool.
    pub ladder_source: LadderSource,
    /// Current version (event count).
    pub version: i64,
}

/// What a viewer sees at one `(step, show)` pair.
#[derive(Debug, Serialize)]
pub struct RevealView {
    /// The card identifier.
    pub card_id: Uuid,
    /// Hidden, a clue, or the answer.
    #[serde(flatten)]
    pub phase: RevealPhase,
    /// The visible clue, if any.
    pub clue: Option<String>,
    /// The answer, once revealed.
    pub answer: Option<String>,
    /// The step after clamping.
    pub step: usize,
    /// Number of clues on the card.
    pub ladder_length: usize,
    /// Countdown per clue, in seconds.
    pub countdown_seconds: u32,
}

/// Outcome of checking one guess against a card's answer.
#[derive(Debug, Serialize)]
pub struct GuessResult {
    /// The card identifier.
    pub card_id: Uuid,
    /// Whether the guess equals the answer, ignoring case and surrounding
    /// whitespace.
    pub correct: bool,
}

async fn load_card(card_id: Uuid, repo: &dyn EventRepository) -> Result<Card, DomainError> {
    let stored_events = repo.load_events(card_id).await?;
    if stored_events.is_empty() {
        return Err(DomainError::AggregateNotFound(card_id));
    }
    command_handlers::reconstitute(card_id, &stored_events)
}

fn created_parts(card: &Card) -> Result<(&Subject, LadderSource), DomainError> {
    match (card.subject(), card.ladder_source()) {
        (Some(subject), Some(source)) => Ok((subject, source)),
        _ => Err(DomainError::Infrastructure(format!(
            "card {} has events but no card.created",
            card.id
        ))),
    }
}

/// Retrieves the host view of a card.
///
/// # Errors
///
/// Returns `DomainError::AggregateNotFound` if no events exist for the ID.
/// Returns `DomainError::Infrastructure` if event deserialization fails.
pub async fn get_card_by_id(
    card_id: Uuid,
    repo: &dyn EventRepository,
) -> Result<CardView, DomainError> {
    let card = load_card(card_id, repo).await?;
    let (subject, ladder_source) = created_parts(&card)?;
    Ok(CardView {
        card_id,
        subject: subject.clone(),
        party_size: card.party_size(),
        clue_ladder: card.clue_ladder().to_vec(),
        countdown_seconds: card.countdown_seconds(),
        ladder_source,
        version: card.version(),
    })
}

/// Resolves the viewer view of a card at `(step, show)`.
///
/// # Errors
///
/// Returns `DomainError::AggregateNotFound` if no events exist for the ID.
/// Returns `DomainError::Infrastructure` if event deserialization fails.
pub async fn get_card_view(
    card_id: Uuid,
    step: i64,
    show: bool,
    repo: &dyn EventRepository,
) -> Result<RevealView, DomainError> {
    let card = load_card(card_id, repo).await?;
    let (subject, _) = created_parts(&card)?;
    let ladder = card.clue_ladder();
    let view = reveal::resolve_view(ladder, step, show);

    Ok(RevealView {
        card_id,
        phase: view.phase(),
        clue: view.visible_clue_index.map(|index| ladder[index].clone()),
        answer: view.reveal_answer.then(|| subject.answer_text.clone()),
        step: reveal::clamp_step(step),
        ladder_length: ladder.len(),
        countdown_seconds: card.countdown_seconds(),
    })
}

/// Scores `guess` against the card's answer without revealing it.
///
/// # Errors
///
/// Returns `DomainError::AggregateNotFound` if no events exist for the ID.
/// Returns `DomainError::Infrastructure` if event deserialization fails.
pub async fn check_guess(
    card_id: Uuid,
    guess: &str,
    repo: &dyn EventRepository,
) -> Result<GuessResult, DomainError> {
    let card = load_card(card_id, repo).await?;
    let (subject, _) = created_parts(&card)?;
    Ok(GuessResult {
        card_id,
        correct: subject.matches_guess(guess),
    })
}
