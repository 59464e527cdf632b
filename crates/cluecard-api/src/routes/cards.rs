//! Routes for cards: creation, host view and the viewer's reveal view.

use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use cluecard_ladder::application::command_handlers;
use cluecard_ladder::application::query_handlers::{self, CardView, GuessResult, RevealView};
use cluecard_ladder::domain::commands;
use cluecard_ladder::domain::subject::Subject;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for POST /.
#[derive(Debug, Deserialize)]
pub struct CreateCardRequest {
    /// The card to create.
    pub card_id: Uuid,
    /// What players will guess.
    pub subject: Subject,
    /// Expected number of players.
    pub party_size: i64,
}

/// Response body returned after a card is created.
#[derive(Debug, Serialize)]
pub struct CreateCardResponse {
    /// The created card.
    pub card_id: Uuid,
    /// IDs of the domain events produced and persisted.
    pub event_ids: Vec<Uuid>,
}

/// Raw viewer query. Both fields are parsed leniently.
#[derive(Debug, Default, Deserialize)]
pub struct ViewQuery {
    /// Reveal progress; anything non-numeric counts as 0.
    pub step: Option<String>,
    /// Whether anything should be on screen.
    pub show: Option<String>,
}

/// Request body for POST /{card_id}/guess.
#[derive(Debug, Deserialize)]
pub struct GuessRequest {
    /// The player's answer.
    pub guess: String,
}

fn parse_step(raw: Option<&str>) -> i64 {
    raw.and_then(|s| s.trim().parse().ok()).unwrap_or(0)
}

fn parse_show(raw: Option<&str>) -> bool {
    matches!(
        raw.map(|s| s.trim().to_ascii_lowercase()).as_deref(),
        Some("true" | "1" | "on" | "yes")
    )
}

/// POST /
#[instrument(skip(state, request), fields(card_id = %request.card_id))]
async fn create_card(
    State(state): State<AppState>,
    Json(request): Json<CreateCardRequest>,
) -> Result<Json<CreateCardResponse>, ApiError> {
    let command = commands::CreateCard {
        correlation_id: Uuid::new_v4(),
        card_id: request.card_id,
        subject: request.subject,
        party_size: request.party_size,
    };

    info!(correlation_id = %command.correlation_id, "handling create_card command");

    let stored_events = command_handlers::handle_create_card(
        &command,
        &state.engine,
        state.text_generator.as_ref(),
        state.clock.as_ref(),
        &state.rng,
        &*state.event_repository,
    )
    .await?;

    let event_ids = stored_events.iter().map(|e| e.event_id).collect();

    Ok(Json(CreateCardResponse {
        card_id: command.card_id,
        event_ids,
    }))
}

/// GET /{card_id}
#[instrument(skip(state))]
async fn get_card(
    State(state): State<AppState>,
    Path(card_id): Path<Uuid>,
) -> Result<Json<CardView>, ApiError> {
    let view = query_handlers::get_card_by_id(card_id, &*state.event_repository).await?;
    Ok(Json(view))
}

/// GET /{card_id}/view?step=&show=
#[instrument(skip(state))]
async fn view_card(
    State(state): State<AppState>,
    Path(card_id): Path<Uuid>,
    Query(query): Query<ViewQuery>,
) -> Result<Json<RevealView>, ApiError> {
    let step = parse_step(query.step.as_deref());
    let show = parse_show(query.show.as_deref());
    let view = query_handlers::get_card_view(card_id, step, show, &*state.event_repository).await?;
    Ok(Json(view))
}

/// POST /{card_id}/guess
#[instrument(skip(state, request))]
async fn guess_answer(
    State(state): State<AppState>,
    Path(card_id): Path<Uuid>,
    Json(request): Json<GuessRequest>,
) -> Result<Json<GuessResult>, ApiError> {
    let result =
        query_handlers::check_guess(card_id, &request.guess, &*state.event_repository).await?;
    info!(correct = result.correct, "guess checked");
    Ok(Json(result))
}

/// Returns the router for cards.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_card))
        .route("/{card_id}", get(get_card))
        .route("/{card_id}/view", get(view_card))
        .route("/{card_id}/guess", post(guess_answer))
}
