//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use cluecard_core::clock::Clock;
use cluecard_core::rng::DeterministicRng;
use cluecard_event_store::pg_event_repository::PgEventRepository;
use cluecard_ladder::config::{EngineConfig, GenerationSettings};
use cluecard_test_support::{FixedClock, ScriptedReply, ScriptedTextGenerator, SequenceRng};
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use cluecard_api::build_router;
use cluecard_api::state::AppState;

/// Clues every scripted generation call returns.
pub const CLUES: [&str; 3] = [
    "You will want the lights off and a blanket for this one.",
    "Most of it happens somewhere you could never visit yourself.",
    "The lead spends a lot of time questioning what is real.",
];

/// Build the full app router with a real `PgEventRepository`, a scripted
/// generator that always answers with [`CLUES`], and deterministic Clock/RNG.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with_generator(
        pool,
        ScriptedTextGenerator::repeating(ScriptedReply::clues(&CLUES)),
    )
}

/// Build the full app router with a custom generator.
pub fn build_test_app_with_generator(pool: PgPool, generator: ScriptedTextGenerator) -> Router {
    let clock: Arc<dyn Clock + Send + Sync> = Arc::new(FixedClock::reference());
    let rng: Arc<Mutex<dyn DeterministicRng + Send>> =
        Arc::new(Mutex::new(SequenceRng::new(vec![])));
    let engine = EngineConfig {
        generation: GenerationSettings {
            backoff_ms: 0,
            ..GenerationSettings::default()
        },
        ..EngineConfig::default()
    };
    let app_state = AppState::new(
        clock,
        rng,
        Arc::new(PgEventRepository::new(pool)),
        Arc::new(generator),
        Arc::new(engine),
    );

    build_router(app_state)
}

/// JSON body for creating a movie card.
pub fn movie_card(card_id: uuid::Uuid, party_size: i64) -> serde_json::Value {
    serde_json::json!({
        "card_id": card_id,
        "subject": {
            "kind": "movie",
            "answer_text": "The Matrix",
            "context_facts": { "year": "1999", "director": "The Wachowskis" }
        },
        "party_size": party_size
    })
}

/// Send a POST request with a JSON body and return the response.
pub async fn post_json(
    app: Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

/// Send a GET request and return the response.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}
