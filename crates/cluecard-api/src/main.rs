//! Clue Card API server entry point.

use std::sync::{Arc, Mutex};

use cluecard_api::config::ServerConfig;
use cluecard_api::error::AppError;
use cluecard_api::state::AppState;
use cluecard_api::{build_router, telemetry};
use cluecard_core::clock::{Clock, SystemClock};
use cluecard_core::rng::{DeterministicRng, SystemRng};
use cluecard_event_store::migrations::MIGRATOR;
use cluecard_event_store::pg_event_repository::PgEventRepository;
use cluecard_textgen::HttpTextGenerator;
use sqlx::postgres::PgPoolOptions;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let telemetry = telemetry::init()?;

    tracing::info!("Starting Clue Card API server");

    let config = ServerConfig::from_env()?;

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await?;
    MIGRATOR.run(&pool).await?;

    let text_generator = HttpTextGenerator::new(config.textgen.clone())
        .map_err(|e| AppError::Config(e.to_string()))?;
    let generation_configured = text_generator.is_configured();

    let clock: Arc<dyn Clock + Send + Sync> = Arc::new(SystemClock);
    let rng: Arc<Mutex<dyn DeterministicRng + Send>> =
        Arc::new(Mutex::new(SystemRng::from_entropy()));
    let app_state = AppState::new(
        clock,
        rng,
        Arc::new(PgEventRepository::new(pool)),
        Arc::new(text_generator),
        Arc::new(config.engine.clone()),
    )
    .with_generation_configured(generation_configured);

    let app = build_router(app_state);

    tracing::info!("Listening on {}", config.addr);
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;

    telemetry.shutdown();
    Ok(())
}
