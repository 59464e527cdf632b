//! Clue Card: `PostgreSQL` event store.

pub mod migrations;
pub mod pg_event_repository;
