//! Domain model for the clue ladder context.

pub mod aggregates;
pub mod commands;
pub mod escalation;
pub mod events;
pub mod ladder;
pub mod policy;
pub mod reveal;
pub mod subject;
pub mod validation;
