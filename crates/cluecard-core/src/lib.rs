//! Clue Card Core: shared domain abstractions.
//!
//! This crate defines the traits and types the clue-ladder context and its
//! infrastructure adapters depend on. It contains no infrastructure code.

pub mod aggregate;
pub mod clock;
pub mod command;
pub mod error;
pub mod event;
pub mod repository;
pub mod rng;
pub mod textgen;
