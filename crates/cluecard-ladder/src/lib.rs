//! Clue Card: clue ladder bounded context.
//!
//! Turns a subject (a film or a song) into a ladder of progressively more
//! revealing clues, validates every clue against leak and style rules, and
//! decides what a viewer sees for a given reveal progress.

pub mod application;
pub mod config;
pub mod domain;
pub mod generation;
