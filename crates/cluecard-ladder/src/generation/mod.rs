//! Drafting clue ladders with an external text-generation service.

pub mod fallback;
pub mod guidance;
pub mod orchestrator;
pub mod parse;
pub mod prompt;

pub use orchestrator::LadderOrchestrator;
