//! Shared test doubles for the Clue Card engine.

mod clock;
mod repository;
mod rng;
mod textgen;

pub use clock::FixedClock;
pub use repository::{
    EmptyEventRepository, FailingEventRepository, InMemoryEventRepository,
    RecordingEventRepository,
};
pub use rng::{MockRng, SequenceRng};
pub use textgen::{ScriptedReply, ScriptedTextGenerator};
