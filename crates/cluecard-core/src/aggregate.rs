//! Aggregate root abstraction.

use uuid::Uuid;

use crate::event::DomainEvent;

/// An aggregate rebuilt by replaying its event stream.
pub trait AggregateRoot: Send + Sync {
    /// The event type this aggregate produces and consumes.
    type Event: DomainEvent;

    /// Returns the aggregate identifier.
    fn aggregate_id(&self) -> Uuid;

    /// Returns the number of persisted events applied so far.
    fn version(&self) -> i64;

    /// Applies one event during reconstitution.
    fn apply(&mut self, event: &Self::Event);

    /// Events produced by command handling that are not yet persisted.
    fn uncommitted_events(&self) -> &[Self::Event];

    /// Drops uncommitted events once they have been persisted.
    fn clear_uncommitted_events(&mut self);
}
