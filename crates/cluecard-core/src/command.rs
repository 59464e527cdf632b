//! Command abstractions.

use uuid::Uuid;

/// A request to change the state of one aggregate.
pub trait Command: Send + Sync + std::fmt::Debug {
    /// Stable name used in log fields.
    fn command_type(&self) -> &'static str;

    /// The aggregate this command targets.
    fn aggregate_id(&self) -> Uuid;

    /// Correlation ID carried into every event the command produces.
    fn correlation_id(&self) -> Uuid;
}
