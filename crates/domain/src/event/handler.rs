use thiserror::Error;

use super::{DomainEvent, Event};

/// Errors a handler can report back to the dispatcher.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// The handler received an event kind it was not written for.
    ///
    /// This is a wiring mistake (registered under the wrong kind), not a
    /// recoverable condition.
    #[error("{handler} cannot handle {event_type} events")]
    UnexpectedEvent {
        handler: &'static str,
        event_type: &'static str,
    },

    /// The handler's side effect failed.
    #[error("{handler} failed: {reason}")]
    Failed {
        handler: &'static str,
        reason: String,
    },
}

impl HandlerError {
    /// Creates an [`HandlerError::UnexpectedEvent`] for the given event.
    pub fn unexpected<E: DomainEvent>(handler: &'static str, event: &Event<E>) -> Self {
        Self::UnexpectedEvent {
            handler,
            event_type: event.kind(),
        }
    }

    /// Creates an [`HandlerError::Failed`] with a reason.
    pub fn failed(handler: &'static str, reason: impl Into<String>) -> Self {
        Self::Failed {
            handler,
            reason: reason.into(),
        }
    }
}

/// A unit of reaction to domain events.
///
/// Handlers receive the event by reference for the duration of the call and
/// must not retain it. An error aborts the remaining handlers of the same
/// notification.
pub trait EventHandler<E: DomainEvent>: Send + Sync {
    /// Returns the name used in logs and errors.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Reacts to a single event.
    fn handle(&self, event: &Event<E>) -> Result<(), HandlerError>;
}
