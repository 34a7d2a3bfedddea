//! Synchronous domain event dispatch.
//!
//! Publishers build an [`Event`] and hand it to an [`EventDispatcher`], which
//! invokes every [`EventHandler`] registered for the event's kind in
//! registration order.

mod dispatcher;
mod envelope;
mod handler;

pub use dispatcher::{DispatchError, EventDispatcher};
pub use envelope::{DomainEvent, Event};
pub use handler::{EventHandler, HandlerError};
