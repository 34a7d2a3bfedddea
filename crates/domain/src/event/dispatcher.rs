use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

use super::{DomainEvent, Event, EventHandler, HandlerError};

/// Error returned by [`EventDispatcher::notify`] when a handler fails.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// A handler failed; handlers registered after it were not invoked.
    #[error("handler #{position} for {event_type} failed: {source}")]
    Handler {
        event_type: &'static str,
        position: usize,
        source: HandlerError,
    },
}

/// Registry of event handlers keyed by event kind.
///
/// The dispatcher is an ordinary value: construct one where dispatch is needed
/// and pass it by reference to publishers. Registration requires `&mut self`,
/// notification only `&self`, so notifying can never change the registry.
pub struct EventDispatcher<E: DomainEvent> {
    handlers: HashMap<String, Vec<Arc<dyn EventHandler<E>>>>,
}

impl<E: DomainEvent> EventDispatcher<E> {
    /// Creates a dispatcher with no handlers.
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Appends a handler to the sequence for `kind`.
    ///
    /// Registering the same handler twice makes it run twice per notification.
    pub fn register(&mut self, kind: impl Into<String>, handler: Arc<dyn EventHandler<E>>) {
        let kind = kind.into();
        tracing::debug!(%kind, handler = handler.name(), "registering event handler");
        self.handlers.entry(kind).or_default().push(handler);
    }

    /// Removes the first registration of `handler` under `kind`.
    ///
    /// Handlers are matched by identity of the shared pointer. Unknown kinds
    /// and handlers are ignored.
    pub fn unregister<H>(&mut self, kind: &str, handler: &Arc<H>)
    where
        H: EventHandler<E> + ?Sized,
    {
        let Some(registered) = self.handlers.get_mut(kind) else {
            return;
        };

        if let Some(index) = registered
            .iter()
            .position(|candidate| std::ptr::addr_eq(Arc::as_ptr(candidate), Arc::as_ptr(handler)))
        {
            registered.remove(index);
        }

        if registered.is_empty() {
            self.handlers.remove(kind);
        }
    }

    /// Removes every handler for every kind.
    pub fn unregister_all(&mut self) {
        self.handlers.clear();
    }

    /// Returns the handlers currently registered for `kind`, in order.
    pub fn handlers_for(&self, kind: &str) -> &[Arc<dyn EventHandler<E>>] {
        self.handlers.get(kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Returns true if at least one handler is registered for `kind`.
    pub fn has_handlers(&self, kind: &str) -> bool {
        !self.handlers_for(kind).is_empty()
    }

    /// Returns the number of handlers registered for `kind`.
    pub fn handler_count(&self, kind: &str) -> usize {
        self.handlers_for(kind).len()
    }

    /// Returns true if no handlers are registered at all.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Invokes every handler registered for the event's kind, in order.
    ///
    /// Runs on the calling thread and returns once all handlers have run. The
    /// first failing handler stops the notification and its error is returned.
    #[tracing::instrument(skip(self, event), fields(event_type = event.kind()))]
    pub fn notify(&self, event: &Event<E>) -> Result<(), DispatchError> {
        let Some(handlers) = self.handlers.get(event.kind()) else {
            tracing::trace!("no handlers registered");
            return Ok(());
        };

        metrics::counter!("domain_events_dispatched").increment(1);

        for (position, handler) in handlers.iter().enumerate() {
            if let Err(source) = handler.handle(event) {
                tracing::warn!(
                    position,
                    handler = handler.name(),
                    error = %source,
                    "event handler failed, skipping remaining handlers"
                );
                return Err(DispatchError::Handler {
                    event_type: event.kind(),
                    position,
                    source,
                });
            }
        }

        Ok(())
    }
}

impl<E: DomainEvent> Default for EventDispatcher<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: DomainEvent> std::fmt::Debug for EventDispatcher<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for (kind, handlers) in &self.handlers {
            let names: Vec<_> = handlers.iter().map(|h| h.name()).collect();
            map.entry(kind, &names);
        }
        map.finish()
    }
}
