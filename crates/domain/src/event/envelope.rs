use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

/// Trait for domain event payloads.
///
/// Domain events represent facts that have happened in the domain.
/// They are immutable and should be named in past tense.
pub trait DomainEvent: Serialize + DeserializeOwned + Send + Sync + Clone {
    /// Returns the event type name.
    ///
    /// This is the key the dispatcher uses to find handlers.
    fn event_type(&self) -> &'static str;
}

/// An occurrence in the domain together with the time it happened.
///
/// Fields are private so an event cannot change after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event<E> {
    occurred_at: DateTime<Utc>,
    payload: E,
}

impl<E: DomainEvent> Event<E> {
    /// Creates an event stamped with the current time.
    pub fn new(payload: E) -> Self {
        Self::at(payload, Utc::now())
    }

    /// Creates an event with an explicit timestamp.
    pub fn at(payload: E, occurred_at: DateTime<Utc>) -> Self {
        Self {
            occurred_at,
            payload,
        }
    }

    /// Returns the dispatch key of this event (e.g. "CustomerCreated").
    pub fn kind(&self) -> &'static str {
        self.payload.event_type()
    }

    /// Returns when the event occurred.
    pub fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }

    /// Returns the typed payload.
    pub fn payload(&self) -> &E {
        &self.payload
    }

    /// Consumes the event, returning its payload.
    pub fn into_payload(self) -> E {
        self.payload
    }
}
