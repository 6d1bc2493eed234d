//! Error types for the event registry and observable properties.

use thiserror::Error;

use super::handler::HandlerId;

/// Errors raised by `Observable::off` when asked to remove something that
/// isn't there.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EventError {
    /// No entry exists for the named event.
    #[error("Event {event} wasn't found")]
    EventNotFound { event: String },

    /// The handler is not registered under the named event.
    /// `handler` is the handler's display name, `id` its identity.
    #[error("Handler {handler} wasn't found for event {event}")]
    HandlerNotFound {
        event: String,
        handler: String,
        id: HandlerId,
    },
}

impl EventError {
    /// The event name this error refers to
    pub fn event(&self) -> &str {
        match self {
            EventError::EventNotFound { event } | EventError::HandlerNotFound { event, .. } => event,
        }
    }
}

/// Errors raised by `ObservableProperty` accessors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PropertyError {
    /// Read attempted on a property without a getter.
    #[error("attribute not readable")]
    NotReadable,

    /// Write attempted on a property without a setter.
    #[error("attribute not writable")]
    NotWritable,

    /// Delete attempted on a property without a deleter.
    #[error("attribute not deletable")]
    NotDeletable,

    /// No registry could be located for emitting events.
    #[error(
        "this ObservableProperty is no member of an Observable object; \
         specify where to find the Observable with a locator when building the property"
    )]
    NoObservable,
}
