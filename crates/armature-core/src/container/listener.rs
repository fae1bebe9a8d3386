//! Container events and the listener trait.
//!
//! The container publishes [`ContainerEvent`]s at lifecycle transitions and
//! forwards them synchronously to every registered [`ContainerListener`].
//! Singleton components that expose the listener capability are detected and
//! registered automatically during instance post-processing, including when
//! the detected instance is a proxy over the real listener.
use serde_json::Value;

/// Event published by the container to its registered listeners.
#[derive(Debug, Clone, PartialEq)]
pub enum ContainerEvent {
    /// The container finished refreshing: definitions are post-processed and
    /// non-lazy singletons are instantiated.
    Refreshed,
    /// The container is closing; singletons are about to be destroyed.
    Closed,
    /// Application-defined event with an arbitrary payload.
    Custom { name: String, payload: Value },
}

/// Receiver for container events.
pub trait ContainerListener: Send + Sync {
    fn on_event(&self, event: &ContainerEvent);
}
