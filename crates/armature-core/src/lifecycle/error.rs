//! # Armature Core Lifecycle Errors
//!
//! Errors raised while creating, initializing, or destroying component
//! instances. `CurrentlyInCreation` doubles as the signal advisor retrieval
//! recovers from when it walks a creation failure back to its root cause.
use crate::container::error::Error;

#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error("Component '{name}' is currently in creation (circular reference?)")]
    CurrentlyInCreation { name: String },

    #[error("Failed to create component '{name}'")]
    CreationFailure {
        name: String,
        #[source]
        source: Box<Error>,
    },

    #[error("Init method '{method}' failed on component '{name}'")]
    InitMethodFailed {
        name: String,
        method: String,
        #[source]
        source: Box<Error>,
    },
}
