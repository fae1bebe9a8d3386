//! # Armature Core Container Errors
//!
//! Defines [`Error`], the umbrella error type for container operations.
//!
//! Each subsystem carries its own typed error enum in its `error.rs`; this
//! module wraps them so that callers can propagate a single error type from
//! any container entry point. There is no partial-success mode: the first
//! failing operation aborts the surrounding container phase.
use std::result::Result as StdResult;

use thiserror::Error as ThisError;

use crate::advisor::error::AdvisorError;
use crate::aspect::error::AspectError;
use crate::lifecycle::error::LifecycleError;
use crate::processor::error::ProcessorError;
use crate::registry::error::RegistryError;

/// Umbrella error type for the Armature container.
#[derive(Debug, ThisError)]
pub enum Error {
    /// Definition registry error
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    /// Definition post-processing error
    #[error("Processor error: {0}")]
    Processor(#[from] ProcessorError),

    /// Instance lifecycle error
    #[error("Lifecycle error: {0}")]
    Lifecycle(#[from] LifecycleError),

    /// Advisor model or retrieval error
    #[error("Advisor error: {0}")]
    Advisor(#[from] AdvisorError),

    /// Aspect configuration error
    #[error("Aspect error: {0}")]
    Aspect(#[from] AspectError),

    /// A component was asked to dispatch a method it does not expose.
    #[error("No dispatchable method '{method}'")]
    UnknownMethod { method: String },

    /// A component was retrieved under a concrete type it does not have.
    #[error("Component '{name}' is not of the requested type")]
    TypeMismatch { name: String },

    /// `refresh` was invoked on an already refreshed container.
    #[error("Container has already been refreshed")]
    AlreadyRefreshed,

    /// Generic error with message
    #[error("Error: {0}")]
    Other(String),
}

/// Shorthand for Result with our Error type
pub type Result<T> = StdResult<T, Error>;

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::Other(msg.to_string())
    }
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Other(msg)
    }
}

impl Error {
    /// Walks the source chain to its root and reports whether the failure
    /// bottoms out in a currently-in-creation conflict.
    ///
    /// Advisor retrieval uses this to recover from self-referential advisor
    /// creation; every other caller surfaces the error as-is.
    pub fn is_creation_conflict(&self) -> bool {
        let mut cause: &(dyn std::error::Error + 'static) = self;
        while let Some(next) = cause.source() {
            cause = next;
        }
        cause
            .downcast_ref::<LifecycleError>()
            .is_some_and(|e| matches!(e, LifecycleError::CurrentlyInCreation { .. }))
    }
}
