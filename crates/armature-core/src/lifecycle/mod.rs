//! # Armature Core Lifecycle
//!
//! Per-instance lifecycle machinery: the hook traits, the registration
//! protocol that installs them in canonical order, and the coordinator
//! that drives each component through creation and destruction.
//!
//! ## Key Submodules and Responsibilities:
//!
//! - **[`traits`]**: The [`InstancePostProcessor`] and
//!   [`MergedDefinitionPostProcessor`] hook traits.
//! - **[`registrar`]**: Ordered installation of discovered processors, with
//!   the synthetic [`ProcessorCountChecker`] first and
//!   [`ListenerDetector`] last.
//! - **[`coordinator`]**: The create/initialize/destroy state machine.
//! - **[`error`]**: Lifecycle errors ([`LifecycleError`]), including the
//!   in-creation conflict advisor retrieval recovers from.

pub mod coordinator;
pub mod error;
pub mod registrar;
pub mod traits;

pub use error::LifecycleError;
pub use registrar::{ListenerDetector, ProcessorCountChecker};
pub use traits::{InstancePostProcessor, MergedDefinitionPostProcessor};

// Test module declaration
#[cfg(test)]
mod tests;
