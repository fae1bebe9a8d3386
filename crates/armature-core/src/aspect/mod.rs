//! # Armature Core Aspect Subsystem
//!
//! Everything between a declared aspect and the advisors the auto-proxy
//! layer consumes.
//!
//! ## Key Submodules and Responsibilities:
//!
//! - **[`introspect`]**: The [`AspectIntrospector`] seam resolving declared
//!   type names to aspect declarations, and the programmatic
//!   [`StaticIntrospector`].
//! - **[`metadata`]**: Immutable per-aspect metadata, instantiation models,
//!   and advice-kind precedence.
//! - **[`instance`]**: [`AspectInstanceFactory`] implementations, including
//!   the create-once shared decorator.
//! - **[`builder`]**: [`AspectAdvisorFactory`], which turns one aspect's
//!   declarations into sorted advisors.
//! - **[`scanner`]**: [`AspectAdvisorsBuilder`], the cached container-wide
//!   aspect scan.
//! - **[`error`]**: Aspect configuration errors ([`AspectError`]).
//!
//! Aspects are ordinary container components; this subsystem only reads
//! their declarations and resolves their instances through the container
//! when advice fires.

pub mod builder;
pub mod error;
pub mod instance;
pub mod introspect;
pub mod metadata;
pub mod scanner;

pub use builder::{AspectAdvisorFactory, InstantiationInterceptor};
pub use error::AspectError;
pub use instance::{
    AspectInstanceFactory, ContainerAspectInstanceFactory, PrototypeAspectInstanceFactory,
    SharedAspectInstanceFactory,
};
pub use introspect::{
    AdviceBody, AdviceMethod, AspectIntrospection, AspectIntrospector, IntroductionField,
    StaticIntrospector,
};
pub use metadata::{AdviceKind, AspectMetadata, PerClauseKind};
pub use scanner::AspectAdvisorsBuilder;

// Test module declaration
#[cfg(test)]
mod tests;
