//! # Armature Core Advisor Model
//!
//! Advisors pair advice with the pointcut that scopes it. They are the
//! currency between the aspect subsystem, plain advisor retrieval, and the
//! auto-proxy layer.
//!
//! ## Key Submodules and Responsibilities:
//!
//! - **[`pointcut`]**: The [`Pointcut`] trait and the `execution(...)`
//!   expression grammar.
//! - **[`invoke`]**: The [`JoinPoint`]/[`Invocation`] proceed chain, the
//!   [`Interceptor`] trait, and the per-kind advice adapters.
//! - **[`retrieval`]**: Discovery of components declared as advisors, with
//!   name caching and in-creation recovery.
//! - **[`error`]**: Advisor-specific error types ([`AdvisorError`](error::AdvisorError)).
//!
//! An [`Advisor`] is immutable after construction and shared as
//! `Arc<Advisor>` between caches, retrieval results, and proxies.
use std::fmt;
use std::sync::Arc;

use crate::container::component::Component;
use crate::container::error::Result;

pub mod error;
pub mod invoke;
pub mod pointcut;
pub mod retrieval;

pub use error::AdvisorError;
pub use invoke::{Interceptor, Invocation, JoinPoint};
pub use pointcut::{ExpressionPointcut, Pointcut, TruePointcut, TypePatternPointcut};
pub use retrieval::AdvisorRetrievalHelper;

// Test module declaration
#[cfg(test)]
mod tests;

/// Factory producing the mixin instance backing an introduction.
pub type MixinFactory = Arc<dyn Fn() -> Result<Arc<dyn Component>> + Send + Sync>;

/// Advice scoped by a pointcut.
#[derive(Clone)]
pub struct PointcutAdvisor {
    pub pointcut: Arc<dyn Pointcut>,
    pub interceptor: Arc<dyn Interceptor>,
    /// Container name of the aspect this advisor came from, or of the
    /// declared advisor component.
    pub aspect_name: String,
    /// Advice method name, for diagnostics.
    pub method_name: String,
    /// Position within the owning aspect's sorted advice list.
    pub order: i32,
}

impl fmt::Debug for PointcutAdvisor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PointcutAdvisor")
            .field("aspect_name", &self.aspect_name)
            .field("method_name", &self.method_name)
            .field("order", &self.order)
            .finish_non_exhaustive()
    }
}

/// Introduction of an additional interface onto matched types, backed by a
/// lazily created mixin instance.
#[derive(Clone)]
pub struct IntroductionAdvisor {
    /// Which target types receive the introduction.
    pub type_filter: Arc<dyn Pointcut>,
    pub interface_name: String,
    /// Methods the introduced interface contributes; the proxy routes these
    /// to the mixin instead of the target.
    pub methods: Vec<String>,
    pub mixin: MixinFactory,
}

impl fmt::Debug for IntroductionAdvisor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntroductionAdvisor")
            .field("interface_name", &self.interface_name)
            .field("methods", &self.methods)
            .finish_non_exhaustive()
    }
}

/// An advice/pointcut pair or an interface introduction.
#[derive(Debug, Clone)]
pub enum Advisor {
    Pointcut(PointcutAdvisor),
    Introduction(IntroductionAdvisor),
}

impl Advisor {
    /// Type-level applicability, used when filtering candidates for a
    /// proxy. Method-level matching is deferred to call time.
    pub fn applies_to_type(&self, type_name: &str) -> bool {
        match self {
            Advisor::Pointcut(advisor) => advisor.pointcut.matches_type(type_name),
            Advisor::Introduction(advisor) => advisor.type_filter.matches_type(type_name),
        }
    }
}
