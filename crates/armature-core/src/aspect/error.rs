//! # Armature Core Aspect Errors
//!
//! Defines [`AspectError`], the configuration-error taxonomy of the aspect
//! subsystem. Every variant is fatal to the operation that raised it; there
//! is no recovery from a misdeclared aspect.
#[derive(Debug, thiserror::Error)]
pub enum AspectError {
    #[error("Type '{type_name}' is not an aspect")]
    NotAnAspect { type_name: String },

    #[error(
        "Aspect '{aspect}' declares a non-singleton instantiation model but is registered with singleton scope"
    )]
    NonSingletonAspectOnSingleton { aspect: String },

    #[error("Introduction field '{field}' on aspect '{aspect}' declares no default implementation")]
    MissingDefaultImpl { aspect: String, field: String },

    #[error("Malformed pointcut on aspect '{aspect}' ('{expression}'): {detail}")]
    MalformedPointcut {
        aspect: String,
        expression: String,
        detail: String,
    },

    #[error("Advice method '{method}' on aspect '{aspect}' disagrees with its declared kind: {detail}")]
    AdviceKindMismatch {
        aspect: String,
        method: String,
        detail: String,
    },

    #[error("Pointcut-declaring method '{method}' on aspect '{aspect}' cannot be invoked as advice")]
    PointcutMethodInvoked { aspect: String, method: String },

    #[error("Aspect instance for '{aspect}' is unavailable: {reason}")]
    InstanceUnavailable { aspect: String, reason: String },
}
