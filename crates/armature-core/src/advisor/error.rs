//! # Armature Core Advisor Errors
//!
//! Defines [`AdvisorError`] for pointcut parsing and advisor discovery.
#[derive(Debug, thiserror::Error)]
pub enum AdvisorError {
    #[error("Pointcut expression '{expression}' is malformed: {reason}")]
    MalformedExpression { expression: String, reason: String },

    #[error("Component '{name}' is declared as an advisor but does not expose one")]
    NotAnAdvisor { name: String },
}
