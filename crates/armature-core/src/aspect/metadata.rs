//! # Armature Core Aspect Metadata
//!
//! Immutable per-aspect metadata: the instantiation model, the per-clause
//! pointcut derived from it, and the advice-kind precedence table.
use std::fmt;
use std::sync::Arc;

use crate::advisor::pointcut::{ExpressionPointcut, Pointcut, TruePointcut};
use crate::aspect::error::AspectError;
use crate::aspect::introspect::AspectIntrospection;

/// Instantiation model of an aspect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PerClauseKind {
    /// One aspect instance shared across all advised targets.
    Singleton,
    /// A lazily created aspect instance per advised target.
    PerTarget,
    /// A lazily created aspect instance per advising proxy.
    PerThis,
}

/// Kind of a declared advice method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdviceKind {
    Around,
    Before,
    After,
    AfterReturning,
    AfterThrowing,
    /// Pure pointcut declaration. Never built into an advisor and excluded
    /// from precedence sorting.
    Pointcut,
}

impl AdviceKind {
    /// Precedence used when sorting an aspect's advice methods: around
    /// advice sorts first, after-throwing last.
    pub fn precedence(&self) -> usize {
        match self {
            AdviceKind::Around => 0,
            AdviceKind::Before => 1,
            AdviceKind::After => 2,
            AdviceKind::AfterReturning => 3,
            AdviceKind::AfterThrowing => 4,
            AdviceKind::Pointcut => usize::MAX,
        }
    }
}

/// Immutable metadata for one declared aspect.
#[derive(Clone)]
pub struct AspectMetadata {
    /// Container name of the aspect component.
    pub aspect_name: String,
    /// Declared type of the aspect component.
    pub type_name: String,
    pub per_clause: PerClauseKind,
    /// For non-singleton aspects, the pointcut scoping lazy instantiation;
    /// for singleton aspects it matches everything.
    pub per_clause_pointcut: Arc<dyn Pointcut>,
    pub introspection: Arc<AspectIntrospection>,
}

impl fmt::Debug for AspectMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AspectMetadata")
            .field("aspect_name", &self.aspect_name)
            .field("type_name", &self.type_name)
            .field("per_clause", &self.per_clause)
            .finish_non_exhaustive()
    }
}

impl AspectMetadata {
    /// Build metadata from an aspect's introspection.
    ///
    /// Non-singleton instantiation models require a per-clause expression;
    /// a missing or unparsable one is a configuration error.
    pub fn new(
        aspect_name: impl Into<String>,
        type_name: impl Into<String>,
        introspection: Arc<AspectIntrospection>,
    ) -> Result<Self, AspectError> {
        let aspect_name = aspect_name.into();
        let per_clause = introspection.per_clause;
        let per_clause_pointcut: Arc<dyn Pointcut> = match per_clause {
            PerClauseKind::Singleton => Arc::new(TruePointcut),
            PerClauseKind::PerTarget | PerClauseKind::PerThis => {
                let expression = introspection.per_clause_expression.as_deref().ok_or_else(
                    || AspectError::MalformedPointcut {
                        aspect: aspect_name.clone(),
                        expression: String::new(),
                        detail: "non-singleton aspect without a per-clause expression".to_string(),
                    },
                )?;
                let parsed = ExpressionPointcut::parse(expression).map_err(|err| {
                    AspectError::MalformedPointcut {
                        aspect: aspect_name.clone(),
                        expression: expression.to_string(),
                        detail: err.to_string(),
                    }
                })?;
                Arc::new(parsed)
            }
        };
        Ok(Self {
            aspect_name,
            type_name: type_name.into(),
            per_clause,
            per_clause_pointcut,
            introspection,
        })
    }

    /// Whether the aspect instance is created lazily, on first matched
    /// invocation, rather than eagerly at advisor build time.
    pub fn is_lazily_instantiated(&self) -> bool {
        self.per_clause != PerClauseKind::Singleton
    }
}
