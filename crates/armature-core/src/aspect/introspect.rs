//! # Armature Core Aspect Introspection
//!
//! The introspection seam between declared types and the aspect subsystem.
//!
//! The original habitat of this machinery reads annotations off classes;
//! here the same information arrives through [`AspectIntrospector`], a
//! pluggable collaborator keyed by declared type name. [`StaticIntrospector`]
//! is the built-in implementation: programs and tests declare their aspects
//! programmatically, attaching executable advice bodies to the metadata.
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use serde_json::Value;

use crate::advisor::MixinFactory;
use crate::advisor::invoke::{Invocation, JoinPoint};
use crate::aspect::metadata::{AdviceKind, PerClauseKind};
use crate::container::component::Component;
use crate::container::error::{Error, Result};

/// Body of an around advice: receives the aspect instance and the
/// invocation, and decides if and when to proceed.
pub type AroundFn =
    Arc<dyn Fn(Arc<dyn Component>, &mut Invocation<'_>) -> Result<Value> + Send + Sync>;
/// Body of a before or after advice: observes the join point.
pub type JoinPointFn = Arc<dyn Fn(Arc<dyn Component>, &JoinPoint) -> Result<()> + Send + Sync>;
/// Body of an after-returning advice: additionally observes the return
/// value.
pub type ReturningFn =
    Arc<dyn Fn(Arc<dyn Component>, &JoinPoint, &Value) -> Result<()> + Send + Sync>;
/// Body of an after-throwing advice: additionally observes the error.
pub type ThrowingFn =
    Arc<dyn Fn(Arc<dyn Component>, &JoinPoint, &Error) -> Result<()> + Send + Sync>;

/// Executable body of an advice method, one shape per advice kind.
#[derive(Clone)]
pub enum AdviceBody {
    Around(AroundFn),
    Before(JoinPointFn),
    After(JoinPointFn),
    AfterReturning(ReturningFn),
    AfterThrowing(ThrowingFn),
}

impl AdviceBody {
    /// The advice kind this body shape belongs to. `Before` and `After`
    /// share a shape but remain distinct kinds.
    pub fn kind(&self) -> AdviceKind {
        match self {
            AdviceBody::Around(_) => AdviceKind::Around,
            AdviceBody::Before(_) => AdviceKind::Before,
            AdviceBody::After(_) => AdviceKind::After,
            AdviceBody::AfterReturning(_) => AdviceKind::AfterReturning,
            AdviceBody::AfterThrowing(_) => AdviceKind::AfterThrowing,
        }
    }
}

impl fmt::Debug for AdviceBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdviceBody")
            .field("kind", &self.kind())
            .finish_non_exhaustive()
    }
}

/// One declared advice method on an aspect type.
#[derive(Clone)]
pub struct AdviceMethod {
    pub name: String,
    pub kind: AdviceKind,
    /// Pointcut expression scoping this advice.
    pub expression: String,
    /// Name binding the return value, valid only on after-returning advice.
    pub returning: Option<String>,
    /// Name binding the error, valid only on after-throwing advice.
    pub throwing: Option<String>,
    /// Declared argument names, in order.
    pub arg_names: Vec<String>,
    /// Executable body. Required for every kind except `Pointcut`.
    pub body: Option<AdviceBody>,
}

impl fmt::Debug for AdviceMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdviceMethod")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("expression", &self.expression)
            .field("returning", &self.returning)
            .field("throwing", &self.throwing)
            .field("arg_names", &self.arg_names)
            .finish_non_exhaustive()
    }
}

impl AdviceMethod {
    pub fn new(name: impl Into<String>, kind: AdviceKind, expression: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            expression: expression.into(),
            returning: None,
            throwing: None,
            arg_names: Vec::new(),
            body: None,
        }
    }

    pub fn with_returning(mut self, name: impl Into<String>) -> Self {
        self.returning = Some(name.into());
        self
    }

    pub fn with_throwing(mut self, name: impl Into<String>) -> Self {
        self.throwing = Some(name.into());
        self
    }

    pub fn with_arg_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.arg_names = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_body(mut self, body: AdviceBody) -> Self {
        self.body = Some(body);
        self
    }
}

/// One declared introduction field on an aspect type: it grafts an
/// interface onto matched target types, backed by a mixin implementation.
#[derive(Clone)]
pub struct IntroductionField {
    pub field_name: String,
    pub interface_name: String,
    /// Glob over target type names that receive the introduction.
    pub type_pattern: String,
    /// Methods the introduced interface contributes.
    pub methods: Vec<String>,
    /// Factory for the backing mixin. Absent means the declaration is
    /// incomplete and advisor building fails.
    pub default_impl: Option<MixinFactory>,
}

impl fmt::Debug for IntroductionField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntroductionField")
            .field("field_name", &self.field_name)
            .field("interface_name", &self.interface_name)
            .field("type_pattern", &self.type_pattern)
            .field("methods", &self.methods)
            .field("has_default_impl", &self.default_impl.is_some())
            .finish()
    }
}

/// Everything the aspect subsystem knows about one aspect type.
#[derive(Debug, Clone)]
pub struct AspectIntrospection {
    pub per_clause: PerClauseKind,
    /// Pointcut expression scoping lazy instantiation; required for
    /// non-singleton per-clause kinds.
    pub per_clause_expression: Option<String>,
    pub advice_methods: Vec<AdviceMethod>,
    pub introductions: Vec<IntroductionField>,
}

impl AspectIntrospection {
    pub fn singleton() -> Self {
        Self {
            per_clause: PerClauseKind::Singleton,
            per_clause_expression: None,
            advice_methods: Vec::new(),
            introductions: Vec::new(),
        }
    }

    pub fn per_target(expression: impl Into<String>) -> Self {
        Self {
            per_clause: PerClauseKind::PerTarget,
            per_clause_expression: Some(expression.into()),
            advice_methods: Vec::new(),
            introductions: Vec::new(),
        }
    }

    pub fn per_this(expression: impl Into<String>) -> Self {
        Self {
            per_clause: PerClauseKind::PerThis,
            per_clause_expression: Some(expression.into()),
            advice_methods: Vec::new(),
            introductions: Vec::new(),
        }
    }

    pub fn with_advice(mut self, method: AdviceMethod) -> Self {
        self.advice_methods.push(method);
        self
    }

    pub fn with_introduction(mut self, field: IntroductionField) -> Self {
        self.introductions.push(field);
        self
    }
}

/// Resolves declared type names to aspect introspections.
pub trait AspectIntrospector: Send + Sync {
    /// The introspection for `type_name`, or `None` when the type is not an
    /// aspect.
    fn introspect(&self, type_name: &str) -> Option<Arc<AspectIntrospection>>;
}

/// Introspector backed by programmatic declarations.
#[derive(Default)]
pub struct StaticIntrospector {
    declarations: RwLock<HashMap<String, Arc<AspectIntrospection>>>,
}

impl fmt::Debug for StaticIntrospector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let declarations = self
            .declarations
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("StaticIntrospector")
            .field("declared_types", &declarations.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl StaticIntrospector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare `type_name` as an aspect.
    pub fn declare(&self, type_name: impl Into<String>, introspection: AspectIntrospection) {
        self.declarations
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(type_name.into(), Arc::new(introspection));
    }

    pub fn with_aspect(
        self,
        type_name: impl Into<String>,
        introspection: AspectIntrospection,
    ) -> Self {
        self.declare(type_name, introspection);
        self
    }
}

impl AspectIntrospector for StaticIntrospector {
    fn introspect(&self, type_name: &str) -> Option<Arc<AspectIntrospection>> {
        self.declarations
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(type_name)
            .cloned()
    }
}
