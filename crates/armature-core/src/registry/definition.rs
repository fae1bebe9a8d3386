//! # Armature Core Component Definitions
//!
//! Defines [`ComponentDefinition`], the declarative recipe the container
//! holds for every component it manages, along with the supporting value
//! types: [`Scope`], [`Role`], [`PropertyValue`], and the resolved-value
//! bundle handed to component factories.
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::container::component::Component;
use crate::container::error::Result;
use crate::processor::traits::{ProcessorKind, ProcessorOrder};

/// Instance scope of a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    /// One shared instance, cached by the container after first creation.
    Singleton,
    /// A fresh instance on every retrieval; never cached.
    Prototype,
}

/// Role of a component within the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Ordinary application component.
    Regular,
    /// Internal machinery. Infrastructure components are exempt from
    /// auto-proxying and from the processor-count eligibility check.
    Infrastructure,
}

/// A declared property value, resolved at creation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyValue {
    /// Inline value handed to the factory as-is.
    Literal(Value),
    /// Reference to another component by name, resolved through the
    /// container before the factory runs.
    Ref(String),
}

/// Declared extension-point capability of a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessorDeclaration {
    pub kind: ProcessorKind,
    pub order: ProcessorOrder,
}

/// A property value after reference resolution.
#[derive(Clone)]
pub enum ResolvedValue {
    Literal(Value),
    Component(Arc<dyn Component>),
}

impl fmt::Debug for ResolvedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolvedValue::Literal(v) => f.debug_tuple("Literal").field(v).finish(),
            ResolvedValue::Component(_) => f.debug_struct("Component").finish_non_exhaustive(),
        }
    }
}

/// The resolved property values delivered to a component factory.
#[derive(Debug, Clone, Default)]
pub struct ResolvedValues {
    entries: Vec<(String, ResolvedValue)>,
}

impl ResolvedValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, value: ResolvedValue) {
        self.entries.push((name.into(), value));
    }

    pub fn get(&self, name: &str) -> Option<&ResolvedValue> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Literal value under `name`, if present and literal.
    pub fn literal(&self, name: &str) -> Option<&Value> {
        match self.get(name) {
            Some(ResolvedValue::Literal(v)) => Some(v),
            _ => None,
        }
    }

    /// Resolved component under `name`, if present and a reference.
    pub fn component(&self, name: &str) -> Option<Arc<dyn Component>> {
        match self.get(name) {
            Some(ResolvedValue::Component(c)) => Some(c.clone()),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Factory closure that produces the component instance from its resolved
/// property values.
pub type ComponentFactory =
    Arc<dyn Fn(&ResolvedValues) -> Result<Arc<dyn Component>> + Send + Sync>;

/// Declarative recipe for a container-managed component.
///
/// Definitions are mutable until the first instantiation of their component;
/// the store freezes them at that point and later mutation fails with
/// [`RegistryError::DefinitionFrozen`](crate::registry::error::RegistryError).
#[derive(Clone)]
pub struct ComponentDefinition {
    pub name: String,
    pub aliases: Vec<String>,
    /// Declared type tag. `None` means the type cannot be resolved; the
    /// aspect scanner skips such definitions.
    pub type_name: Option<String>,
    pub scope: Scope,
    pub role: Role,
    /// Lazy singletons are skipped during pre-instantiation.
    pub lazy_init: bool,
    pub values: Vec<(String, PropertyValue)>,
    pub init_method: Option<String>,
    pub destroy_method: Option<String>,
    pub processor: Option<ProcessorDeclaration>,
    /// Declared-type-satisfies-advisor flag, read by advisor discovery
    /// without instantiating the component.
    pub advisor: bool,
    pub factory: ComponentFactory,
}

impl fmt::Debug for ComponentDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentDefinition")
            .field("name", &self.name)
            .field("aliases", &self.aliases)
            .field("type_name", &self.type_name)
            .field("scope", &self.scope)
            .field("role", &self.role)
            .field("lazy_init", &self.lazy_init)
            .field("values", &self.values)
            .field("init_method", &self.init_method)
            .field("destroy_method", &self.destroy_method)
            .field("processor", &self.processor)
            .field("advisor", &self.advisor)
            .finish_non_exhaustive()
    }
}

impl ComponentDefinition {
    /// Create a definition with defaults: singleton scope, regular role,
    /// eager initialization, no declared capabilities.
    pub fn new(name: impl Into<String>, factory: ComponentFactory) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
            type_name: None,
            scope: Scope::Singleton,
            role: Role::Regular,
            lazy_init: false,
            values: Vec::new(),
            init_method: None,
            destroy_method: None,
            processor: None,
            advisor: false,
            factory,
        }
    }

    /// Convenience constructor for a definition over an already-built
    /// instance.
    pub fn from_instance(name: impl Into<String>, instance: Arc<dyn Component>) -> Self {
        Self::new(name, Arc::new(move |_| Ok(instance.clone())))
    }

    pub fn with_type_name(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }

    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn with_lazy_init(mut self, lazy: bool) -> Self {
        self.lazy_init = lazy;
        self
    }

    pub fn with_value(mut self, name: impl Into<String>, value: PropertyValue) -> Self {
        self.values.push((name.into(), value));
        self
    }

    pub fn with_literal(mut self, name: impl Into<String>, value: Value) -> Self {
        self.values.push((name.into(), PropertyValue::Literal(value)));
        self
    }

    pub fn with_ref(mut self, name: impl Into<String>, target: impl Into<String>) -> Self {
        self.values
            .push((name.into(), PropertyValue::Ref(target.into())));
        self
    }

    pub fn with_init_method(mut self, method: impl Into<String>) -> Self {
        self.init_method = Some(method.into());
        self
    }

    pub fn with_destroy_method(mut self, method: impl Into<String>) -> Self {
        self.destroy_method = Some(method.into());
        self
    }

    pub fn as_processor(mut self, declaration: ProcessorDeclaration) -> Self {
        self.processor = Some(declaration);
        self
    }

    pub fn as_advisor(mut self) -> Self {
        self.advisor = true;
        self
    }

    pub fn is_singleton(&self) -> bool {
        self.scope == Scope::Singleton
    }

    pub fn is_prototype(&self) -> bool {
        self.scope == Scope::Prototype
    }

    pub fn is_infrastructure(&self) -> bool {
        self.role == Role::Infrastructure
    }
}
