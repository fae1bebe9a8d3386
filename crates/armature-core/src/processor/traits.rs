//! Extension-point traits for the definition post-processing phase, and the
//! ordering model shared by every processor class.
use std::sync::Arc;

use crate::container::Container;
use crate::container::error::Result;

/// Which extension point a component definition declares.
///
/// A reflective container classifies processors by inspecting the bean
/// class; here the capability is declared on the definition and the resolved
/// instance must expose the matching capability probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessorKind {
    /// Registry-capable definition post-processor: may register further
    /// definitions before any plain callback runs.
    Registry,
    /// Plain definition post-processor.
    Definition,
    /// Instance post-processor participating in component creation. With
    /// `merged: true` the processor also observes merged definitions and is
    /// re-registered at the tail of the chain.
    Instance { merged: bool },
}

/// Ordering class and value of a declared processor.
///
/// Priority-class processors run before explicitly ordered ones, which run
/// before unordered ones. Within a class, lower values run first and ties
/// keep registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessorOrder {
    Priority(i32),
    Explicit(i32),
    Unordered,
}

impl ProcessorOrder {
    pub fn class_rank(&self) -> u8 {
        match self {
            ProcessorOrder::Priority(_) => 0,
            ProcessorOrder::Explicit(_) => 1,
            ProcessorOrder::Unordered => 2,
        }
    }

    pub fn value(&self) -> i32 {
        match self {
            ProcessorOrder::Priority(v) | ProcessorOrder::Explicit(v) => *v,
            ProcessorOrder::Unordered => i32::MAX,
        }
    }

    /// Sort key for a stable ascending sort: class first, value second.
    pub fn sort_key(&self) -> (u8, i32) {
        (self.class_rank(), self.value())
    }
}

/// Callback invoked after all definitions are loaded but before any
/// component is instantiated. May read and mutate definitions.
pub trait DefinitionPostProcessor: Send + Sync {
    /// Diagnostic name used in logs and error messages.
    fn processor_name(&self) -> &str;

    fn post_process_definitions(&self, container: &Container) -> Result<()>;
}

/// Registry-capable definition post-processor.
///
/// Its registry callback runs before any plain definition callback and may
/// register further definitions, including further processors, which the
/// dispatcher picks up in later discovery rounds.
pub trait RegistryPostProcessor: DefinitionPostProcessor {
    fn post_process_registry(&self, container: &Container) -> Result<()>;
}

/// A processor supplied programmatically to the container, ahead of any
/// discovered from definitions. Supplied processors run in supplied order.
#[derive(Clone)]
pub enum SuppliedProcessor {
    Definition(Arc<dyn DefinitionPostProcessor>),
    Registry(Arc<dyn RegistryPostProcessor>),
}
