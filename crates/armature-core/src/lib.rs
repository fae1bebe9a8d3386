//! # Armature Core
//!
//! Runtime core of the Armature dependency-injection container. It covers
//! component definitions and their registry, the definition post-processing
//! pipeline, the per-instance lifecycle coordinator, and the aspect subsystem
//! that turns declared aspects into advisors and weaves them into proxies.
pub mod advisor;
pub mod aspect;
pub mod container;
pub mod lifecycle;
pub mod processor;
pub mod proxy;
pub mod registry;

// Re-export key public types for easier use by embedders.
pub use container::Container;
pub use container::component::Component;
pub use container::error::{Error, Result};
pub use container::listener::{ContainerEvent, ContainerListener};
pub use registry::{
    ComponentDefinition, DefinitionStore, ProcessorDeclaration, PropertyValue, Role, Scope,
};
pub use processor::{
    DefinitionPostProcessor, ProcessorKind, ProcessorOrder, RegistryPostProcessor,
    SuppliedProcessor,
};
pub use lifecycle::{InstancePostProcessor, MergedDefinitionPostProcessor};
pub use advisor::{Advisor, Interceptor, Pointcut};
pub use aspect::{AspectIntrospection, AspectIntrospector, StaticIntrospector};
pub use proxy::ProxyFactory;
