//! # Armature Core Aspect Instances
//!
//! Factories that produce the aspect instance advice bodies run against.
//!
//! Advisors are built before any aspect instance exists, so every advice
//! interceptor holds a factory rather than an instance. Container-backed
//! factories keep a [`Weak`] handle to avoid a reference cycle through the
//! advisor caches; the shared decorator collapses repeated calls onto one
//! instance per factory.
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError, Weak};

use crate::aspect::error::AspectError;
use crate::aspect::metadata::AspectMetadata;
use crate::container::Container;
use crate::container::component::Component;
use crate::container::error::Result;
use crate::registry::definition::Scope;

/// Produces the aspect instance an advice body runs against.
pub trait AspectInstanceFactory: Send + Sync {
    /// The aspect instance. Implementations decide whether repeated calls
    /// return the same instance.
    fn aspect_instance(&self) -> Result<Arc<dyn Component>>;

    /// Metadata of the aspect this factory instantiates.
    fn metadata(&self) -> &AspectMetadata;
}

/// Factory resolving the aspect component from the container by name.
pub struct ContainerAspectInstanceFactory {
    container: Weak<Container>,
    name: String,
    metadata: AspectMetadata,
}

impl fmt::Debug for ContainerAspectInstanceFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContainerAspectInstanceFactory")
            .field("name", &self.name)
            .field("metadata", &self.metadata)
            .finish()
    }
}

impl ContainerAspectInstanceFactory {
    pub fn new(container: Weak<Container>, name: impl Into<String>, metadata: AspectMetadata) -> Self {
        Self {
            container,
            name: name.into(),
            metadata,
        }
    }
}

impl AspectInstanceFactory for ContainerAspectInstanceFactory {
    fn aspect_instance(&self) -> Result<Arc<dyn Component>> {
        let container = self.container.upgrade().ok_or_else(|| {
            AspectError::InstanceUnavailable {
                aspect: self.name.clone(),
                reason: "owning container has been dropped".to_string(),
            }
        })?;
        container.get(&self.name)
    }

    fn metadata(&self) -> &AspectMetadata {
        &self.metadata
    }
}

/// Container-backed factory that additionally asserts the aspect component
/// is registered with prototype scope, as non-singleton instantiation
/// models require.
pub struct PrototypeAspectInstanceFactory {
    inner: ContainerAspectInstanceFactory,
}

impl fmt::Debug for PrototypeAspectInstanceFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrototypeAspectInstanceFactory")
            .field("inner", &self.inner)
            .finish()
    }
}

impl PrototypeAspectInstanceFactory {
    /// Wrap a container-backed factory, checking the registered scope up
    /// front.
    pub fn new(
        container: Weak<Container>,
        name: impl Into<String>,
        metadata: AspectMetadata,
    ) -> std::result::Result<Self, AspectError> {
        let name = name.into();
        if let Some(strong) = container.upgrade() {
            let is_prototype = strong
                .definition(&name)
                .is_some_and(|def| def.scope == Scope::Prototype);
            if !is_prototype {
                return Err(AspectError::NonSingletonAspectOnSingleton { aspect: name });
            }
        }
        Ok(Self {
            inner: ContainerAspectInstanceFactory::new(container, name, metadata),
        })
    }
}

impl AspectInstanceFactory for PrototypeAspectInstanceFactory {
    fn aspect_instance(&self) -> Result<Arc<dyn Component>> {
        self.inner.aspect_instance()
    }

    fn metadata(&self) -> &AspectMetadata {
        self.inner.metadata()
    }
}

/// Decorator that creates the underlying instance at most once and returns
/// the same instance on every later call.
pub struct SharedAspectInstanceFactory {
    inner: Arc<dyn AspectInstanceFactory>,
    instance: Mutex<Option<Arc<dyn Component>>>,
}

impl fmt::Debug for SharedAspectInstanceFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let instantiated = self
            .instance
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some();
        f.debug_struct("SharedAspectInstanceFactory")
            .field("metadata", &self.inner.metadata())
            .field("instantiated", &instantiated)
            .finish()
    }
}

impl SharedAspectInstanceFactory {
    pub fn new(inner: Arc<dyn AspectInstanceFactory>) -> Self {
        Self {
            inner,
            instance: Mutex::new(None),
        }
    }
}

impl AspectInstanceFactory for SharedAspectInstanceFactory {
    fn aspect_instance(&self) -> Result<Arc<dyn Component>> {
        let mut guard = self.instance.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(instance) = guard.as_ref() {
            return Ok(Arc::clone(instance));
        }
        let created = self.inner.aspect_instance()?;
        *guard = Some(Arc::clone(&created));
        Ok(created)
    }

    fn metadata(&self) -> &AspectMetadata {
        self.inner.metadata()
    }
}
