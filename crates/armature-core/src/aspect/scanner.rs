//! # Armature Core Aspect Scanner
//!
//! Scans container definitions for aspect components and turns them into
//! advisors, caching the scan so repeated auto-proxy passes stay cheap.
//!
//! The name list is populated once under a builder lock and then read
//! without it. Per aspect, exactly one of two caches holds an entry:
//! singleton-scoped aspects cache their built advisor list, prototype-scoped
//! aspects cache only the instance factory and rebuild advisors on every
//! retrieval.
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use crate::advisor::Advisor;
use crate::aspect::builder::AspectAdvisorFactory;
use crate::aspect::error::AspectError;
use crate::aspect::instance::{
    AspectInstanceFactory, ContainerAspectInstanceFactory, PrototypeAspectInstanceFactory,
};
use crate::aspect::metadata::{AspectMetadata, PerClauseKind};
use crate::container::Container;
use crate::container::error::Result;

type EligibilityFn = Box<dyn Fn(&str) -> bool + Send + Sync>;

/// Discovers aspect components and builds their advisors, with caching.
pub struct AspectAdvisorsBuilder {
    advisor_factory: AspectAdvisorFactory,
    aspect_names: RwLock<Option<Vec<String>>>,
    populate_lock: Mutex<()>,
    advisors_cache: Mutex<HashMap<String, Vec<Arc<Advisor>>>>,
    factory_cache: Mutex<HashMap<String, Arc<dyn AspectInstanceFactory>>>,
    eligibility: Option<EligibilityFn>,
}

impl std::fmt::Debug for AspectAdvisorsBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names = self
            .aspect_names
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("AspectAdvisorsBuilder")
            .field("aspect_names", &*names)
            .finish_non_exhaustive()
    }
}

impl Default for AspectAdvisorsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AspectAdvisorsBuilder {
    pub fn new() -> Self {
        Self {
            advisor_factory: AspectAdvisorFactory::new(),
            aspect_names: RwLock::new(None),
            populate_lock: Mutex::new(()),
            advisors_cache: Mutex::new(HashMap::new()),
            factory_cache: Mutex::new(HashMap::new()),
            eligibility: None,
        }
    }

    /// Restrict the scan to names the predicate accepts.
    pub fn with_eligibility<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.eligibility = Some(Box::new(predicate));
        self
    }

    fn is_eligible(&self, name: &str) -> bool {
        self.eligibility.as_ref().is_none_or(|predicate| predicate(name))
    }

    /// Whether `name` was recorded as an aspect by a completed scan.
    pub fn is_aspect_component(&self, name: &str) -> bool {
        self.aspect_names
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|names| names.iter().any(|n| n == name))
    }

    /// Advisors for every aspect component in the container.
    ///
    /// The first call scans and populates the caches; later calls serve
    /// singleton-scoped aspects from the advisor cache and rebuild
    /// prototype-scoped aspects through their cached factories.
    pub fn build_aspect_advisors(&self, container: &Container) -> Result<Vec<Arc<Advisor>>> {
        let names = self
            .aspect_names
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if let Some(names) = names {
            return self.advisors_for(&names);
        }

        let _populate = self.populate_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let names = self
            .aspect_names
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if let Some(names) = names {
            return self.advisors_for(&names);
        }

        let mut aspect_names = Vec::new();
        let mut advisors = Vec::new();
        for name in container.definition_names() {
            if !self.is_eligible(&name) {
                continue;
            }
            let Some(definition) = container.definition(&name) else {
                continue;
            };
            let Some(type_name) = definition.type_name.clone() else {
                continue;
            };
            let Some(introspection) = container.introspector().introspect(&type_name) else {
                continue;
            };
            log::debug!("Discovered aspect component '{name}' of type '{type_name}'");
            aspect_names.push(name.clone());
            let metadata = AspectMetadata::new(name.clone(), type_name, introspection)?;

            if metadata.per_clause == PerClauseKind::Singleton {
                let factory: Arc<dyn AspectInstanceFactory> =
                    Arc::new(ContainerAspectInstanceFactory::new(
                        container.weak_handle(),
                        &name,
                        metadata,
                    ));
                let built = self.advisor_factory.advisors(Arc::clone(&factory))?;
                if definition.is_singleton() {
                    self.advisors_cache
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .insert(name.clone(), built.clone());
                } else {
                    self.factory_cache
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .insert(name.clone(), factory);
                }
                advisors.extend(built);
            } else {
                if definition.is_singleton() {
                    return Err(AspectError::NonSingletonAspectOnSingleton {
                        aspect: name.clone(),
                    }
                    .into());
                }
                let factory: Arc<dyn AspectInstanceFactory> =
                    Arc::new(PrototypeAspectInstanceFactory::new(
                        container.weak_handle(),
                        &name,
                        metadata,
                    )?);
                self.factory_cache
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .insert(name.clone(), Arc::clone(&factory));
                advisors.extend(self.advisor_factory.advisors(factory)?);
            }
        }
        *self
            .aspect_names
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(aspect_names);
        Ok(advisors)
    }

    fn advisors_for(&self, names: &[String]) -> Result<Vec<Arc<Advisor>>> {
        if names.is_empty() {
            return Ok(Vec::new());
        }
        let mut advisors = Vec::new();
        for name in names {
            let cached = {
                self.advisors_cache
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .get(name)
                    .cloned()
            };
            if let Some(cached) = cached {
                advisors.extend(cached);
                continue;
            }
            let factory = {
                self.factory_cache
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .get(name)
                    .cloned()
            };
            if let Some(factory) = factory {
                advisors.extend(self.advisor_factory.advisors(factory)?);
            }
        }
        Ok(advisors)
    }
}
