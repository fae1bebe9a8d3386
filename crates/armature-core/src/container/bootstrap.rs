//! # Armature Core Container
//!
//! [`Container`] is the facade over the whole runtime: the definition
//! store, the singleton cache, the processor chains, listeners, and the
//! aspect collaborators.
//!
//! A container is created with [`Container::new`], populated with
//! definitions, refreshed exactly once, used, and closed. Components hold
//! [`Weak`] handles to the container where a back-reference is needed, so
//! dropping the last external `Arc` tears everything down.
use std::any::Any;
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock, Weak};

use crate::aspect::introspect::{AspectIntrospector, StaticIntrospector};
use crate::container::component::Component;
use crate::container::error::{Error, Result};
use crate::container::listener::{ContainerEvent, ContainerListener};
use crate::lifecycle::coordinator;
use crate::lifecycle::error::LifecycleError;
use crate::lifecycle::registrar;
use crate::lifecycle::traits::{InstancePostProcessor, MergedDefinitionPostProcessor};
use crate::processor::dispatcher;
use crate::processor::traits::{ProcessorKind, ProcessorOrder, SuppliedProcessor};
use crate::proxy::auto::{AutoProxyProcessor, AUTO_PROXY_PROCESSOR_NAME};
use crate::proxy::{DefaultProxyFactory, ProxyFactory};
use crate::registry::definition::{ComponentDefinition, ProcessorDeclaration, Role};
use crate::registry::error::RegistryError;
use crate::registry::store::DefinitionStore;

/// The dependency-injection container.
pub struct Container {
    self_handle: Weak<Container>,
    store: DefinitionStore,
    singletons: Mutex<HashMap<String, Arc<dyn Component>>>,
    /// Singleton names in first-creation order; destruction runs in
    /// reverse.
    creation_order: Mutex<Vec<String>>,
    in_creation: Mutex<HashSet<String>>,
    supplied_processors: Mutex<Vec<SuppliedProcessor>>,
    instance_processors: RwLock<Vec<Arc<dyn InstancePostProcessor>>>,
    merged_processors: RwLock<Vec<Arc<dyn MergedDefinitionPostProcessor>>>,
    listeners: Mutex<Vec<(String, Arc<dyn ContainerListener>)>>,
    introspector: RwLock<Arc<dyn AspectIntrospector>>,
    proxy_factory: RwLock<Arc<dyn ProxyFactory>>,
    refreshed: AtomicBool,
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let singleton_count = self
            .singletons
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len();
        f.debug_struct("Container")
            .field("store", &self.store)
            .field("singleton_count", &singleton_count)
            .field("refreshed", &self.refreshed.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl Container {
    /// Create an empty container behind an `Arc`.
    ///
    /// The container keeps a weak handle to itself so internal
    /// collaborators can hold back-references without a cycle.
    pub fn new() -> Arc<Self> {
        Arc::new_cyclic(|handle| Self {
            self_handle: handle.clone(),
            store: DefinitionStore::new(),
            singletons: Mutex::new(HashMap::new()),
            creation_order: Mutex::new(Vec::new()),
            in_creation: Mutex::new(HashSet::new()),
            supplied_processors: Mutex::new(Vec::new()),
            instance_processors: RwLock::new(Vec::new()),
            merged_processors: RwLock::new(Vec::new()),
            listeners: Mutex::new(Vec::new()),
            introspector: RwLock::new(Arc::new(StaticIntrospector::new())),
            proxy_factory: RwLock::new(Arc::new(DefaultProxyFactory::new())),
            refreshed: AtomicBool::new(false),
        })
    }

    /// Weak handle to this container, for collaborators that need a
    /// back-reference.
    pub fn weak_handle(&self) -> Weak<Container> {
        self.self_handle.clone()
    }

    // ---- definition registry ------------------------------------------

    /// Register a component definition.
    pub fn register(&self, definition: ComponentDefinition) -> Result<()> {
        log::debug!("Registering component definition '{}'", definition.name);
        self.store.register(definition)?;
        Ok(())
    }

    /// Register `alias` as an alternative name for `canonical`.
    pub fn register_alias(&self, alias: &str, canonical: &str) -> Result<()> {
        self.store.register_alias(alias, canonical)?;
        Ok(())
    }

    pub fn set_allow_overriding(&self, allow: bool) {
        self.store.set_allow_overriding(allow);
    }

    /// Mutate the definition registered under `name`. Fails once the
    /// definition is frozen.
    pub fn update_definition<F>(&self, name: &str, mutate: F) -> Result<()>
    where
        F: FnOnce(&mut ComponentDefinition),
    {
        self.store.update(name, mutate)?;
        Ok(())
    }

    pub fn contains_definition(&self, name: &str) -> bool {
        self.store.contains(&self.store.canonical_name(name))
    }

    /// Definition names in registration order.
    pub fn definition_names(&self) -> Vec<String> {
        self.store.names()
    }

    /// Copy of the definition under `name` (alias-aware).
    pub fn definition(&self, name: &str) -> Option<ComponentDefinition> {
        self.store.definition(name)
    }

    pub fn aliases_of(&self, name: &str) -> Vec<String> {
        self.store.aliases_of(name)
    }

    pub fn is_singleton(&self, name: &str) -> bool {
        self.store
            .definition(name)
            .is_some_and(|def| def.is_singleton())
    }

    pub fn is_infrastructure(&self, name: &str) -> bool {
        self.store
            .definition(name)
            .is_some_and(|def| def.is_infrastructure())
    }

    /// Whether the definition under `name` declares any processor
    /// capability.
    pub fn is_processor_definition(&self, name: &str) -> bool {
        self.store
            .definition(name)
            .is_some_and(|def| def.processor.is_some())
    }

    /// Names of definitions declaring the registry post-processor
    /// capability, with their ordering class.
    pub fn registry_processor_names(&self) -> Vec<(String, ProcessorOrder)> {
        self.processor_names(|kind| matches!(kind, ProcessorKind::Registry))
    }

    /// Names of definitions declaring a definition-level post-processor
    /// capability (registry-capable ones included; the dispatcher skips
    /// those it already ran).
    pub fn definition_processor_names(&self) -> Vec<(String, ProcessorOrder)> {
        self.processor_names(|kind| {
            matches!(kind, ProcessorKind::Registry | ProcessorKind::Definition)
        })
    }

    fn processor_names<F>(&self, accept: F) -> Vec<(String, ProcessorOrder)>
    where
        F: Fn(ProcessorKind) -> bool,
    {
        self.store
            .names()
            .into_iter()
            .filter_map(|name| {
                let declaration = self.store.definition(&name)?.processor?;
                accept(declaration.kind).then_some((name, declaration.order))
            })
            .collect()
    }

    /// Names of definitions declaring the instance post-processor
    /// capability, with ordering class and merged-definition flag.
    pub fn instance_processor_names(&self) -> Vec<(String, ProcessorOrder, bool)> {
        self.store
            .names()
            .into_iter()
            .filter_map(|name| {
                let declaration = self.store.definition(&name)?.processor?;
                match declaration.kind {
                    ProcessorKind::Instance { merged } => {
                        Some((name, declaration.order, merged))
                    }
                    _ => None,
                }
            })
            .collect()
    }

    /// Merged copy of the definition under `name`, computed once and
    /// cached: the registered definition run through every
    /// merged-definition post-processor.
    pub fn merged_definition(&self, name: &str) -> Result<Arc<ComponentDefinition>> {
        let canonical = self.store.canonical_name(name);
        if let Some(merged) = self.store.merged(&canonical) {
            return Ok(merged);
        }
        let mut definition =
            self.store
                .definition(&canonical)
                .ok_or_else(|| RegistryError::UnknownDefinition {
                    name: name.to_string(),
                })?;
        let processors = {
            self.merged_processors
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        };
        for processor in &processors {
            processor.post_process_merged_definition(&mut definition, &canonical);
        }
        let merged = Arc::new(definition);
        self.store.store_merged(&canonical, Arc::clone(&merged));
        Ok(merged)
    }

    /// Drop cached merged definitions so later creations see
    /// post-processed metadata.
    pub fn clear_metadata_cache(&self) {
        self.store.clear_metadata_cache();
    }

    // ---- processor chains ---------------------------------------------

    /// Park a supplied definition post-processor to run first during
    /// `refresh`.
    pub fn add_supplied_definition_processor(&self, processor: SuppliedProcessor) {
        self.supplied_processors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(processor);
    }

    /// Install an instance post-processor at the tail of the chain.
    /// Re-registering an already installed processor moves it to the tail.
    pub fn add_instance_post_processor(&self, processor: Arc<dyn InstancePostProcessor>) {
        let mut processors = self
            .instance_processors
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        processors.retain(|existing| !Arc::ptr_eq(existing, &processor));
        processors.push(processor);
    }

    pub fn add_merged_processor(&self, processor: Arc<dyn MergedDefinitionPostProcessor>) {
        let mut processors = self
            .merged_processors
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        processors.retain(|existing| !Arc::ptr_eq(existing, &processor));
        processors.push(processor);
    }

    pub fn instance_processor_count(&self) -> usize {
        self.instance_processors
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Snapshot of the instance post-processor chain in registration
    /// order.
    pub fn instance_processors(&self) -> Vec<Arc<dyn InstancePostProcessor>> {
        self.instance_processors
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    // ---- aspect collaborators -----------------------------------------

    pub fn set_introspector(&self, introspector: Arc<dyn AspectIntrospector>) {
        *self
            .introspector
            .write()
            .unwrap_or_else(PoisonError::into_inner) = introspector;
    }

    pub fn introspector(&self) -> Arc<dyn AspectIntrospector> {
        self.introspector
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set_proxy_factory(&self, factory: Arc<dyn ProxyFactory>) {
        *self
            .proxy_factory
            .write()
            .unwrap_or_else(PoisonError::into_inner) = factory;
    }

    pub fn proxy_factory(&self) -> Arc<dyn ProxyFactory> {
        self.proxy_factory
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Register the auto-proxy processor definition. Idempotent.
    ///
    /// The processor is infrastructure-role and sorts last among
    /// explicitly ordered instance processors so it wraps whatever the
    /// other hooks produced.
    pub fn enable_aspect_auto_proxy(&self) -> Result<()> {
        if self.store.contains(AUTO_PROXY_PROCESSOR_NAME) {
            return Ok(());
        }
        let definition = ComponentDefinition::new(
            AUTO_PROXY_PROCESSOR_NAME,
            Arc::new(|_| Ok(Arc::new(AutoProxyProcessor::new()) as Arc<dyn Component>)),
        )
        .with_role(Role::Infrastructure)
        .as_processor(ProcessorDeclaration {
            kind: ProcessorKind::Instance { merged: false },
            order: ProcessorOrder::Explicit(i32::MAX),
        });
        self.register(definition)
    }

    // ---- lifecycle ----------------------------------------------------

    /// Refresh the container: run definition post-processors, install
    /// instance post-processors, pre-instantiate eager singletons, and
    /// publish [`ContainerEvent::Refreshed`]. Single-shot.
    pub fn refresh(&self) -> Result<()> {
        if self.refreshed.swap(true, Ordering::SeqCst) {
            return Err(Error::AlreadyRefreshed);
        }
        log::info!("Refreshing container");
        let supplied = {
            self.supplied_processors
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        };
        dispatcher::invoke_definition_post_processors(self, &supplied)?;
        registrar::register_instance_post_processors(self)?;

        for name in self.store.names() {
            let Some(definition) = self.store.definition(&name) else {
                continue;
            };
            if definition.is_singleton() && !definition.lazy_init {
                self.get(&name)?;
            }
        }

        self.publish_event(&ContainerEvent::Refreshed);
        log::info!("Container refreshed");
        Ok(())
    }

    /// Resolve the component registered under `name`, creating it if
    /// necessary. Singletons are cached; prototypes are created per call.
    pub fn get(&self, name: &str) -> Result<Arc<dyn Component>> {
        let canonical = self.store.canonical_name(name);
        let definition =
            self.store
                .definition(&canonical)
                .ok_or_else(|| RegistryError::UnknownDefinition {
                    name: name.to_string(),
                })?;

        if definition.is_prototype() {
            let created = coordinator::create_component(self, &canonical)?;
            self.store.freeze(&canonical);
            return Ok(created);
        }

        {
            let singletons = self.singletons.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(existing) = singletons.get(&canonical) {
                return Ok(Arc::clone(existing));
            }
        }

        let created = coordinator::create_component(self, &canonical)?;
        self.store.freeze(&canonical);

        let mut singletons = self.singletons.lock().unwrap_or_else(PoisonError::into_inner);
        match singletons.entry(canonical.clone()) {
            // Another thread finished first; its instance wins.
            Entry::Occupied(entry) => Ok(Arc::clone(entry.get())),
            Entry::Vacant(entry) => {
                entry.insert(Arc::clone(&created));
                self.creation_order
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .push(canonical);
                Ok(created)
            }
        }
    }

    /// Resolve `name` and downcast it to the concrete component type `T`.
    pub fn get_as<T: Component>(&self, name: &str) -> Result<Arc<T>> {
        let component = self.get(name)?;
        let any: Arc<dyn Any + Send + Sync> = component;
        any.downcast::<T>().map_err(|_| Error::TypeMismatch {
            name: name.to_string(),
        })
    }

    /// Whether `name` is currently being created on some call stack.
    pub fn is_in_creation(&self, name: &str) -> bool {
        self.in_creation
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&self.store.canonical_name(name))
    }

    pub(crate) fn begin_creation(&self, name: &str) -> Result<()> {
        let mut in_creation = self.in_creation.lock().unwrap_or_else(PoisonError::into_inner);
        if !in_creation.insert(name.to_string()) {
            return Err(LifecycleError::CurrentlyInCreation {
                name: name.to_string(),
            }
            .into());
        }
        Ok(())
    }

    pub(crate) fn end_creation(&self, name: &str) {
        self.in_creation
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(name);
    }

    // ---- events and shutdown ------------------------------------------

    /// Register `listener` to observe container events under `name`.
    pub fn add_listener(&self, name: impl Into<String>, listener: Arc<dyn ContainerListener>) {
        let name = name.into();
        let mut listeners = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);
        listeners.retain(|(existing, _)| existing != &name);
        listeners.push((name, listener));
    }

    pub fn remove_listener(&self, name: &str) {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|(existing, _)| existing != name);
    }

    /// Deliver `event` to every registered listener, in registration
    /// order.
    pub fn publish_event(&self, event: &ContainerEvent) {
        let listeners = {
            self.listeners
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        };
        log::debug!("Publishing {event:?} to {} listener(s)", listeners.len());
        for (_, listener) in &listeners {
            listener.on_event(event);
        }
    }

    /// Close the container: publish [`ContainerEvent::Closed`], then
    /// destroy cached singletons in reverse creation order. Destruction
    /// errors are logged, never propagated.
    pub fn close(&self) {
        log::info!("Closing container");
        self.publish_event(&ContainerEvent::Closed);

        let order = std::mem::take(
            &mut *self
                .creation_order
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        );
        let mut singletons = std::mem::take(
            &mut *self
                .singletons
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        );
        for name in order.iter().rev() {
            let Some(instance) = singletons.remove(name) else {
                continue;
            };
            let Some(definition) = self.store.definition(name) else {
                continue;
            };
            log::debug!("Destroying component '{name}'");
            coordinator::destroy_component(self, name, &instance, &definition);
        }
    }
}
