//! # Armature Core Lifecycle Coordinator
//!
//! Drives one component instance through its creation state machine:
//! property resolution, instantiation, the before-init hook chain, the
//! declared init method, and the after-init hook chain. Destruction runs
//! the same machinery backwards.
//!
//! The in-creation set is entered before property resolution so that a
//! circular reference surfaces as [`LifecycleError::CurrentlyInCreation`]
//! instead of recursing forever.
use std::sync::Arc;

use crate::container::Container;
use crate::container::component::Component;
use crate::container::error::Result;
use crate::lifecycle::error::LifecycleError;
use crate::registry::definition::{ComponentDefinition, PropertyValue, ResolvedValue, ResolvedValues};

/// Create, configure, and initialize the component named `name`.
///
/// Every failure past the in-creation check is wrapped in
/// [`LifecycleError::CreationFailure`] so callers can walk the source chain
/// back to the root cause.
pub(crate) fn create_component(container: &Container, name: &str) -> Result<Arc<dyn Component>> {
    let merged = container.merged_definition(name)?;
    container.begin_creation(name)?;
    let outcome = build_instance(container, name, &merged);
    container.end_creation(name);
    outcome.map_err(|err| {
        LifecycleError::CreationFailure {
            name: name.to_string(),
            source: Box::new(err),
        }
        .into()
    })
}

/// A hook returning `None` stops the remaining hooks of that chain; the
/// current instance passes through unchanged and the init method still runs.
fn build_instance(
    container: &Container,
    name: &str,
    definition: &ComponentDefinition,
) -> Result<Arc<dyn Component>> {
    let mut resolved = ResolvedValues::new();
    for (key, value) in &definition.values {
        match value {
            PropertyValue::Literal(literal) => {
                resolved.push(key.clone(), ResolvedValue::Literal(literal.clone()));
            }
            PropertyValue::Ref(target) => {
                let dependency = container.get(target)?;
                resolved.push(key.clone(), ResolvedValue::Component(dependency));
            }
        }
    }

    let mut instance = (definition.factory)(&resolved)?;
    log::debug!("Instantiated component '{name}'");

    for processor in container.instance_processors() {
        match processor.before_init(Arc::clone(&instance), name, container)? {
            Some(next) => instance = next,
            None => break,
        }
    }

    if let Some(method) = &definition.init_method {
        if let Err(err) = instance.dispatch(method, &[]) {
            return Err(LifecycleError::InitMethodFailed {
                name: name.to_string(),
                method: method.clone(),
                source: Box::new(err),
            }
            .into());
        }
    }

    for processor in container.instance_processors() {
        match processor.after_init(Arc::clone(&instance), name, container)? {
            Some(next) => instance = next,
            None => break,
        }
    }

    Ok(instance)
}

/// Run the destruction protocol for one singleton: before-destruction hooks
/// in reverse registration order, then the declared destroy method. Errors
/// are logged, never propagated, so one failing component cannot block the
/// rest of the shutdown.
pub(crate) fn destroy_component(
    container: &Container,
    name: &str,
    instance: &Arc<dyn Component>,
    definition: &ComponentDefinition,
) {
    for processor in container.instance_processors().iter().rev() {
        processor.before_destruction(instance, name, container);
    }
    if let Some(method) = &definition.destroy_method {
        if let Err(err) = instance.dispatch(method, &[]) {
            log::warn!("Destroy method '{method}' failed on component '{name}': {err}");
        }
    }
}
