//! # Armature Core Lifecycle Hooks
//!
//! The per-instance extension points the coordinator drives around
//! component creation and destruction, and the merged-definition hook that
//! runs before instantiation.
use std::sync::Arc;

use crate::container::Container;
use crate::container::component::Component;
use crate::container::error::Result;
use crate::registry::definition::ComponentDefinition;

/// Hook invoked around every component instance the container creates.
///
/// Both init hooks may replace the instance by returning a different one.
/// Returning `Ok(None)` short-circuits the remaining hooks of the same
/// phase; the current instance passes through unchanged.
pub trait InstancePostProcessor: Send + Sync {
    /// Name used in diagnostics and registration bookkeeping.
    fn processor_name(&self) -> &str;

    fn before_init(
        &self,
        instance: Arc<dyn Component>,
        _name: &str,
        _container: &Container,
    ) -> Result<Option<Arc<dyn Component>>> {
        Ok(Some(instance))
    }

    fn after_init(
        &self,
        instance: Arc<dyn Component>,
        _name: &str,
        _container: &Container,
    ) -> Result<Option<Arc<dyn Component>>> {
        Ok(Some(instance))
    }

    /// Observes a singleton about to be destroyed. Runs in reverse
    /// registration order during container close.
    fn before_destruction(
        &self,
        _instance: &Arc<dyn Component>,
        _name: &str,
        _container: &Container,
    ) {
    }
}

/// Hook invoked on the merged definition of a component right before the
/// coordinator instantiates it. Mutations affect only the cached merged
/// copy, never the registered definition.
pub trait MergedDefinitionPostProcessor: Send + Sync {
    fn processor_name(&self) -> &str;

    fn post_process_merged_definition(&self, definition: &mut ComponentDefinition, name: &str);
}
