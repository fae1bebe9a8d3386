//! # Armature Core Processor Registration
//!
//! Installs instance post-processors on the container in the canonical
//! order: the count checker first, then priority-ordered, explicitly
//! ordered, and unordered processors, merged-definition processors
//! re-registered at the tail, and the listener detector last so it sees
//! whatever proxies the earlier hooks produced.
use std::sync::Arc;

use crate::container::Container;
use crate::container::component::Component;
use crate::container::error::Result;
use crate::lifecycle::traits::{InstancePostProcessor, MergedDefinitionPostProcessor};
use crate::processor::error::ProcessorError;
use crate::processor::traits::ProcessorOrder;

/// Discover, sort, and install every instance post-processor the
/// definitions declare.
pub(crate) fn register_instance_post_processors(container: &Container) -> Result<()> {
    let discovered = container.instance_processor_names();
    let target = container.instance_processor_count() + 1 + discovered.len();
    container.add_instance_post_processor(Arc::new(ProcessorCountChecker::new(target)));

    let mut priority: Vec<&(String, ProcessorOrder, bool)> = Vec::new();
    let mut explicit: Vec<&(String, ProcessorOrder, bool)> = Vec::new();
    let mut unordered: Vec<&(String, ProcessorOrder, bool)> = Vec::new();
    for entry in &discovered {
        match entry.1 {
            ProcessorOrder::Priority(_) => priority.push(entry),
            ProcessorOrder::Explicit(_) => explicit.push(entry),
            ProcessorOrder::Unordered => unordered.push(entry),
        }
    }
    priority.sort_by_key(|entry| entry.1.value());
    explicit.sort_by_key(|entry| entry.1.value());

    let mut merged_declared: Vec<(String, ProcessorOrder)> = Vec::new();
    for entry in priority.into_iter().chain(explicit).chain(unordered) {
        let (name, order, is_merged) = entry;
        let processor = resolve_instance_processor(container, name)?;
        container.add_instance_post_processor(processor);
        if *is_merged {
            merged_declared.push((name.clone(), *order));
        }
    }

    merged_declared.sort_by_key(|(_, order)| order.sort_key());
    for (name, _) in &merged_declared {
        let component = container.get(name)?;
        let instance_processor = Arc::clone(&component)
            .as_instance_processor()
            .ok_or_else(|| ProcessorError::NotInstanceCapable { name: name.clone() })?;
        let merged_processor = component
            .as_merged_processor()
            .ok_or_else(|| ProcessorError::NotMergedCapable { name: name.clone() })?;
        // Re-registration moves an already installed processor to the tail.
        container.add_instance_post_processor(instance_processor);
        container.add_merged_processor(merged_processor);
    }

    container.add_instance_post_processor(Arc::new(ListenerDetector::new()));
    Ok(())
}

fn resolve_instance_processor(
    container: &Container,
    name: &str,
) -> Result<Arc<dyn InstancePostProcessor>> {
    let component = container.get(name)?;
    component
        .as_instance_processor()
        .ok_or_else(|| ProcessorError::NotInstanceCapable { name: name.to_string() }.into())
}

/// Logs an informational message when an ordinary component is created
/// before the processor chain is complete, and therefore misses some of
/// the instance post-processors.
pub struct ProcessorCountChecker {
    target: usize,
}

impl ProcessorCountChecker {
    pub fn new(target: usize) -> Self {
        Self { target }
    }
}

impl InstancePostProcessor for ProcessorCountChecker {
    fn processor_name(&self) -> &str {
        "processor-count-checker"
    }

    fn after_init(
        &self,
        instance: Arc<dyn Component>,
        name: &str,
        container: &Container,
    ) -> Result<Option<Arc<dyn Component>>> {
        if !container.is_processor_definition(name)
            && !container.is_infrastructure(name)
            && container.instance_processor_count() < self.target
        {
            log::info!(
                "Component '{name}' is not eligible for getting processed by all \
                 instance post-processors (for example: not eligible for auto-proxying)"
            );
        }
        Ok(Some(instance))
    }
}

/// Registers created singletons that expose the listener capability for
/// container events, and unregisters them on destruction.
///
/// Installed last so that it inspects the final, possibly proxied,
/// instance.
#[derive(Default)]
pub struct ListenerDetector;

impl ListenerDetector {
    pub fn new() -> Self {
        Self
    }
}

impl InstancePostProcessor for ListenerDetector {
    fn processor_name(&self) -> &str {
        "listener-detector"
    }

    fn after_init(
        &self,
        instance: Arc<dyn Component>,
        name: &str,
        container: &Container,
    ) -> Result<Option<Arc<dyn Component>>> {
        if container.is_singleton(name) {
            if let Some(listener) = Arc::clone(&instance).as_listener() {
                container.add_listener(name, listener);
            }
        }
        Ok(Some(instance))
    }

    fn before_destruction(
        &self,
        _instance: &Arc<dyn Component>,
        name: &str,
        container: &Container,
    ) {
        container.remove_listener(name);
    }
}
