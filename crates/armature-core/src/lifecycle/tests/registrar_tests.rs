use std::sync::{Arc, Mutex};

use serde_json::Value;

use crate::container::Container;
use crate::container::component::Component;
use crate::container::listener::{ContainerEvent, ContainerListener};
use crate::lifecycle::registrar::{self, ProcessorCountChecker};
use crate::lifecycle::traits::{InstancePostProcessor, MergedDefinitionPostProcessor};
use crate::processor::traits::{ProcessorKind, ProcessorOrder};
use crate::registry::definition::{ComponentDefinition, ProcessorDeclaration};

type Log = Arc<Mutex<Vec<String>>>;

fn new_log() -> Log {
    Arc::new(Mutex::new(Vec::new()))
}

fn entries(log: &Log) -> Vec<String> {
    log.lock().unwrap().clone()
}

struct HookComponent {
    name: String,
}

impl Component for HookComponent {
    fn as_instance_processor(self: Arc<Self>) -> Option<Arc<dyn InstancePostProcessor>> {
        Some(self)
    }
}

impl InstancePostProcessor for HookComponent {
    fn processor_name(&self) -> &str {
        &self.name
    }
}

fn hook_definition(name: &str, order: ProcessorOrder) -> ComponentDefinition {
    ComponentDefinition::from_instance(
        name,
        Arc::new(HookComponent {
            name: name.to_string(),
        }) as Arc<dyn Component>,
    )
    .as_processor(ProcessorDeclaration {
        kind: ProcessorKind::Instance { merged: false },
        order,
    })
}

struct MergedHook {
    name: String,
    log: Log,
}

impl Component for MergedHook {
    fn as_instance_processor(self: Arc<Self>) -> Option<Arc<dyn InstancePostProcessor>> {
        Some(self)
    }

    fn as_merged_processor(self: Arc<Self>) -> Option<Arc<dyn MergedDefinitionPostProcessor>> {
        Some(self)
    }
}

impl InstancePostProcessor for MergedHook {
    fn processor_name(&self) -> &str {
        &self.name
    }
}

impl MergedDefinitionPostProcessor for MergedHook {
    fn processor_name(&self) -> &str {
        &self.name
    }

    fn post_process_merged_definition(&self, definition: &mut ComponentDefinition, name: &str) {
        self.log.lock().unwrap().push(format!("merged:{name}"));
        definition.lazy_init = true;
    }
}

fn merged_hook_definition(name: &str, order: ProcessorOrder, log: &Log) -> ComponentDefinition {
    ComponentDefinition::from_instance(
        name,
        Arc::new(MergedHook {
            name: name.to_string(),
            log: Arc::clone(log),
        }) as Arc<dyn Component>,
    )
    .as_processor(ProcessorDeclaration {
        kind: ProcessorKind::Instance { merged: true },
        order,
    })
}

#[derive(Debug)]
struct Marker;

impl Component for Marker {}

fn marker_definition(name: &str) -> ComponentDefinition {
    ComponentDefinition::new(
        name,
        Arc::new(|_| Ok(Arc::new(Marker) as Arc<dyn Component>)),
    )
}

#[test]
fn test_chain_assembled_in_canonical_order() {
    let container = Container::new();
    let log = new_log();
    container
        .register(hook_definition("unordered", ProcessorOrder::Unordered))
        .unwrap();
    container
        .register(hook_definition("explicit-5", ProcessorOrder::Explicit(5)))
        .unwrap();
    container
        .register(merged_hook_definition(
            "merged-3",
            ProcessorOrder::Explicit(3),
            &log,
        ))
        .unwrap();
    container
        .register(hook_definition("explicit-1", ProcessorOrder::Explicit(1)))
        .unwrap();
    container
        .register(hook_definition("priority", ProcessorOrder::Priority(0)))
        .unwrap();

    registrar::register_instance_post_processors(&container).unwrap();

    let names: Vec<String> = container
        .instance_processors()
        .iter()
        .map(|processor| processor.processor_name().to_string())
        .collect();
    assert_eq!(
        names,
        vec![
            "processor-count-checker",
            "priority",
            "explicit-1",
            "explicit-5",
            "unordered",
            "merged-3",
            "listener-detector",
        ]
    );
}

#[test]
fn test_merged_processors_shape_merged_definitions() {
    let container = Container::new();
    let log = new_log();
    container
        .register(merged_hook_definition("m", ProcessorOrder::Unordered, &log))
        .unwrap();
    container.register(marker_definition("svc")).unwrap();

    registrar::register_instance_post_processors(&container).unwrap();

    let merged = container.merged_definition("svc").unwrap();
    assert!(merged.lazy_init);
    assert!(entries(&log).contains(&"merged:svc".to_string()));
    assert!(!container.definition("svc").unwrap().lazy_init);
}

struct EventRecorder {
    log: Log,
}

impl Component for EventRecorder {
    fn as_listener(self: Arc<Self>) -> Option<Arc<dyn ContainerListener>> {
        Some(self)
    }
}

impl ContainerListener for EventRecorder {
    fn on_event(&self, event: &ContainerEvent) {
        self.log.lock().unwrap().push(format!("{event:?}"));
    }
}

#[test]
fn test_listener_detector_wires_and_unwires_singleton_listeners() {
    let container = Container::new();
    let log = new_log();
    container
        .register(ComponentDefinition::from_instance(
            "recorder",
            Arc::new(EventRecorder {
                log: Arc::clone(&log),
            }) as Arc<dyn Component>,
        ))
        .unwrap();

    registrar::register_instance_post_processors(&container).unwrap();
    container.get("recorder").unwrap();

    container.publish_event(&ContainerEvent::Refreshed);
    assert!(entries(&log).iter().any(|entry| entry.contains("Refreshed")));

    container.close();
    let count = entries(&log).len();
    container.publish_event(&ContainerEvent::Custom {
        name: "late".to_string(),
        payload: Value::Null,
    });
    assert_eq!(entries(&log).len(), count);
}

#[test]
fn test_count_checker_passes_instance_through() {
    let container = Container::new();
    container.register(marker_definition("svc")).unwrap();

    let checker = ProcessorCountChecker::new(5);
    let instance: Arc<dyn Component> = Arc::new(Marker);
    let out = checker
        .after_init(Arc::clone(&instance), "svc", &container)
        .unwrap()
        .unwrap();
    assert!(Arc::ptr_eq(&out, &instance));
}
