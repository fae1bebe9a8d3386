use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::aspect::error::AspectError;
use crate::aspect::instance::{
    AspectInstanceFactory, ContainerAspectInstanceFactory, PrototypeAspectInstanceFactory,
    SharedAspectInstanceFactory,
};
use crate::aspect::introspect::AspectIntrospection;
use crate::aspect::metadata::AspectMetadata;
use crate::container::Container;
use crate::container::component::Component;
use crate::container::error::{Error, Result};
use crate::registry::definition::{ComponentDefinition, Scope};

#[derive(Debug)]
struct NullAspect;

impl Component for NullAspect {}

fn metadata() -> AspectMetadata {
    AspectMetadata::new(
        "audit",
        "AuditAspect",
        Arc::new(AspectIntrospection::singleton()),
    )
    .unwrap()
}

#[test]
fn test_container_factory_resolves_the_named_component() {
    let container = Container::new();
    let aspect = Arc::new(NullAspect);
    container
        .register(ComponentDefinition::from_instance(
            "audit",
            Arc::clone(&aspect) as Arc<dyn Component>,
        ))
        .unwrap();

    let factory = ContainerAspectInstanceFactory::new(container.weak_handle(), "audit", metadata());
    let instance = factory.aspect_instance().unwrap();
    assert!(Arc::ptr_eq(&instance, &container.get("audit").unwrap()));
    assert_eq!(factory.metadata().aspect_name, "audit");
}

#[test]
fn test_container_factory_fails_once_the_container_is_gone() {
    let container = Container::new();
    let factory = ContainerAspectInstanceFactory::new(container.weak_handle(), "audit", metadata());
    drop(container);

    let err = factory.aspect_instance().err().unwrap();
    assert!(matches!(
        err,
        Error::Aspect(AspectError::InstanceUnavailable { ref aspect, .. }) if aspect == "audit"
    ));
}

#[test]
fn test_prototype_factory_rejects_singleton_scope() {
    let container = Container::new();
    container
        .register(ComponentDefinition::from_instance(
            "audit",
            Arc::new(NullAspect) as Arc<dyn Component>,
        ))
        .unwrap();

    let err = PrototypeAspectInstanceFactory::new(container.weak_handle(), "audit", metadata())
        .unwrap_err();
    assert!(matches!(
        err,
        AspectError::NonSingletonAspectOnSingleton { ref aspect } if aspect == "audit"
    ));
}

#[test]
fn test_prototype_factory_creates_fresh_instances() {
    let container = Container::new();
    let builds = Arc::new(AtomicUsize::new(0));
    let factory_builds = Arc::clone(&builds);
    container
        .register(
            ComponentDefinition::new(
                "audit",
                Arc::new(move |_| {
                    factory_builds.fetch_add(1, Ordering::SeqCst);
                    Ok(Arc::new(NullAspect) as Arc<dyn Component>)
                }),
            )
            .with_scope(Scope::Prototype),
        )
        .unwrap();

    let factory =
        PrototypeAspectInstanceFactory::new(container.weak_handle(), "audit", metadata()).unwrap();
    let first = factory.aspect_instance().unwrap();
    let second = factory.aspect_instance().unwrap();
    assert!(!Arc::ptr_eq(&first, &second));
    assert_eq!(builds.load(Ordering::SeqCst), 2);
}

struct CountingFactory {
    metadata: AspectMetadata,
    creations: AtomicUsize,
}

impl AspectInstanceFactory for CountingFactory {
    fn aspect_instance(&self) -> Result<Arc<dyn Component>> {
        self.creations.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(NullAspect))
    }

    fn metadata(&self) -> &AspectMetadata {
        &self.metadata
    }
}

#[test]
fn test_shared_factory_creates_the_instance_at_most_once() {
    let inner = Arc::new(CountingFactory {
        metadata: metadata(),
        creations: AtomicUsize::new(0),
    });
    let shared =
        SharedAspectInstanceFactory::new(Arc::clone(&inner) as Arc<dyn AspectInstanceFactory>);

    let first = shared.aspect_instance().unwrap();
    let second = shared.aspect_instance().unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(inner.creations.load(Ordering::SeqCst), 1);
}

#[test]
fn test_shared_factory_creates_once_under_contention() {
    let inner = Arc::new(CountingFactory {
        metadata: metadata(),
        creations: AtomicUsize::new(0),
    });
    let shared = Arc::new(SharedAspectInstanceFactory::new(
        Arc::clone(&inner) as Arc<dyn AspectInstanceFactory>,
    ));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let shared = Arc::clone(&shared);
            std::thread::spawn(move || {
                shared.aspect_instance().unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(inner.creations.load(Ordering::SeqCst), 1);
}
