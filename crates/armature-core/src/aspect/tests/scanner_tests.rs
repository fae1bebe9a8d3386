use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::advisor::Advisor;
use crate::advisor::invoke::JoinPoint;
use crate::aspect::error::AspectError;
use crate::aspect::introspect::{
    AdviceBody, AdviceMethod, AspectIntrospection, AspectIntrospector, StaticIntrospector,
};
use crate::aspect::metadata::AdviceKind;
use crate::aspect::scanner::AspectAdvisorsBuilder;
use crate::container::Container;
use crate::container::component::Component;
use crate::container::error::Error;
use crate::registry::definition::{ComponentDefinition, Scope};

#[derive(Debug)]
struct NullAspect;

impl Component for NullAspect {}

#[derive(Debug)]
struct Marker;

impl Component for Marker {}

fn before(name: &str) -> AdviceMethod {
    AdviceMethod::new(name, AdviceKind::Before, "execution(*Service::*)").with_body(
        AdviceBody::Before(Arc::new(
            |_aspect: Arc<dyn Component>, _jp: &JoinPoint| Ok(()),
        )),
    )
}

fn method_name(advisor: &Advisor) -> &str {
    match advisor {
        Advisor::Pointcut(advisor) => &advisor.method_name,
        Advisor::Introduction(_) => panic!("expected a pointcut advisor"),
    }
}

fn aspect_definition(name: &str, type_name: &str) -> ComponentDefinition {
    ComponentDefinition::from_instance(name, Arc::new(NullAspect) as Arc<dyn Component>)
        .with_type_name(type_name)
}

fn singleton_aspect_container() -> Arc<Container> {
    let container = Container::new();
    container.set_introspector(Arc::new(StaticIntrospector::new().with_aspect(
        "AuditAspect",
        AspectIntrospection::singleton().with_advice(before("audit")),
    )));
    container
}

#[test]
fn test_scan_discovers_aspects_and_caches_the_name_list() {
    let container = singleton_aspect_container();
    container
        .register(aspect_definition("audit", "AuditAspect"))
        .unwrap();
    container
        .register(
            ComponentDefinition::from_instance("svc", Arc::new(Marker) as Arc<dyn Component>)
                .with_type_name("OrderService"),
        )
        .unwrap();

    let builder = AspectAdvisorsBuilder::new();
    let advisors = builder.build_aspect_advisors(&container).unwrap();
    assert_eq!(advisors.len(), 1);
    assert!(builder.is_aspect_component("audit"));
    assert!(!builder.is_aspect_component("svc"));

    container
        .register(aspect_definition("latecomer", "AuditAspect"))
        .unwrap();
    assert_eq!(builder.build_aspect_advisors(&container).unwrap().len(), 1);
}

#[test]
fn test_singleton_scoped_aspect_advisors_are_served_from_cache() {
    let container = singleton_aspect_container();
    container
        .register(aspect_definition("audit", "AuditAspect"))
        .unwrap();

    let builder = AspectAdvisorsBuilder::new();
    let first = builder.build_aspect_advisors(&container).unwrap();
    let second = builder.build_aspect_advisors(&container).unwrap();
    assert_eq!(first.len(), 1);
    assert!(Arc::ptr_eq(&first[0], &second[0]));
}

#[test]
fn test_prototype_scoped_aspect_rebuilds_advisors_per_retrieval() {
    let container = singleton_aspect_container();
    container
        .register(aspect_definition("audit", "AuditAspect").with_scope(Scope::Prototype))
        .unwrap();

    let builder = AspectAdvisorsBuilder::new();
    let first = builder.build_aspect_advisors(&container).unwrap();
    let second = builder.build_aspect_advisors(&container).unwrap();
    assert_eq!(first.len(), 1);
    assert_eq!(second.len(), 1);
    assert!(!Arc::ptr_eq(&first[0], &second[0]));
}

#[test]
fn test_per_target_aspect_on_singleton_definition_is_rejected() {
    let container = Container::new();
    container.set_introspector(Arc::new(StaticIntrospector::new().with_aspect(
        "AuditAspect",
        AspectIntrospection::per_target("execution(*Service::*)").with_advice(before("audit")),
    )));
    container
        .register(aspect_definition("audit", "AuditAspect"))
        .unwrap();

    let builder = AspectAdvisorsBuilder::new();
    let err = builder.build_aspect_advisors(&container).unwrap_err();
    assert!(matches!(
        err,
        Error::Aspect(AspectError::NonSingletonAspectOnSingleton { ref aspect }) if aspect == "audit"
    ));
}

#[test]
fn test_per_target_aspect_on_prototype_definition_builds_lazily() {
    let container = Container::new();
    container.set_introspector(Arc::new(StaticIntrospector::new().with_aspect(
        "AuditAspect",
        AspectIntrospection::per_target("execution(*Service::*)").with_advice(before("audit")),
    )));
    container
        .register(aspect_definition("audit", "AuditAspect").with_scope(Scope::Prototype))
        .unwrap();

    let builder = AspectAdvisorsBuilder::new();
    let advisors = builder.build_aspect_advisors(&container).unwrap();
    assert_eq!(advisors.len(), 2);
    assert_eq!(method_name(&advisors[0]), "instantiate");
    assert_eq!(method_name(&advisors[1]), "audit");
    assert!(builder.is_aspect_component("audit"));
}

#[test]
fn test_eligibility_predicate_filters_the_scan() {
    let container = singleton_aspect_container();
    container
        .register(aspect_definition("audit", "AuditAspect"))
        .unwrap();

    let builder = AspectAdvisorsBuilder::new().with_eligibility(|name| name != "audit");
    assert!(builder.build_aspect_advisors(&container).unwrap().is_empty());
    assert!(!builder.is_aspect_component("audit"));
}

struct CountingIntrospector {
    inner: StaticIntrospector,
    calls: AtomicUsize,
}

impl AspectIntrospector for CountingIntrospector {
    fn introspect(&self, type_name: &str) -> Option<Arc<AspectIntrospection>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.introspect(type_name)
    }
}

#[test]
fn test_concurrent_first_builds_scan_only_once() {
    let container = Container::new();
    let introspector = Arc::new(CountingIntrospector {
        inner: StaticIntrospector::new().with_aspect(
            "AuditAspect",
            AspectIntrospection::singleton().with_advice(before("audit")),
        ),
        calls: AtomicUsize::new(0),
    });
    container.set_introspector(Arc::clone(&introspector) as Arc<dyn AspectIntrospector>);
    container
        .register(aspect_definition("audit", "AuditAspect"))
        .unwrap();

    let builder = Arc::new(AspectAdvisorsBuilder::new());
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let builder = Arc::clone(&builder);
            let container = Arc::clone(&container);
            std::thread::spawn(move || builder.build_aspect_advisors(&container).unwrap().len())
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), 1);
    }
    assert_eq!(introspector.calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_definitions_without_a_type_name_are_skipped() {
    let container = singleton_aspect_container();
    container
        .register(ComponentDefinition::from_instance(
            "audit",
            Arc::new(NullAspect) as Arc<dyn Component>,
        ))
        .unwrap();

    let builder = AspectAdvisorsBuilder::new();
    assert!(builder.build_aspect_advisors(&container).unwrap().is_empty());
    assert!(!builder.is_aspect_component("audit"));
}
