use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde_json::Value;

use crate::advisor::error::AdvisorError;
use crate::advisor::invoke::{Interceptor, Invocation};
use crate::advisor::pointcut::TruePointcut;
use crate::advisor::retrieval::AdvisorRetrievalHelper;
use crate::advisor::{Advisor, PointcutAdvisor};
use crate::container::Container;
use crate::container::component::Component;
use crate::container::error::{Error, Result};
use crate::registry::definition::ComponentDefinition;

struct PassThrough;

impl Interceptor for PassThrough {
    fn invoke(&self, invocation: &mut Invocation<'_>) -> Result<Value> {
        invocation.proceed()
    }
}

fn manual_advisor(aspect_name: &str) -> Arc<Advisor> {
    Arc::new(Advisor::Pointcut(PointcutAdvisor {
        pointcut: Arc::new(TruePointcut),
        interceptor: Arc::new(PassThrough),
        aspect_name: aspect_name.to_string(),
        method_name: "advice".to_string(),
        order: 0,
    }))
}

struct AdvisorHolder {
    advisor: Arc<Advisor>,
}

impl Component for AdvisorHolder {
    fn as_advisor(self: Arc<Self>) -> Option<Arc<Advisor>> {
        Some(Arc::clone(&self.advisor))
    }
}

fn advisor_definition(name: &str, constructions: &Arc<AtomicUsize>) -> ComponentDefinition {
    let constructions = Arc::clone(constructions);
    let advisor = manual_advisor(name);
    ComponentDefinition::new(
        name,
        Arc::new(move |_| {
            constructions.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(AdvisorHolder {
                advisor: Arc::clone(&advisor),
            }) as Arc<dyn Component>)
        }),
    )
    .as_advisor()
}

#[derive(Debug)]
struct Plain;

impl Component for Plain {}

fn counting_definition(name: &str, constructions: &Arc<AtomicUsize>) -> ComponentDefinition {
    let constructions = Arc::clone(constructions);
    ComponentDefinition::new(
        name,
        Arc::new(move |_| {
            constructions.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(Plain) as Arc<dyn Component>)
        }),
    )
}

#[test]
fn test_discovery_never_instantiates_non_advisors() {
    let container = Container::new();
    let advisor_builds = Arc::new(AtomicUsize::new(0));
    let plain_builds = Arc::new(AtomicUsize::new(0));
    container
        .register(counting_definition("svc-a", &plain_builds))
        .unwrap();
    container
        .register(advisor_definition("auditor", &advisor_builds))
        .unwrap();
    container
        .register(counting_definition("svc-b", &plain_builds))
        .unwrap();

    let helper = AdvisorRetrievalHelper::new();
    let advisors = helper.find_advisor_components(&container).unwrap();

    assert_eq!(advisors.len(), 1);
    assert_eq!(advisor_builds.load(Ordering::SeqCst), 1);
    assert_eq!(plain_builds.load(Ordering::SeqCst), 0);
}

#[test]
fn test_candidate_names_cached_after_first_scan() {
    let container = Container::new();
    let builds = Arc::new(AtomicUsize::new(0));
    container
        .register(advisor_definition("auditor", &builds))
        .unwrap();

    let helper = AdvisorRetrievalHelper::new();
    assert_eq!(helper.find_advisor_components(&container).unwrap().len(), 1);

    container
        .register(advisor_definition("latecomer", &builds))
        .unwrap();
    assert_eq!(helper.find_advisor_components(&container).unwrap().len(), 1);
}

#[test]
fn test_advisor_in_creation_is_skipped_then_picked_up() {
    let container = Container::new();
    let builds = Arc::new(AtomicUsize::new(0));
    container
        .register(advisor_definition("auditor", &builds))
        .unwrap();

    let helper = AdvisorRetrievalHelper::new();
    container.begin_creation("auditor").unwrap();
    assert!(helper.find_advisor_components(&container).unwrap().is_empty());

    container.end_creation("auditor");
    assert_eq!(helper.find_advisor_components(&container).unwrap().len(), 1);
}

#[test]
fn test_creation_conflict_root_cause_is_skipped() {
    let container = Container::new();
    let builds = Arc::new(AtomicUsize::new(0));
    container
        .register(counting_definition("svc", &builds))
        .unwrap();
    container
        .register(advisor_definition("auditor", &builds).with_ref("peer", "svc"))
        .unwrap();

    let helper = AdvisorRetrievalHelper::new();
    container.begin_creation("svc").unwrap();
    assert!(helper.find_advisor_components(&container).unwrap().is_empty());

    container.end_creation("svc");
    assert_eq!(helper.find_advisor_components(&container).unwrap().len(), 1);
}

#[test]
fn test_declared_advisor_must_expose_the_capability() {
    let container = Container::new();
    let builds = Arc::new(AtomicUsize::new(0));
    container
        .register(counting_definition("impostor", &builds).as_advisor())
        .unwrap();

    let helper = AdvisorRetrievalHelper::new();
    let err = helper.find_advisor_components(&container).unwrap_err();
    assert!(matches!(
        err,
        Error::Advisor(AdvisorError::NotAnAdvisor { ref name }) if name == "impostor"
    ));
}
