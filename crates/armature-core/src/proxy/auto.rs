//! # Armature Core Auto-Proxying
//!
//! The after-init hook that wires advisor discovery into component
//! creation: every eligible component is checked against the advisors the
//! container knows about, and wrapped in a proxy when any apply.
use std::sync::Arc;

use crate::advisor::retrieval::AdvisorRetrievalHelper;
use crate::aspect::scanner::AspectAdvisorsBuilder;
use crate::container::Container;
use crate::container::component::Component;
use crate::container::error::Result;
use crate::lifecycle::traits::InstancePostProcessor;

/// Definition name the auto-proxy processor is registered under.
pub const AUTO_PROXY_PROCESSOR_NAME: &str = "auto-proxy-processor";

/// Instance post-processor that replaces eligible components with advised
/// proxies after initialization.
///
/// Infrastructure components, declared advisor components, components
/// declaring a processor capability, and aspect components themselves are
/// never proxied.
#[derive(Debug, Default)]
pub struct AutoProxyProcessor {
    scanner: AspectAdvisorsBuilder,
    retrieval: AdvisorRetrievalHelper,
}

impl AutoProxyProcessor {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Component for AutoProxyProcessor {
    fn as_instance_processor(self: Arc<Self>) -> Option<Arc<dyn InstancePostProcessor>> {
        Some(self)
    }
}

impl InstancePostProcessor for AutoProxyProcessor {
    fn processor_name(&self) -> &str {
        AUTO_PROXY_PROCESSOR_NAME
    }

    fn after_init(
        &self,
        instance: Arc<dyn Component>,
        name: &str,
        container: &Container,
    ) -> Result<Option<Arc<dyn Component>>> {
        let Some(definition) = container.definition(name) else {
            return Ok(Some(instance));
        };
        if definition.is_infrastructure() || definition.advisor || definition.processor.is_some() {
            return Ok(Some(instance));
        }
        let Some(type_name) = definition.type_name else {
            return Ok(Some(instance));
        };
        if container.introspector().introspect(&type_name).is_some() {
            return Ok(Some(instance));
        }

        let mut candidates = self.retrieval.find_advisor_components(container)?;
        candidates.extend(self.scanner.build_aspect_advisors(container)?);
        let applicable: Vec<_> = candidates
            .into_iter()
            .filter(|advisor| advisor.applies_to_type(&type_name))
            .collect();
        if applicable.is_empty() {
            return Ok(Some(instance));
        }

        log::debug!(
            "Auto-proxying component '{name}' with {} advisor(s)",
            applicable.len()
        );
        let proxy =
            container
                .proxy_factory()
                .create_proxy(instance, name, &type_name, applicable)?;
        Ok(Some(proxy))
    }
}
