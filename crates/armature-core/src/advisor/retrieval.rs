//! # Armature Core Advisor Retrieval
//!
//! Discovery of components whose definitions declare the advisor
//! capability.
//!
//! Discovery itself never instantiates anything: the candidate name list is
//! computed from definitions and cached. Resolution then goes through the
//! container, skipping advisors that are part of a creation cycle so that a
//! component being auto-proxied can reference an advisor that (directly or
//! transitively) references it back.
use std::sync::{PoisonError, RwLock};

use crate::advisor::Advisor;
use crate::advisor::error::AdvisorError;
use crate::container::Container;
use crate::container::error::Result;

/// Finds declared advisor components, caching the candidate name list after
/// the first scan.
#[derive(Default)]
pub struct AdvisorRetrievalHelper {
    cached_names: RwLock<Option<Vec<String>>>,
}

impl std::fmt::Debug for AdvisorRetrievalHelper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let cached = self
            .cached_names
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("AdvisorRetrievalHelper")
            .field("cached_names", &*cached)
            .finish()
    }
}

impl AdvisorRetrievalHelper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve every declared advisor component currently resolvable.
    ///
    /// Advisors currently in creation are skipped with a trace log. A
    /// creation failure whose root cause is a currently-in-creation
    /// conflict is likewise skipped; any other error propagates.
    pub fn find_advisor_components(&self, container: &Container) -> Result<Vec<std::sync::Arc<Advisor>>> {
        let names = {
            self.cached_names
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        };
        let names = match names {
            Some(names) => names,
            None => {
                let mut guard = self
                    .cached_names
                    .write()
                    .unwrap_or_else(PoisonError::into_inner);
                match &*guard {
                    Some(names) => names.clone(),
                    None => {
                        let scanned: Vec<String> = container
                            .definition_names()
                            .into_iter()
                            .filter(|name| {
                                container
                                    .definition(name)
                                    .is_some_and(|def| def.advisor)
                            })
                            .collect();
                        *guard = Some(scanned.clone());
                        scanned
                    }
                }
            }
        };

        if names.is_empty() {
            return Ok(Vec::new());
        }

        let mut advisors = Vec::new();
        for name in &names {
            if container.is_in_creation(name) {
                log::trace!("Skipping currently created advisor '{name}'");
                continue;
            }
            match container.get(name) {
                Ok(component) => {
                    let advisor = component.as_advisor().ok_or_else(|| {
                        AdvisorError::NotAnAdvisor { name: name.clone() }
                    })?;
                    advisors.push(advisor);
                }
                Err(err) if err.is_creation_conflict() => {
                    log::trace!("Skipping advisor '{name}' with circular creation: {err}");
                    continue;
                }
                Err(err) => return Err(err),
            }
        }
        Ok(advisors)
    }
}
