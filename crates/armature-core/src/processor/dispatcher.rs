//! # Armature Core Definition Post-Processor Dispatch
//!
//! Multi-round dispatch of definition post-processors over the container.
//!
//! The protocol runs in two phases. Registry callbacks first: supplied
//! registry-capable processors in supplied order, then discovered ones in
//! priority order, then explicitly ordered ones, then repeated discovery
//! rounds until no unprocessed registry-capable definition remains (a
//! processor may register further processors, which later rounds pick up).
//! Plain callbacks second: on every registry-capable processor already run,
//! on the supplied plain processors, and finally on discovered plain
//! processors class by class. The plain phase does not rediscover, so a
//! processor registered during it is never invoked. The store's metadata
//! cache is cleared at the end.
use std::collections::HashSet;
use std::sync::Arc;

use crate::container::Container;
use crate::container::error::{Error, Result};
use crate::processor::error::ProcessorError;
use crate::processor::traits::{
    DefinitionPostProcessor, ProcessorOrder, RegistryPostProcessor, SuppliedProcessor,
};

/// Hard cap on rediscovery rounds. A configuration in which processors keep
/// registering further registry-capable processors never reaches a fixed
/// point; the cap turns that into [`ProcessorError::DiscoveryLoop`].
const MAX_DISCOVERY_ROUNDS: usize = 100;

/// Run the full definition post-processing protocol over `container`.
///
/// Any callback error aborts the dispatch; completed work is not rolled
/// back.
pub fn invoke_definition_post_processors(
    container: &Container,
    supplied: &[SuppliedProcessor],
) -> Result<()> {
    let mut processed: HashSet<String> = HashSet::new();
    // Registry-capable processors whose registry callback has run; they
    // still owe their plain callback in the second phase.
    let mut registry_done: Vec<Arc<dyn DefinitionPostProcessor>> = Vec::new();
    let mut regular: Vec<Arc<dyn DefinitionPostProcessor>> = Vec::new();

    for supplied_processor in supplied {
        match supplied_processor {
            SuppliedProcessor::Registry(p) => {
                log::trace!(
                    "Invoking supplied registry post-processor '{}'",
                    p.processor_name()
                );
                run_registry_callback(p, container)?;
                let as_definition: Arc<dyn DefinitionPostProcessor> = p.clone();
                registry_done.push(as_definition);
            }
            SuppliedProcessor::Definition(p) => regular.push(p.clone()),
        }
    }

    // Priority round.
    let mut current = Vec::new();
    for (name, order) in container.registry_processor_names() {
        if matches!(order, ProcessorOrder::Priority(_)) && !processed.contains(&name) {
            let processor = resolve_registry_processor(container, &name)?;
            processed.insert(name.clone());
            current.push((name, order, processor));
        }
    }
    invoke_registry_round(container, current, &mut registry_done)?;

    // Explicit round.
    let mut current = Vec::new();
    for (name, order) in container.registry_processor_names() {
        if matches!(order, ProcessorOrder::Explicit(_)) && !processed.contains(&name) {
            let processor = resolve_registry_processor(container, &name)?;
            processed.insert(name.clone());
            current.push((name, order, processor));
        }
    }
    invoke_registry_round(container, current, &mut registry_done)?;

    // Rediscovery rounds until fixed point: pick up everything else,
    // including processors registered by earlier callbacks.
    let mut rounds = 0;
    let mut reiterate = true;
    while reiterate {
        rounds += 1;
        if rounds > MAX_DISCOVERY_ROUNDS {
            return Err(ProcessorError::DiscoveryLoop {
                rounds: MAX_DISCOVERY_ROUNDS,
            }
            .into());
        }
        reiterate = false;
        let mut current = Vec::new();
        for (name, order) in container.registry_processor_names() {
            if !processed.contains(&name) {
                let processor = resolve_registry_processor(container, &name)?;
                processed.insert(name.clone());
                current.push((name, order, processor));
                reiterate = true;
            }
        }
        log::trace!("Registry post-processor discovery round {rounds}: {} new", current.len());
        invoke_registry_round(container, current, &mut registry_done)?;
    }

    // Plain phase: registry-capable processors first, then supplied plain
    // processors, then discovered plain processors class by class.
    for processor in &registry_done {
        run_definition_callback(processor, container)?;
    }
    for processor in &regular {
        run_definition_callback(processor, container)?;
    }

    let mut priority = Vec::new();
    let mut explicit = Vec::new();
    let mut unordered = Vec::new();
    for (name, order) in container.definition_processor_names() {
        if processed.contains(&name) {
            continue;
        }
        match order {
            ProcessorOrder::Priority(_) => priority.push((name, order)),
            ProcessorOrder::Explicit(_) => explicit.push((name, order)),
            ProcessorOrder::Unordered => unordered.push((name, order)),
        }
    }
    for group in [priority, explicit, unordered] {
        let mut resolved = Vec::new();
        for (name, order) in group {
            let processor = resolve_definition_processor(container, &name)?;
            resolved.push((name, order, processor));
        }
        resolved.sort_by_key(|(_, order, _)| order.sort_key());
        for (_, _, processor) in &resolved {
            run_definition_callback(processor, container)?;
        }
    }

    // Post-processors may have mutated definition metadata; merged copies
    // computed before this point are stale.
    container.clear_metadata_cache();
    Ok(())
}

fn invoke_registry_round(
    container: &Container,
    mut round: Vec<(String, ProcessorOrder, Arc<dyn RegistryPostProcessor>)>,
    registry_done: &mut Vec<Arc<dyn DefinitionPostProcessor>>,
) -> Result<()> {
    round.sort_by_key(|(_, order, _)| order.sort_key());
    for (name, _, processor) in round {
        log::trace!("Invoking registry post-processor from definition '{name}'");
        run_registry_callback(&processor, container)?;
        let as_definition: Arc<dyn DefinitionPostProcessor> = processor;
        registry_done.push(as_definition);
    }
    Ok(())
}

fn resolve_registry_processor(
    container: &Container,
    name: &str,
) -> Result<Arc<dyn RegistryPostProcessor>> {
    let component = container.get(name)?;
    component.as_registry_processor().ok_or_else(|| {
        ProcessorError::NotRegistryCapable {
            name: name.to_string(),
        }
        .into()
    })
}

fn resolve_definition_processor(
    container: &Container,
    name: &str,
) -> Result<Arc<dyn DefinitionPostProcessor>> {
    let component = container.get(name)?;
    component.as_definition_processor().ok_or_else(|| {
        ProcessorError::NotDefinitionCapable {
            name: name.to_string(),
        }
        .into()
    })
}

fn run_registry_callback(
    processor: &Arc<dyn RegistryPostProcessor>,
    container: &Container,
) -> Result<()> {
    processor.post_process_registry(container).map_err(|source| {
        Error::Processor(ProcessorError::CallbackFailed {
            processor: processor.processor_name().to_string(),
            source: Box::new(source),
        })
    })
}

fn run_definition_callback(
    processor: &Arc<dyn DefinitionPostProcessor>,
    container: &Container,
) -> Result<()> {
    processor
        .post_process_definitions(container)
        .map_err(|source| {
            Error::Processor(ProcessorError::CallbackFailed {
                processor: processor.processor_name().to_string(),
                source: Box::new(source),
            })
        })
}
