//! # Armature Core Definition Store
//!
//! [`DefinitionStore`] holds every [`ComponentDefinition`] the container
//! knows about, in registration order, together with the alias map and the
//! merged-definition cache.
//!
//! The store enforces the overriding policy (duplicate registration with
//! overriding disabled is rejected), keeps aliases from shadowing definition
//! names, and freezes a definition once its component has been instantiated.
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use crate::registry::definition::ComponentDefinition;
use crate::registry::error::RegistryError;

struct DefinitionEntry {
    definition: ComponentDefinition,
    frozen: bool,
}

#[derive(Default)]
struct StoreInner {
    order: Vec<String>,
    definitions: HashMap<String, DefinitionEntry>,
    aliases: HashMap<String, String>,
    merged: HashMap<String, std::sync::Arc<ComponentDefinition>>,
    allow_overriding: bool,
}

/// Thread-safe registry of component definitions.
pub struct DefinitionStore {
    inner: RwLock<StoreInner>,
}

impl Default for DefinitionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for DefinitionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("DefinitionStore")
            .field("definition_count", &inner.order.len())
            .field("alias_count", &inner.aliases.len())
            .field("allow_overriding", &inner.allow_overriding)
            .finish()
    }
}

impl DefinitionStore {
    /// Create an empty store. Definition overriding is allowed by default.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(StoreInner {
                allow_overriding: true,
                ..StoreInner::default()
            }),
        }
    }

    pub fn set_allow_overriding(&self, allow: bool) {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .allow_overriding = allow;
    }

    pub fn allow_overriding(&self) -> bool {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .allow_overriding
    }

    /// Register a definition under its name, together with its declared
    /// aliases.
    pub fn register(&self, definition: ComponentDefinition) -> Result<(), RegistryError> {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let name = definition.name.clone();

        if let Some(target) = inner.aliases.get(&name).cloned() {
            if !inner.allow_overriding {
                return Err(RegistryError::AliasConflict {
                    alias: name,
                    existing: target,
                });
            }
            inner.aliases.remove(&name);
        }

        if let Some(entry) = inner.definitions.get(&name) {
            if entry.frozen {
                return Err(RegistryError::DefinitionFrozen { name });
            }
            if !inner.allow_overriding {
                return Err(RegistryError::DuplicateDefinition { name });
            }
            log::debug!("Overriding component definition '{name}'");
        } else {
            inner.order.push(name.clone());
        }

        let aliases = definition.aliases.clone();
        inner.merged.remove(&name);
        inner.definitions.insert(
            name.clone(),
            DefinitionEntry {
                definition,
                frozen: false,
            },
        );
        drop(inner);

        for alias in aliases {
            self.register_alias(&alias, &name)?;
        }
        Ok(())
    }

    /// Register `alias` as an alternative name for `canonical`.
    ///
    /// An alias may not shadow a definition name, point back at itself
    /// through a chain, or silently replace another alias while overriding
    /// is disabled.
    pub fn register_alias(&self, alias: &str, canonical: &str) -> Result<(), RegistryError> {
        if alias == canonical {
            return Ok(());
        }
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if inner.definitions.contains_key(alias) {
            return Err(RegistryError::AliasConflict {
                alias: alias.to_string(),
                existing: alias.to_string(),
            });
        }
        if resolve_alias(&inner.aliases, canonical) == alias {
            return Err(RegistryError::AliasConflict {
                alias: alias.to_string(),
                existing: canonical.to_string(),
            });
        }
        if let Some(existing) = inner.aliases.get(alias) {
            if existing == canonical {
                return Ok(());
            }
            if !inner.allow_overriding {
                return Err(RegistryError::AliasConflict {
                    alias: alias.to_string(),
                    existing: existing.clone(),
                });
            }
        }
        inner
            .aliases
            .insert(alias.to_string(), canonical.to_string());
        Ok(())
    }

    /// Resolve `name` through the alias map to its canonical definition name.
    pub fn canonical_name(&self, name: &str) -> String {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        resolve_alias(&inner.aliases, name)
    }

    /// Whether a definition (not an alias) is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .definitions
            .contains_key(name)
    }

    /// Definition names in registration order.
    pub fn names(&self) -> Vec<String> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .order
            .clone()
    }

    pub fn len(&self) -> usize {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .order
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of the definition registered under `name` (alias-aware).
    pub fn definition(&self, name: &str) -> Option<ComponentDefinition> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        let canonical = resolve_alias(&inner.aliases, name);
        inner
            .definitions
            .get(&canonical)
            .map(|e| e.definition.clone())
    }

    /// Mutate the definition registered under `name` in place.
    ///
    /// Fails once the definition is frozen. Invalidates the merged copy.
    pub fn update<F>(&self, name: &str, mutate: F) -> Result<(), RegistryError>
    where
        F: FnOnce(&mut ComponentDefinition),
    {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let canonical = resolve_alias(&inner.aliases, name);
        let entry = inner.definitions.get_mut(&canonical).ok_or_else(|| {
            RegistryError::UnknownDefinition {
                name: name.to_string(),
            }
        })?;
        if entry.frozen {
            return Err(RegistryError::DefinitionFrozen { name: canonical });
        }
        mutate(&mut entry.definition);
        inner.merged.remove(&canonical);
        Ok(())
    }

    /// Freeze the definition under `name`. Called on first instantiation.
    pub fn freeze(&self, name: &str) {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let canonical = resolve_alias(&inner.aliases, name);
        if let Some(entry) = inner.definitions.get_mut(&canonical) {
            entry.frozen = true;
        }
    }

    pub fn is_frozen(&self, name: &str) -> bool {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        let canonical = resolve_alias(&inner.aliases, name);
        inner
            .definitions
            .get(&canonical)
            .is_some_and(|e| e.frozen)
    }

    /// Cached merged copy of the definition, if one has been computed.
    pub fn merged(&self, name: &str) -> Option<std::sync::Arc<ComponentDefinition>> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        let canonical = resolve_alias(&inner.aliases, name);
        inner.merged.get(&canonical).cloned()
    }

    pub fn store_merged(&self, name: &str, merged: std::sync::Arc<ComponentDefinition>) {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let canonical = resolve_alias(&inner.aliases, name);
        inner.merged.insert(canonical, merged);
    }

    /// Drop every cached merged definition. Invoked after the definition
    /// post-processing phase so later creations see post-processed metadata.
    pub fn clear_metadata_cache(&self) {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .merged
            .clear();
    }

    /// Aliases currently pointing (directly) at `name`.
    pub fn aliases_of(&self, name: &str) -> Vec<String> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner
            .aliases
            .iter()
            .filter(|(_, target)| target.as_str() == name)
            .map(|(alias, _)| alias.clone())
            .collect()
    }
}

fn resolve_alias(aliases: &HashMap<String, String>, name: &str) -> String {
    let mut current = name.to_string();
    let mut hops = 0;
    while let Some(target) = aliases.get(&current) {
        current = target.clone();
        hops += 1;
        // Cycles are rejected at registration; the hop cap is a backstop.
        if hops > aliases.len() {
            break;
        }
    }
    current
}
