use std::sync::Arc;

use serde_json::{Value, json};

use crate::container::component::Component;
use crate::container::error::Result;
use crate::registry::definition::ComponentDefinition;
use crate::registry::error::RegistryError;
use crate::registry::store::DefinitionStore;

#[derive(Debug)]
struct Widget;

impl Component for Widget {
    fn dispatch(&self, method: &str, _args: &[Value]) -> Result<Value> {
        match method {
            "ping" => Ok(json!("pong")),
            other => Err(crate::container::error::Error::UnknownMethod {
                method: other.to_string(),
            }),
        }
    }
}

fn definition(name: &str) -> ComponentDefinition {
    ComponentDefinition::new(name, Arc::new(|_| Ok(Arc::new(Widget) as Arc<dyn Component>)))
}

#[test]
fn test_register_preserves_order() {
    let store = DefinitionStore::new();
    store.register(definition("a")).unwrap();
    store.register(definition("b")).unwrap();
    store.register(definition("c")).unwrap();
    assert_eq!(store.names(), vec!["a", "b", "c"]);
    assert_eq!(store.len(), 3);
    assert!(!store.is_empty());
    assert!(store.contains("b"));
    assert!(!store.contains("d"));
}

#[test]
fn test_override_allowed_replaces_in_place() {
    let store = DefinitionStore::new();
    store.register(definition("a")).unwrap();
    store.register(definition("b")).unwrap();
    store
        .register(definition("a").with_type_name("Replacement"))
        .unwrap();
    assert_eq!(store.names(), vec!["a", "b"]);
    assert_eq!(
        store.definition("a").unwrap().type_name.as_deref(),
        Some("Replacement")
    );
}

#[test]
fn test_duplicate_rejected_when_overriding_disabled() {
    let store = DefinitionStore::new();
    store.set_allow_overriding(false);
    assert!(!store.allow_overriding());
    store.register(definition("a")).unwrap();
    let err = store.register(definition("a")).unwrap_err();
    assert!(matches!(
        err,
        RegistryError::DuplicateDefinition { name } if name == "a"
    ));
}

#[test]
fn test_frozen_definition_rejects_register_and_update() {
    let store = DefinitionStore::new();
    store.register(definition("a")).unwrap();
    store.freeze("a");
    assert!(store.is_frozen("a"));

    let err = store.register(definition("a")).unwrap_err();
    assert!(matches!(err, RegistryError::DefinitionFrozen { .. }));

    let err = store.update("a", |def| def.lazy_init = true).unwrap_err();
    assert!(matches!(err, RegistryError::DefinitionFrozen { .. }));
    assert!(!store.definition("a").unwrap().lazy_init);
}

#[test]
fn test_update_mutates_and_invalidates_merged() {
    let store = DefinitionStore::new();
    store.register(definition("a")).unwrap();
    store.store_merged("a", Arc::new(definition("a")));
    assert!(store.merged("a").is_some());

    store.update("a", |def| def.lazy_init = true).unwrap();
    assert!(store.definition("a").unwrap().lazy_init);
    assert!(store.merged("a").is_none());

    let err = store.update("missing", |_| {}).unwrap_err();
    assert!(matches!(err, RegistryError::UnknownDefinition { .. }));
}

#[test]
fn test_alias_round_trip() {
    let store = DefinitionStore::new();
    store.register(definition("a")).unwrap();
    store.register_alias("first", "a").unwrap();
    store.register_alias("second", "first").unwrap();

    assert_eq!(store.canonical_name("first"), "a");
    assert_eq!(store.canonical_name("second"), "a");
    assert_eq!(store.canonical_name("a"), "a");
    assert_eq!(store.definition("second").unwrap().name, "a");

    let mut aliases = store.aliases_of("a");
    aliases.sort();
    assert_eq!(aliases, vec!["first".to_string()]);
}

#[test]
fn test_declared_aliases_registered_with_definition() {
    let store = DefinitionStore::new();
    store
        .register(definition("a").with_alias("gadget").with_alias("widget"))
        .unwrap();
    assert_eq!(store.canonical_name("gadget"), "a");
    assert_eq!(store.canonical_name("widget"), "a");
    let mut aliases = store.aliases_of("a");
    aliases.sort();
    assert_eq!(aliases, vec!["gadget".to_string(), "widget".to_string()]);
}

#[test]
fn test_alias_may_not_shadow_definition_name() {
    let store = DefinitionStore::new();
    store.register(definition("a")).unwrap();
    store.register(definition("b")).unwrap();
    let err = store.register_alias("b", "a").unwrap_err();
    assert!(matches!(err, RegistryError::AliasConflict { .. }));
}

#[test]
fn test_alias_cycle_rejected() {
    let store = DefinitionStore::new();
    store.register(definition("a")).unwrap();
    store.register_alias("x", "a").unwrap();
    let err = store.register_alias("a", "x").unwrap_err();
    assert!(matches!(err, RegistryError::AliasConflict { .. }));
}

#[test]
fn test_alias_re_register_idempotent() {
    let store = DefinitionStore::new();
    store.register(definition("a")).unwrap();
    store.register_alias("x", "a").unwrap();
    store.register_alias("x", "a").unwrap();
    assert_eq!(store.canonical_name("x"), "a");

    store.set_allow_overriding(false);
    store.register(definition("b")).unwrap();
    let err = store.register_alias("x", "b").unwrap_err();
    assert!(matches!(
        err,
        RegistryError::AliasConflict { alias, existing }
            if alias == "x" && existing == "a"
    ));
}

#[test]
fn test_self_alias_is_a_no_op() {
    let store = DefinitionStore::new();
    store.register(definition("a")).unwrap();
    store.register_alias("a", "a").unwrap();
    assert!(store.aliases_of("a").is_empty());
}

#[test]
fn test_register_removes_shadowing_alias() {
    let store = DefinitionStore::new();
    store.register(definition("a")).unwrap();
    store.register_alias("x", "a").unwrap();
    store.register(definition("x")).unwrap();
    assert_eq!(store.canonical_name("x"), "x");
    assert!(store.aliases_of("a").is_empty());
}

#[test]
fn test_merged_cache_cleared() {
    let store = DefinitionStore::new();
    store.register(definition("a")).unwrap();
    store.register(definition("b")).unwrap();
    store.store_merged("a", Arc::new(definition("a")));
    store.store_merged("b", Arc::new(definition("b")));
    assert!(store.merged("a").is_some());

    store.clear_metadata_cache();
    assert!(store.merged("a").is_none());
    assert!(store.merged("b").is_none());
}

#[test]
fn test_merged_lookup_is_alias_aware() {
    let store = DefinitionStore::new();
    store.register(definition("a")).unwrap();
    store.register_alias("x", "a").unwrap();
    let merged = Arc::new(definition("a"));
    store.store_merged("x", Arc::clone(&merged));
    assert!(store.merged("a").is_some_and(|m| Arc::ptr_eq(&m, &merged)));
    assert!(store.merged("x").is_some_and(|m| Arc::ptr_eq(&m, &merged)));
}
