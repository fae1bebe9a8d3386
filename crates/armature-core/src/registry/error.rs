//! # Armature Core Registry Errors
//!
//! Defines [`RegistryError`], covering definition registration, alias
//! management, and the freezing rule that protects definitions once their
//! component has been instantiated.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("A definition named '{name}' is already registered and overriding is disabled")]
    DuplicateDefinition { name: String },

    #[error("Definition '{name}' is frozen and can no longer be modified")]
    DefinitionFrozen { name: String },

    #[error("Alias '{alias}' conflicts with an existing registration for '{existing}'")]
    AliasConflict { alias: String, existing: String },

    #[error("No definition registered under the name '{name}'")]
    UnknownDefinition { name: String },
}
