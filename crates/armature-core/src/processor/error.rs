//! # Armature Core Processor Errors
//!
//! Defines [`ProcessorError`] for the definition post-processing pipeline.
//! A failing callback aborts the dispatch; work already completed is not
//! rolled back.
use crate::container::error::Error;

#[derive(Debug, thiserror::Error)]
pub enum ProcessorError {
    #[error("Post-processor '{processor}' failed: {source}")]
    CallbackFailed {
        processor: String,
        #[source]
        source: Box<Error>,
    },

    #[error("Component '{name}' declares the registry post-processor capability but does not expose it")]
    NotRegistryCapable { name: String },

    #[error("Component '{name}' declares the definition post-processor capability but does not expose it")]
    NotDefinitionCapable { name: String },

    #[error("Component '{name}' declares the instance post-processor capability but does not expose it")]
    NotInstanceCapable { name: String },

    #[error("Component '{name}' declares the merged-definition capability but does not expose it")]
    NotMergedCapable { name: String },

    #[error("Definition post-processor discovery did not reach a fixed point within {rounds} rounds")]
    DiscoveryLoop { rounds: usize },
}
