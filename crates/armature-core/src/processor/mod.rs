//! # Armature Core Extension-Point Dispatcher
//!
//! Definition-level extension points and their dispatch protocol.
//!
//! ## Key Submodules and Responsibilities:
//!
//! - **[`traits`]**: The [`DefinitionPostProcessor`] and
//!   [`RegistryPostProcessor`] callback traits plus the
//!   [`ProcessorOrder`]/[`ProcessorKind`] declaration model.
//! - **[`dispatcher`]**: The multi-round dispatch protocol: supplied
//!   processors, priority/explicit/rediscovery registry rounds with a
//!   fixed-point cap, then the non-re-entrant plain phase.
//! - **[`error`]**: Processor-specific error types ([`ProcessorError`](error::ProcessorError)).
pub mod dispatcher;
pub mod error;
pub mod traits;

pub use dispatcher::invoke_definition_post_processors;
pub use error::ProcessorError;
pub use traits::{
    DefinitionPostProcessor, ProcessorKind, ProcessorOrder, RegistryPostProcessor,
    SuppliedProcessor,
};
