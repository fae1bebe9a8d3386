//! # Armature Core Container
//!
//! The container facade and the vocabulary types every other subsystem
//! speaks: components, events, and the umbrella error.
//!
//! ## Key Submodules and Responsibilities:
//!
//! - **[`bootstrap`]**: [`Container`] itself: definition registry access,
//!   the refresh/get/close lifecycle, singleton caching, processor chains,
//!   and event publication.
//! - **[`component`]**: The [`Component`] trait with its dispatch seam and
//!   capability probes.
//! - **[`listener`]**: [`ContainerEvent`] and [`ContainerListener`].
//! - **[`error`]**: The umbrella [`Error`] type wrapping every subsystem
//!   error, and the crate-wide [`Result`] alias.

pub mod bootstrap;
pub mod component;
pub mod error;
pub mod listener;

pub use bootstrap::Container;
pub use component::Component;
pub use error::{Error, Result};
pub use listener::{ContainerEvent, ContainerListener};
