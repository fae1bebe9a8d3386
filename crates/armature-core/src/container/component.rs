//! # Armature Core Component Trait
//!
//! Defines [`Component`], the trait every container-managed instance
//! implements, together with its capability probes.
//!
//! Rust offers no runtime reflection over trait implementations, so the
//! container never asks "does this type implement X" the way a reflective
//! container would. Instead [`Component`] carries a small set of capability
//! methods with `None`/error defaults; an implementation that opts in
//! overrides the matching probe and hands out a trait object for itself.
use std::any::Any;
use std::sync::Arc;

use serde_json::Value;

use crate::advisor::Advisor;
use crate::container::error::{Error, Result};
use crate::container::listener::ContainerListener;
use crate::lifecycle::traits::{InstancePostProcessor, MergedDefinitionPostProcessor};
use crate::processor::traits::{DefinitionPostProcessor, RegistryPostProcessor};

/// A container-managed instance.
///
/// Components are immutable once constructed; collaborators are delivered to
/// the component factory at construction time, and all later interaction goes
/// through [`dispatch`](Component::dispatch) or a downcast to the concrete
/// type.
pub trait Component: Any + Send + Sync {
    /// Dispatch a named method call on this component.
    ///
    /// This is the seam the lifecycle coordinator uses for declared init and
    /// destroy methods and the proxy layer uses to reach the target. The
    /// default recognizes no methods.
    fn dispatch(&self, method: &str, _args: &[Value]) -> Result<Value> {
        Err(Error::UnknownMethod {
            method: method.to_string(),
        })
    }

    /// Expose this component as a container event listener, if it is one.
    fn as_listener(self: Arc<Self>) -> Option<Arc<dyn ContainerListener>> {
        None
    }

    /// Expose the registry post-processor capability, if declared.
    fn as_registry_processor(self: Arc<Self>) -> Option<Arc<dyn RegistryPostProcessor>> {
        None
    }

    /// Expose the definition post-processor capability, if declared.
    fn as_definition_processor(self: Arc<Self>) -> Option<Arc<dyn DefinitionPostProcessor>> {
        None
    }

    /// Expose the instance post-processor capability, if declared.
    fn as_instance_processor(self: Arc<Self>) -> Option<Arc<dyn InstancePostProcessor>> {
        None
    }

    /// Expose the merged-definition post-processor capability, if declared.
    fn as_merged_processor(self: Arc<Self>) -> Option<Arc<dyn MergedDefinitionPostProcessor>> {
        None
    }

    /// Expose the advisor this component carries, if its definition declared
    /// the advisor capability.
    fn as_advisor(self: Arc<Self>) -> Option<Arc<Advisor>> {
        None
    }
}
