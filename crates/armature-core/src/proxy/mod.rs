//! # Armature Core Proxy Layer
//!
//! Weaves advisors around components.
//!
//! ## Key Submodules and Responsibilities:
//!
//! - **[`auto`]**: [`AutoProxyProcessor`], the after-init hook that decides
//!   which components get proxied and with which advisors.
//! - This module: the [`ProxyFactory`] capability and [`AdvisedProxy`], the
//!   built-in dispatch-based proxy.
//!
//! A proxy is an ordinary [`Component`] wrapping its target. Method calls
//! arrive through `dispatch`; the proxy answers introduced-interface
//! methods from lazily created mixins and routes everything else through
//! the interceptor chain assembled for that method, terminating in the
//! target's own dispatch.
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use serde_json::Value;

use crate::advisor::invoke::{Interceptor, Invocation, JoinPoint};
use crate::advisor::Advisor;
use crate::container::component::Component;
use crate::container::error::Result;
use crate::container::listener::ContainerListener;

pub mod auto;

pub use auto::AutoProxyProcessor;


/// Produces proxies weaving `advisors` around `target`.
///
/// The default implementation builds an [`AdvisedProxy`]; embedders can
/// install their own factory on the container.
pub trait ProxyFactory: Send + Sync {
    fn create_proxy(
        &self,
        target: Arc<dyn Component>,
        target_name: &str,
        type_name: &str,
        advisors: Vec<Arc<Advisor>>,
    ) -> Result<Arc<dyn Component>>;
}

/// Factory for [`AdvisedProxy`] instances.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultProxyFactory;

impl DefaultProxyFactory {
    pub fn new() -> Self {
        Self
    }
}

impl ProxyFactory for DefaultProxyFactory {
    fn create_proxy(
        &self,
        target: Arc<dyn Component>,
        target_name: &str,
        type_name: &str,
        advisors: Vec<Arc<Advisor>>,
    ) -> Result<Arc<dyn Component>> {
        Ok(Arc::new(AdvisedProxy::new(
            target,
            target_name,
            type_name,
            advisors,
        )))
    }
}

/// Dispatch-based proxy weaving an advisor list around a target component.
pub struct AdvisedProxy {
    target: Arc<dyn Component>,
    target_name: String,
    type_name: String,
    advisors: Vec<Arc<Advisor>>,
    /// Lazily created mixin instances, one per introduced interface.
    mixins: Mutex<HashMap<String, Arc<dyn Component>>>,
}

impl fmt::Debug for AdvisedProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdvisedProxy")
            .field("target_name", &self.target_name)
            .field("type_name", &self.type_name)
            .field("advisor_count", &self.advisors.len())
            .finish_non_exhaustive()
    }
}

impl AdvisedProxy {
    pub fn new(
        target: Arc<dyn Component>,
        target_name: impl Into<String>,
        type_name: impl Into<String>,
        advisors: Vec<Arc<Advisor>>,
    ) -> Self {
        Self {
            target,
            target_name: target_name.into(),
            type_name: type_name.into(),
            advisors,
            mixins: Mutex::new(HashMap::new()),
        }
    }

    pub fn target(&self) -> &Arc<dyn Component> {
        &self.target
    }

    pub fn advisors(&self) -> &[Arc<Advisor>] {
        &self.advisors
    }

    /// The introduction advisor contributing `method`, if any.
    fn introduction_for(&self, method: &str) -> Option<&crate::advisor::IntroductionAdvisor> {
        self.advisors.iter().find_map(|advisor| match advisor.as_ref() {
            Advisor::Introduction(introduction)
                if introduction.type_filter.matches_type(&self.type_name)
                    && introduction.methods.iter().any(|m| m == method) =>
            {
                Some(introduction)
            }
            _ => None,
        })
    }

    fn mixin_instance(
        &self,
        introduction: &crate::advisor::IntroductionAdvisor,
    ) -> Result<Arc<dyn Component>> {
        let mut mixins = self.mixins.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = mixins.get(&introduction.interface_name) {
            return Ok(Arc::clone(existing));
        }
        let created = (introduction.mixin)()?;
        mixins.insert(introduction.interface_name.clone(), Arc::clone(&created));
        Ok(created)
    }

    /// Interceptors whose pointcut matches `method`, in advisor list
    /// order.
    fn chain_for(&self, method: &str) -> Vec<Arc<dyn Interceptor>> {
        self.advisors
            .iter()
            .filter_map(|advisor| match advisor.as_ref() {
                Advisor::Pointcut(advisor)
                    if advisor.pointcut.matches_method(&self.type_name, method) =>
                {
                    Some(Arc::clone(&advisor.interceptor))
                }
                _ => None,
            })
            .collect()
    }
}

impl Component for AdvisedProxy {
    fn dispatch(&self, method: &str, args: &[Value]) -> Result<Value> {
        if let Some(introduction) = self.introduction_for(method) {
            let mixin = self.mixin_instance(introduction)?;
            return mixin.dispatch(method, args);
        }

        let chain = self.chain_for(method);
        let join_point = JoinPoint {
            target_name: self.target_name.clone(),
            type_name: self.type_name.clone(),
            method: method.to_string(),
            args: args.to_vec(),
        };
        let terminal = |join_point: &JoinPoint| {
            self.target.dispatch(&join_point.method, &join_point.args)
        };
        Invocation::new(join_point, &chain, &terminal).proceed()
    }

    /// Listener capability passes through so a proxied listener keeps
    /// receiving container events.
    fn as_listener(self: Arc<Self>) -> Option<Arc<dyn ContainerListener>> {
        Arc::clone(&self.target).as_listener()
    }
}
