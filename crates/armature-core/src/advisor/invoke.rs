//! # Armature Core Invocation Chain
//!
//! The intercepted-invocation model: a [`JoinPoint`] describing the call, an
//! [`Invocation`] that walks an interceptor chain toward the target, and the
//! per-kind advice adapters that bridge declared advice bodies onto the
//! [`Interceptor`] trait.
//!
//! Interceptors call [`Invocation::proceed`] to hand control to the next
//! element of the chain; the final proceed reaches the target dispatch.
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::aspect::instance::AspectInstanceFactory;
use crate::aspect::introspect::{AroundFn, JoinPointFn, ReturningFn, ThrowingFn};
use crate::container::error::Result;

/// Static description of an intercepted call.
#[derive(Debug, Clone)]
pub struct JoinPoint {
    /// Container name of the proxied component.
    pub target_name: String,
    /// Declared type of the proxied component.
    pub type_name: String,
    pub method: String,
    pub args: Vec<Value>,
}

/// One element of an interceptor chain.
pub trait Interceptor: Send + Sync {
    fn invoke(&self, invocation: &mut Invocation<'_>) -> Result<Value>;
}

/// A call working its way through an interceptor chain toward its target.
pub struct Invocation<'a> {
    join_point: JoinPoint,
    chain: &'a [Arc<dyn Interceptor>],
    index: usize,
    terminal: &'a dyn Fn(&JoinPoint) -> Result<Value>,
}

impl fmt::Debug for Invocation<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Invocation")
            .field("join_point", &self.join_point)
            .field("chain_len", &self.chain.len())
            .field("index", &self.index)
            .finish_non_exhaustive()
    }
}

impl<'a> Invocation<'a> {
    pub fn new(
        join_point: JoinPoint,
        chain: &'a [Arc<dyn Interceptor>],
        terminal: &'a dyn Fn(&JoinPoint) -> Result<Value>,
    ) -> Self {
        Self {
            join_point,
            chain,
            index: 0,
            terminal,
        }
    }

    pub fn join_point(&self) -> &JoinPoint {
        &self.join_point
    }

    pub fn args(&self) -> &[Value] {
        &self.join_point.args
    }

    /// Hand control to the next interceptor, or to the target once the
    /// chain is exhausted.
    pub fn proceed(&mut self) -> Result<Value> {
        if self.index < self.chain.len() {
            let interceptor = self.chain[self.index].clone();
            self.index += 1;
            interceptor.invoke(self)
        } else {
            (self.terminal)(&self.join_point)
        }
    }
}

/// Around advice: the body receives the invocation and decides if and when
/// to proceed.
pub struct AroundAdviceInterceptor {
    pub factory: Arc<dyn AspectInstanceFactory>,
    pub body: AroundFn,
}

impl Interceptor for AroundAdviceInterceptor {
    fn invoke(&self, invocation: &mut Invocation<'_>) -> Result<Value> {
        let aspect = self.factory.aspect_instance()?;
        (self.body)(aspect, invocation)
    }
}

/// Before advice: the body runs, then the invocation proceeds.
pub struct BeforeAdviceInterceptor {
    pub factory: Arc<dyn AspectInstanceFactory>,
    pub body: JoinPointFn,
}

impl Interceptor for BeforeAdviceInterceptor {
    fn invoke(&self, invocation: &mut Invocation<'_>) -> Result<Value> {
        let aspect = self.factory.aspect_instance()?;
        (self.body)(aspect, invocation.join_point())?;
        invocation.proceed()
    }
}

/// After (finally) advice: the body runs whether the invocation succeeded
/// or failed. A failing invocation keeps its own error; an advice failure
/// during unwinding is logged and dropped.
pub struct AfterAdviceInterceptor {
    pub factory: Arc<dyn AspectInstanceFactory>,
    pub body: JoinPointFn,
}

impl Interceptor for AfterAdviceInterceptor {
    fn invoke(&self, invocation: &mut Invocation<'_>) -> Result<Value> {
        match invocation.proceed() {
            Ok(value) => {
                let aspect = self.factory.aspect_instance()?;
                (self.body)(aspect, invocation.join_point())?;
                Ok(value)
            }
            Err(err) => {
                let advice_outcome = self
                    .factory
                    .aspect_instance()
                    .and_then(|aspect| (self.body)(aspect, invocation.join_point()));
                if let Err(advice_err) = advice_outcome {
                    log::warn!(
                        "After advice failed while unwinding '{}': {advice_err}",
                        invocation.join_point().method
                    );
                }
                Err(err)
            }
        }
    }
}

/// After-returning advice: the body observes the successful return value.
pub struct AfterReturningAdviceInterceptor {
    pub factory: Arc<dyn AspectInstanceFactory>,
    pub body: ReturningFn,
}

impl Interceptor for AfterReturningAdviceInterceptor {
    fn invoke(&self, invocation: &mut Invocation<'_>) -> Result<Value> {
        let value = invocation.proceed()?;
        let aspect = self.factory.aspect_instance()?;
        (self.body)(aspect, invocation.join_point(), &value)?;
        Ok(value)
    }
}

/// After-throwing advice: the body observes the failure, which then keeps
/// propagating.
pub struct AfterThrowingAdviceInterceptor {
    pub factory: Arc<dyn AspectInstanceFactory>,
    pub body: ThrowingFn,
}

impl Interceptor for AfterThrowingAdviceInterceptor {
    fn invoke(&self, invocation: &mut Invocation<'_>) -> Result<Value> {
        match invocation.proceed() {
            Ok(value) => Ok(value),
            Err(err) => {
                let aspect = self.factory.aspect_instance()?;
                (self.body)(aspect, invocation.join_point(), &err)?;
                Err(err)
            }
        }
    }
}
