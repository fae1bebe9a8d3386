//! # Armature Core Aspect Advisor Factory
//!
//! Turns one aspect's introspection into the advisor list the auto-proxy
//! layer consumes.
//!
//! Advice methods are sorted by kind precedence, then by name, and each
//! becomes a [`PointcutAdvisor`] carrying its position as the order value.
//! Lazily instantiated aspects get a synthetic instantiation advisor
//! prepended so the aspect instance exists before any real advice of the
//! same aspect runs. Introduction fields become [`IntroductionAdvisor`]s.
use std::sync::Arc;

use crate::advisor::invoke::{
    AfterAdviceInterceptor, AfterReturningAdviceInterceptor, AfterThrowingAdviceInterceptor,
    AroundAdviceInterceptor, BeforeAdviceInterceptor, Interceptor, Invocation,
};
use crate::advisor::pointcut::{ExpressionPointcut, TypePatternPointcut};
use crate::advisor::{Advisor, IntroductionAdvisor, PointcutAdvisor};
use crate::aspect::error::AspectError;
use crate::aspect::instance::{AspectInstanceFactory, SharedAspectInstanceFactory};
use crate::aspect::introspect::{AdviceBody, AdviceMethod, AspectIntrospector};
use crate::aspect::metadata::{AdviceKind, AspectMetadata};
use crate::container::error::Result;
use serde_json::Value;

/// Synthetic interceptor prepended for lazily instantiated aspects: it
/// forces creation of the aspect instance, then proceeds.
pub struct InstantiationInterceptor {
    pub factory: Arc<dyn AspectInstanceFactory>,
}

impl Interceptor for InstantiationInterceptor {
    fn invoke(&self, invocation: &mut Invocation<'_>) -> Result<Value> {
        self.factory.aspect_instance()?;
        invocation.proceed()
    }
}

/// Builds advisors from aspect introspections.
#[derive(Debug, Clone, Copy, Default)]
pub struct AspectAdvisorFactory;

impl AspectAdvisorFactory {
    pub fn new() -> Self {
        Self
    }

    /// Whether `type_name` is a declared aspect.
    pub fn is_aspect(&self, introspector: &dyn AspectIntrospector, type_name: &str) -> bool {
        introspector.introspect(type_name).is_some()
    }

    /// Errors unless `type_name` is a declared aspect.
    pub fn validate(
        &self,
        introspector: &dyn AspectIntrospector,
        type_name: &str,
    ) -> std::result::Result<(), AspectError> {
        if self.is_aspect(introspector, type_name) {
            Ok(())
        } else {
            Err(AspectError::NotAnAspect {
                type_name: type_name.to_string(),
            })
        }
    }

    /// All advisors declared by the aspect behind `instance_factory`.
    ///
    /// The factory is wrapped so that every advisor of the aspect shares
    /// one instance regardless of which advice fires first.
    pub fn advisors(
        &self,
        instance_factory: Arc<dyn AspectInstanceFactory>,
    ) -> std::result::Result<Vec<Arc<Advisor>>, AspectError> {
        let metadata = instance_factory.metadata().clone();
        let shared: Arc<dyn AspectInstanceFactory> =
            Arc::new(SharedAspectInstanceFactory::new(instance_factory));
        validate_introspection(&metadata)?;

        let mut methods: Vec<&AdviceMethod> = metadata
            .introspection
            .advice_methods
            .iter()
            .filter(|method| method.kind != AdviceKind::Pointcut)
            .collect();
        methods.sort_by(|a, b| {
            a.kind
                .precedence()
                .cmp(&b.kind.precedence())
                .then_with(|| a.name.cmp(&b.name))
        });

        let mut advisors: Vec<Arc<Advisor>> = Vec::with_capacity(methods.len());
        for (index, method) in methods.iter().enumerate() {
            let pointcut = ExpressionPointcut::parse(&method.expression).map_err(|err| {
                AspectError::MalformedPointcut {
                    aspect: metadata.aspect_name.clone(),
                    expression: method.expression.clone(),
                    detail: err.to_string(),
                }
            })?;
            let interceptor = advice_interceptor(&metadata.aspect_name, method, Arc::clone(&shared))?;
            advisors.push(Arc::new(Advisor::Pointcut(PointcutAdvisor {
                pointcut: Arc::new(pointcut),
                interceptor,
                aspect_name: metadata.aspect_name.clone(),
                method_name: method.name.clone(),
                order: index as i32,
            })));
        }

        if !advisors.is_empty() && metadata.is_lazily_instantiated() {
            advisors.insert(
                0,
                Arc::new(Advisor::Pointcut(PointcutAdvisor {
                    pointcut: Arc::clone(&metadata.per_clause_pointcut),
                    interceptor: Arc::new(InstantiationInterceptor {
                        factory: Arc::clone(&shared),
                    }),
                    aspect_name: metadata.aspect_name.clone(),
                    method_name: "instantiate".to_string(),
                    order: -1,
                })),
            );
        }

        for field in &metadata.introspection.introductions {
            let mixin = field.default_impl.clone().ok_or_else(|| {
                AspectError::MissingDefaultImpl {
                    aspect: metadata.aspect_name.clone(),
                    field: field.field_name.clone(),
                }
            })?;
            advisors.push(Arc::new(Advisor::Introduction(IntroductionAdvisor {
                type_filter: Arc::new(TypePatternPointcut::new(&field.type_pattern)),
                interface_name: field.interface_name.clone(),
                methods: field.methods.clone(),
                mixin,
            })));
        }

        Ok(advisors)
    }
}

fn validate_introspection(metadata: &AspectMetadata) -> std::result::Result<(), AspectError> {
    for method in &metadata.introspection.advice_methods {
        if method.kind == AdviceKind::Pointcut && method.body.is_some() {
            return Err(AspectError::PointcutMethodInvoked {
                aspect: metadata.aspect_name.clone(),
                method: method.name.clone(),
            });
        }
        if method.returning.is_some() && method.kind != AdviceKind::AfterReturning {
            return Err(AspectError::AdviceKindMismatch {
                aspect: metadata.aspect_name.clone(),
                method: method.name.clone(),
                detail: "returning binding on advice that is not after-returning".to_string(),
            });
        }
        if method.throwing.is_some() && method.kind != AdviceKind::AfterThrowing {
            return Err(AspectError::AdviceKindMismatch {
                aspect: metadata.aspect_name.clone(),
                method: method.name.clone(),
                detail: "throwing binding on advice that is not after-throwing".to_string(),
            });
        }
        for binding in [method.returning.as_deref(), method.throwing.as_deref()]
            .into_iter()
            .flatten()
        {
            if !method.arg_names.is_empty() && !method.arg_names.iter().any(|arg| arg == binding) {
                return Err(AspectError::AdviceKindMismatch {
                    aspect: metadata.aspect_name.clone(),
                    method: method.name.clone(),
                    detail: format!("binding '{binding}' is not among the declared argument names"),
                });
            }
        }
    }
    Ok(())
}

fn advice_interceptor(
    aspect_name: &str,
    method: &AdviceMethod,
    factory: Arc<dyn AspectInstanceFactory>,
) -> std::result::Result<Arc<dyn Interceptor>, AspectError> {
    let mismatch = |detail: &str| AspectError::AdviceKindMismatch {
        aspect: aspect_name.to_string(),
        method: method.name.clone(),
        detail: detail.to_string(),
    };
    let body = method
        .body
        .clone()
        .ok_or_else(|| mismatch("advice method has no executable body"))?;
    if body.kind() != method.kind {
        return Err(mismatch("body shape does not match the declared kind"));
    }
    let interceptor: Arc<dyn Interceptor> = match body {
        AdviceBody::Around(body) => Arc::new(AroundAdviceInterceptor { factory, body }),
        AdviceBody::Before(body) => Arc::new(BeforeAdviceInterceptor { factory, body }),
        AdviceBody::After(body) => Arc::new(AfterAdviceInterceptor { factory, body }),
        AdviceBody::AfterReturning(body) => {
            Arc::new(AfterReturningAdviceInterceptor { factory, body })
        }
        AdviceBody::AfterThrowing(body) => {
            Arc::new(AfterThrowingAdviceInterceptor { factory, body })
        }
    };
    Ok(interceptor)
}
