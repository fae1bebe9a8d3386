//! # Armature Core Pointcuts
//!
//! Type and method matching for advisors.
//!
//! The expression grammar is deliberately small:
//! `execution(<type-pattern>::<method-pattern>)`, where both patterns accept
//! `*` wildcards and the method pattern may carry a trailing `(..)` that is
//! ignored. The type pattern may contain `::` path segments; the last `::`
//! separates it from the method pattern.
use crate::advisor::error::AdvisorError;

/// Decides which types and methods an advisor applies to.
///
/// `matches_type` is consulted at proxy-creation time to filter candidate
/// advisors; `matches_method` at call time to assemble the interceptor
/// chain.
pub trait Pointcut: Send + Sync {
    fn matches_type(&self, type_name: &str) -> bool;

    fn matches_method(&self, type_name: &str, method: &str) -> bool;

    /// The source expression, when this pointcut was parsed from one.
    fn expression(&self) -> Option<&str> {
        None
    }
}

/// Pointcut matching every type and method.
#[derive(Debug, Clone, Copy, Default)]
pub struct TruePointcut;

impl Pointcut for TruePointcut {
    fn matches_type(&self, _type_name: &str) -> bool {
        true
    }

    fn matches_method(&self, _type_name: &str, _method: &str) -> bool {
        true
    }
}

/// Pointcut matching types against a glob pattern; every method of a
/// matched type matches. Used for introduction type filters.
#[derive(Debug, Clone)]
pub struct TypePatternPointcut {
    pattern: String,
}

impl TypePatternPointcut {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
        }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

impl Pointcut for TypePatternPointcut {
    fn matches_type(&self, type_name: &str) -> bool {
        glob_match(&self.pattern, type_name)
    }

    fn matches_method(&self, type_name: &str, _method: &str) -> bool {
        self.matches_type(type_name)
    }
}

/// Pointcut parsed from an `execution(...)` expression.
#[derive(Debug, Clone)]
pub struct ExpressionPointcut {
    expression: String,
    type_pattern: String,
    method_pattern: String,
}

impl ExpressionPointcut {
    /// Parse an `execution(<type>::<method>)` expression.
    pub fn parse(expression: &str) -> Result<Self, AdvisorError> {
        let malformed = |reason: &str| AdvisorError::MalformedExpression {
            expression: expression.to_string(),
            reason: reason.to_string(),
        };

        let trimmed = expression.trim();
        let inner = trimmed
            .strip_prefix("execution(")
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(|| malformed("expected the form execution(<type>::<method>)"))?;
        let (type_pattern, method_part) = inner
            .rsplit_once("::")
            .ok_or_else(|| malformed("expected '::' separating type and method patterns"))?;
        let method_pattern = method_part.strip_suffix("(..)").unwrap_or(method_part);

        if type_pattern.is_empty() {
            return Err(malformed("empty type pattern"));
        }
        if method_pattern.is_empty() {
            return Err(malformed("empty method pattern"));
        }
        if !type_pattern
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '_' | ':' | '.' | '*'))
        {
            return Err(malformed("invalid character in type pattern"));
        }
        if !method_pattern
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '_' | '*'))
        {
            return Err(malformed("invalid character in method pattern"));
        }

        Ok(Self {
            expression: trimmed.to_string(),
            type_pattern: type_pattern.to_string(),
            method_pattern: method_pattern.to_string(),
        })
    }

    pub fn type_pattern(&self) -> &str {
        &self.type_pattern
    }

    pub fn method_pattern(&self) -> &str {
        &self.method_pattern
    }
}

impl Pointcut for ExpressionPointcut {
    fn matches_type(&self, type_name: &str) -> bool {
        glob_match(&self.type_pattern, type_name)
    }

    fn matches_method(&self, type_name: &str, method: &str) -> bool {
        self.matches_type(type_name) && glob_match(&self.method_pattern, method)
    }

    fn expression(&self) -> Option<&str> {
        Some(&self.expression)
    }
}

/// `*`-wildcard match over the whole of `text`. A star matches any run of
/// characters, including an empty one and path separators.
pub(crate) fn glob_match(pattern: &str, text: &str) -> bool {
    let pat: Vec<char> = pattern.chars().collect();
    let txt: Vec<char> = text.chars().collect();
    let (mut p, mut t) = (0usize, 0usize);
    let mut star: Option<usize> = None;
    let mut mark = 0usize;
    while t < txt.len() {
        if p < pat.len() && pat[p] == '*' {
            star = Some(p);
            mark = t;
            p += 1;
        } else if p < pat.len() && pat[p] == txt[t] {
            p += 1;
            t += 1;
        } else if let Some(star_pos) = star {
            p = star_pos + 1;
            mark += 1;
            t = mark;
        } else {
            return false;
        }
    }
    while p < pat.len() && pat[p] == '*' {
        p += 1;
    }
    p == pat.len()
}
