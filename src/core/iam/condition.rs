//! Condition evaluation for policies
//!
//! A policy carries zero or more [`Condition`] records (plain data). Each
//! record names a condition kind; the [`ConditionRegistry`] resolves that
//! kind to a [`ConditionKind`] implementation which decides the condition
//! against the request. Built-in kinds:
//! - String operations (Equals, NotEquals, Like, In)
//! - Numeric operations (Equals, LessThan, GreaterThan, Range, ...)
//! - Bool
//!
//! Unknown kinds fail closed.

use super::{PatternMatcher, Policy, Request};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::warn;

/// Request attribute value (can be string, number, or bool)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConditionValue {
    String(String),
    Number(f64),
    Bool(bool),
}

impl ConditionValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConditionValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            ConditionValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConditionValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl From<&str> for ConditionValue {
    fn from(value: &str) -> Self {
        ConditionValue::String(value.to_string())
    }
}

impl From<String> for ConditionValue {
    fn from(value: String) -> Self {
        ConditionValue::String(value)
    }
}

impl From<f64> for ConditionValue {
    fn from(value: f64) -> Self {
        ConditionValue::Number(value)
    }
}

impl From<i32> for ConditionValue {
    fn from(value: i32) -> Self {
        ConditionValue::Number(f64::from(value))
    }
}

impl From<i64> for ConditionValue {
    fn from(value: i64) -> Self {
        ConditionValue::Number(value as f64)
    }
}

impl From<bool> for ConditionValue {
    fn from(value: bool) -> Self {
        ConditionValue::Bool(value)
    }
}

/// A condition attached to a policy
///
/// `value` is interpreted by the condition kind: a string for `StringEquals`,
/// an array for `StringIn`, `{"min": .., "max": ..}` for `NumericRange`, etc.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    /// Condition kind, resolved through the registry
    #[serde(rename = "type")]
    pub kind: String,

    /// Request attribute the condition inspects
    pub key: String,

    /// Expected value or parameters
    #[serde(default)]
    pub value: serde_json::Value,
}

impl Condition {
    /// Create a new condition
    pub fn new(kind: impl Into<String>, key: impl Into<String>, value: serde_json::Value) -> Self {
        Condition {
            kind: kind.into(),
            key: key.into(),
            value,
        }
    }

    /// Create a condition for a built-in operator
    pub fn builtin(operator: ConditionOperator, key: impl Into<String>, value: serde_json::Value) -> Self {
        Self::new(operator.name(), key, value)
    }
}

/// Capability to decide one kind of condition
///
/// Implemented by [`ConditionOperator`] for the built-in kinds and by any
/// `Fn(&Condition, &Request) -> bool` closure.
pub trait ConditionKind: Send + Sync {
    /// Decide `condition` against the request's attributes
    fn evaluate(&self, condition: &Condition, request: &Request) -> bool;
}

impl<F> ConditionKind for F
where
    F: Fn(&Condition, &Request) -> bool + Send + Sync,
{
    fn evaluate(&self, condition: &Condition, request: &Request) -> bool {
        self(condition, request)
    }
}

/// Built-in condition operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConditionOperator {
    /// String equals (case-sensitive)
    StringEquals,
    /// String not equals
    StringNotEquals,
    /// String matches pattern (same wildcard grammar as policy patterns)
    StringLike,
    /// String is a member of the given array
    StringIn,
    /// Numeric equals
    NumericEquals,
    /// Numeric less than
    NumericLessThan,
    /// Numeric less than or equals
    NumericLessThanEquals,
    /// Numeric greater than
    NumericGreaterThan,
    /// Numeric greater than or equals
    NumericGreaterThanEquals,
    /// Number within `{"min": a, "max": b}`, both inclusive and optional
    NumericRange,
    /// Boolean equals
    Bool,
}

impl ConditionOperator {
    pub const ALL: [ConditionOperator; 11] = [
        ConditionOperator::StringEquals,
        ConditionOperator::StringNotEquals,
        ConditionOperator::StringLike,
        ConditionOperator::StringIn,
        ConditionOperator::NumericEquals,
        ConditionOperator::NumericLessThan,
        ConditionOperator::NumericLessThanEquals,
        ConditionOperator::NumericGreaterThan,
        ConditionOperator::NumericGreaterThanEquals,
        ConditionOperator::NumericRange,
        ConditionOperator::Bool,
    ];

    /// Registry name of this operator
    pub fn name(&self) -> &'static str {
        match self {
            ConditionOperator::StringEquals => "StringEquals",
            ConditionOperator::StringNotEquals => "StringNotEquals",
            ConditionOperator::StringLike => "StringLike",
            ConditionOperator::StringIn => "StringIn",
            ConditionOperator::NumericEquals => "NumericEquals",
            ConditionOperator::NumericLessThan => "NumericLessThan",
            ConditionOperator::NumericLessThanEquals => "NumericLessThanEquals",
            ConditionOperator::NumericGreaterThan => "NumericGreaterThan",
            ConditionOperator::NumericGreaterThanEquals => "NumericGreaterThanEquals",
            ConditionOperator::NumericRange => "NumericRange",
            ConditionOperator::Bool => "Bool",
        }
    }

    fn compare_numbers(&self, actual: f64, expected: f64) -> bool {
        match self {
            ConditionOperator::NumericEquals => (expected - actual).abs() < f64::EPSILON,
            ConditionOperator::NumericLessThan => actual < expected,
            ConditionOperator::NumericLessThanEquals => actual <= expected,
            ConditionOperator::NumericGreaterThan => actual > expected,
            ConditionOperator::NumericGreaterThanEquals => actual >= expected,
            _ => false,
        }
    }
}

impl fmt::Display for ConditionOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl ConditionKind for ConditionOperator {
    fn evaluate(&self, condition: &Condition, request: &Request) -> bool {
        // Key not in request - condition fails
        let actual = match request.attribute(&condition.key) {
            Some(v) => v,
            None => return false,
        };
        let expected = &condition.value;

        match self {
            ConditionOperator::StringEquals => match (expected.as_str(), actual.as_str()) {
                (Some(expected), Some(actual)) => expected == actual,
                _ => false,
            },
            ConditionOperator::StringNotEquals => match (expected.as_str(), actual.as_str()) {
                (Some(expected), Some(actual)) => expected != actual,
                _ => false,
            },
            ConditionOperator::StringLike => match (expected.as_str(), actual.as_str()) {
                (Some(pattern), Some(actual)) => PatternMatcher::matches_pattern(pattern, actual),
                _ => false,
            },
            ConditionOperator::StringIn => match (expected.as_array(), actual.as_str()) {
                (Some(members), Some(actual)) => members.iter().any(|m| m.as_str() == Some(actual)),
                _ => false,
            },
            ConditionOperator::NumericEquals
            | ConditionOperator::NumericLessThan
            | ConditionOperator::NumericLessThanEquals
            | ConditionOperator::NumericGreaterThan
            | ConditionOperator::NumericGreaterThanEquals => {
                match (expected.as_f64(), actual.as_number()) {
                    (Some(expected), Some(actual)) => self.compare_numbers(actual, expected),
                    _ => false,
                }
            }
            ConditionOperator::NumericRange => {
                let actual = match actual.as_number() {
                    Some(n) => n,
                    None => return false,
                };
                let min = expected.get("min").and_then(|v| v.as_f64());
                let max = expected.get("max").and_then(|v| v.as_f64());
                if min.is_none() && max.is_none() {
                    return false;
                }
                min.map_or(true, |min| actual >= min) && max.map_or(true, |max| actual <= max)
            }
            ConditionOperator::Bool => match (expected.as_bool(), actual.as_bool()) {
                (Some(expected), Some(actual)) => expected == actual,
                _ => false,
            },
        }
    }
}

/// Registry mapping condition kind names to their evaluators
#[derive(Clone, Default)]
pub struct ConditionRegistry {
    kinds: HashMap<String, Arc<dyn ConditionKind>>,
}

impl ConditionRegistry {
    /// Create an empty registry (every condition fails closed)
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with all built-in operators registered
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for operator in ConditionOperator::ALL {
            registry.register(operator.name(), operator);
        }
        registry
    }

    /// Register (or replace) the evaluator for a condition kind
    pub fn register<K>(&mut self, kind: impl Into<String>, evaluator: K) -> &mut Self
    where
        K: ConditionKind + 'static,
    {
        self.kinds.insert(kind.into(), Arc::new(evaluator));
        self
    }

    /// Registered kind names, sorted
    pub fn kinds(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.kinds.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Evaluate a single condition; unknown kinds evaluate false
    pub fn evaluate(&self, condition: &Condition, request: &Request) -> bool {
        match self.kinds.get(&condition.kind) {
            Some(kind) => kind.evaluate(condition, request),
            None => {
                warn!(
                    kind = %condition.kind,
                    key = %condition.key,
                    "unknown condition kind; treating as failed"
                );
                false
            }
        }
    }

    /// Check that every condition on the policy holds
    ///
    /// A policy without conditions always passes.
    pub fn passes_conditions(&self, policy: &Policy, request: &Request) -> bool {
        policy
            .conditions
            .iter()
            .all(|condition| self.evaluate(condition, request))
    }
}

impl fmt::Debug for ConditionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConditionRegistry")
            .field("kinds", &self.kinds())
            .finish()
    }
}
