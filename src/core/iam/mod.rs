//! Policy-based access control
//!
//! Provides the access decision with:
//! - Allow/Deny policies with explicit deny precedence and default deny
//! - Wildcard pattern matching for actions, subjects and resources
//! - Optional validity windows (`yyyy-MM-dd HH:mm`, exclusive bounds)
//! - Pluggable condition kinds resolved through a registry

mod condition;
mod decision;
mod engine;
mod pattern;
mod policy;
mod request;
mod timestamp;

pub use condition::{Condition, ConditionKind, ConditionOperator, ConditionRegistry, ConditionValue};
pub use decision::{Decision, DecisionReason};
pub use engine::{is_allowed, PolicyEngine};
pub use pattern::{PatternMatcher, WILDCARD};
pub use policy::{Effect, Policy};
pub use request::Request;
pub use timestamp::{in_window, Timestamp, TIMESTAMP_FORMAT};
