//! # pbac - Policy-Based Access Control
//!
//! `pbac` decides whether an access request is allowed by a set of policies.
//! Each policy has an effect (allow or deny), pattern sets for actions,
//! subjects and resources, an optional validity window and optional
//! conditions. Evaluation follows deny-overrides with default deny:
//!
//! - a policy applies when the request time is inside its window, the
//!   request's action, subject and resource each match one of its patterns,
//!   and all of its conditions hold
//! - any applicable deny policy vetoes the request
//! - otherwise the request is allowed iff some allow policy applies
//!
//! ## Quick Start
//!
//! ```rust
//! use pbac::{Effect, Policy, PolicyEngine, Request, Result};
//!
//! # fn main() -> Result<()> {
//! let policies = vec![
//!     Policy::new("readers", Effect::Allow, ["read:*"], ["*"], ["reports/*"]),
//!     Policy::new("freeze", Effect::Deny, ["*"], ["*"], ["reports/2023/*"])
//!         .with_window("2024-01-01 00:00", "2024-02-01 00:00"),
//! ];
//!
//! let engine = PolicyEngine::new();
//! let request = Request::new("read:pdf", "alice", "reports/2024/q1", "2024-01-15 09:30");
//! assert!(engine.is_allowed(&policies, &request)?);
//!
//! let frozen = Request::new("read:pdf", "alice", "reports/2023/q4", "2024-01-15 09:30");
//! assert!(!engine.is_allowed(&policies, &frozen)?);
//! # Ok(())
//! # }
//! ```
//!
//! ## Policy Sources
//!
//! ```rust
//! use pbac::{AccessService, Effect, Policy, PolicyStore, Request, Result};
//! use std::sync::Arc;
//!
//! # fn main() -> Result<()> {
//! let store = Arc::new(PolicyStore::new());
//! store.create(Policy::new("p1", Effect::Allow, ["get"], ["alice"], ["doc1"]))?;
//!
//! let service = AccessService::new(Arc::clone(&store));
//! let decision = service.evaluate(&Request::new("get", "alice", "doc1", "2024-01-01 10:00"))?;
//! assert_eq!(decision.decided_by(), Some("p1"));
//! # Ok(())
//! # }
//! ```

pub mod core;

// Re-export core modules internally so crate:: paths in core still work
pub(crate) use crate::core::{config, error, iam};

pub use crate::core::{
    config::EngineConfig,
    error::{PolicyError, Result, TimestampField},
    iam::{
        in_window, is_allowed, Condition, ConditionKind, ConditionOperator, ConditionRegistry,
        ConditionValue, Decision, DecisionReason, Effect, PatternMatcher, Policy, PolicyEngine,
        Request, Timestamp, TIMESTAMP_FORMAT, WILDCARD,
    },
    store::{AccessService, PolicySource, PolicyStore},
};
