//! Policy sources and the access service
//!
//! The engine only ever sees an immutable `Arc<[Policy]>` snapshot. A
//! [`PolicySource`] hands out such snapshots; [`PolicyStore`] is an
//! in-memory copy-on-write source: writers build a new snapshot and swap it
//! in, so a reader holding the old one never observes a partial update.

use crate::config::EngineConfig;
use crate::error::{PolicyError, Result};
use crate::iam::{Decision, Policy, PolicyEngine, Request};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, info};

/// Supplier of the policies in effect
pub trait PolicySource: Send + Sync {
    /// Complete, consistent snapshot of the policies, in evaluation order
    fn snapshot(&self) -> Result<Arc<[Policy]>>;
}

/// A fixed policy list; each snapshot shares the same allocation
impl PolicySource for Arc<[Policy]> {
    fn snapshot(&self) -> Result<Arc<[Policy]>> {
        Ok(Arc::clone(self))
    }
}

impl<S: PolicySource + ?Sized> PolicySource for Arc<S> {
    fn snapshot(&self) -> Result<Arc<[Policy]>> {
        (**self).snapshot()
    }
}

/// In-memory policy store
#[derive(Debug)]
pub struct PolicyStore {
    policies: RwLock<Arc<[Policy]>>,
    config: EngineConfig,
}

impl PolicyStore {
    /// Create an empty store with default configuration
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// Create an empty store
    pub fn with_config(config: EngineConfig) -> Self {
        PolicyStore {
            policies: RwLock::new(Arc::from(Vec::new())),
            config,
        }
    }

    /// Create a store holding `policies`, checked as if added one by one
    pub fn from_policies(policies: impl IntoIterator<Item = Policy>, config: EngineConfig) -> Result<Self> {
        let store = Self::with_config(config);
        store.replace_all(policies)?;
        Ok(store)
    }

    /// Create a store from a JSON array of policies
    pub fn from_json(json: &str, config: EngineConfig) -> Result<Self> {
        let policies = Policy::list_from_json(json)?;
        Self::from_policies(policies, config)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Add a new policy at the end of the evaluation order
    pub fn create(&self, policy: Policy) -> Result<Policy> {
        self.check(&policy)?;

        let mut guard = self.policies.write();
        if guard.iter().any(|p| p.id == policy.id) {
            return Err(PolicyError::DuplicatePolicy(policy.id));
        }
        if let Some(max) = self.config.max_policies {
            if guard.len() >= max {
                return Err(PolicyError::CapacityExceeded(max));
            }
        }

        let mut next = guard.to_vec();
        next.push(policy.clone());
        *guard = Arc::from(next);

        info!(policy = %policy.id, effect = ?policy.effect, "policy created");
        Ok(policy)
    }

    /// Replace an existing policy, keeping its position
    pub fn update(&self, policy: Policy) -> Result<Policy> {
        self.check(&policy)?;

        let mut guard = self.policies.write();
        let index = guard
            .iter()
            .position(|p| p.id == policy.id)
            .ok_or_else(|| PolicyError::PolicyNotFound(policy.id.clone()))?;

        let mut next = guard.to_vec();
        next[index] = policy.clone();
        *guard = Arc::from(next);

        info!(policy = %policy.id, "policy updated");
        Ok(policy)
    }

    /// Remove a policy by id
    pub fn remove(&self, id: &str) -> Result<Policy> {
        let mut guard = self.policies.write();
        let index = guard
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| PolicyError::PolicyNotFound(id.to_string()))?;

        let mut next = guard.to_vec();
        let removed = next.remove(index);
        *guard = Arc::from(next);

        info!(policy = %id, "policy removed");
        Ok(removed)
    }

    /// Replace the whole policy set atomically
    pub fn replace_all(&self, policies: impl IntoIterator<Item = Policy>) -> Result<()> {
        let policies: Vec<Policy> = policies.into_iter().collect();

        for (i, policy) in policies.iter().enumerate() {
            self.check(policy)?;
            if policies[..i].iter().any(|p| p.id == policy.id) {
                return Err(PolicyError::DuplicatePolicy(policy.id.clone()));
            }
        }
        if let Some(max) = self.config.max_policies {
            if policies.len() > max {
                return Err(PolicyError::CapacityExceeded(max));
            }
        }

        let count = policies.len();
        *self.policies.write() = Arc::from(policies);
        info!(count, "policy set replaced");
        Ok(())
    }

    /// Look up a policy by id
    pub fn get(&self, id: &str) -> Option<Policy> {
        self.policies.read().iter().find(|p| p.id == id).cloned()
    }

    /// All policies, in evaluation order
    pub fn find_all(&self) -> Arc<[Policy]> {
        Arc::clone(&self.policies.read())
    }

    pub fn len(&self) -> usize {
        self.policies.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.policies.read().is_empty()
    }

    fn check(&self, policy: &Policy) -> Result<()> {
        if self.config.validate_policies {
            policy.validate()?;
        }
        Ok(())
    }
}

impl Default for PolicyStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PolicySource for PolicyStore {
    fn snapshot(&self) -> Result<Arc<[Policy]>> {
        Ok(self.find_all())
    }
}

/// Decides requests against the policies currently in a source
#[derive(Debug)]
pub struct AccessService<S> {
    source: S,
    engine: PolicyEngine,
    config: EngineConfig,
}

impl<S: PolicySource> AccessService<S> {
    /// Create a service with the built-in condition kinds
    pub fn new(source: S) -> Self {
        Self::with_engine(source, PolicyEngine::new(), EngineConfig::default())
    }

    pub fn with_engine(source: S, engine: PolicyEngine, config: EngineConfig) -> Self {
        AccessService { source, engine, config }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn engine(&self) -> &PolicyEngine {
        &self.engine
    }

    /// Decide whether the request is allowed by the current policies
    pub fn is_allowed(&self, request: &Request) -> Result<bool> {
        self.evaluate(request).map(|decision| decision.allowed)
    }

    /// Evaluate the request against one snapshot of the current policies
    pub fn evaluate(&self, request: &Request) -> Result<Decision> {
        let policies = self.source.snapshot()?;
        debug!(policies = policies.len(), "evaluating against snapshot");

        let decision = self.engine.evaluate(&policies, request)?;

        if self.config.log_decisions {
            info!(
                action = %request.action,
                subject = %request.subject,
                resource = %request.resource,
                allowed = decision.allowed,
                "{}",
                decision
            );
        }

        Ok(decision)
    }
}
