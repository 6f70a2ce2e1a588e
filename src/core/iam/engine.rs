//! Policy evaluation engine with deny precedence
//!
//! Evaluates an ordered policy set against a request. Key features:
//! - Explicit deny takes precedence over allow
//! - Default deny when no policy applies
//! - Time-window, pattern and condition gates per policy
//! - No state between calls; one engine can serve many threads

use super::timestamp::{in_window, Timestamp};
use super::{ConditionRegistry, Decision, PatternMatcher, Policy, Request};
use crate::error::{PolicyError, Result, TimestampField};
use std::sync::OnceLock;
use tracing::{debug, warn};

/// Why the fold over the policy set stopped early
enum Halt<'a> {
    Denied(&'a Policy),
    Failed(PolicyError),
}

/// Policy evaluation engine
///
/// Holds only the condition registry, which is read-only after construction.
#[derive(Debug, Clone)]
pub struct PolicyEngine {
    conditions: ConditionRegistry,
}

impl PolicyEngine {
    /// Create an engine with the built-in condition kinds
    pub fn new() -> Self {
        Self::with_conditions(ConditionRegistry::with_builtins())
    }

    /// Create an engine with a custom condition registry
    pub fn with_conditions(conditions: ConditionRegistry) -> Self {
        PolicyEngine { conditions }
    }

    /// Condition registry used by this engine
    pub fn conditions(&self) -> &ConditionRegistry {
        &self.conditions
    }

    /// Decide whether the request is allowed by the policy set
    ///
    /// # Errors
    ///
    /// Returns `MalformedTimestamp` if the request time, or the window of a
    /// policy reached during evaluation, is not in `yyyy-MM-dd HH:mm` format.
    ///
    /// # Examples
    ///
    /// ```
    /// use pbac::{Effect, Policy, PolicyEngine, Request};
    ///
    /// let engine = PolicyEngine::new();
    /// let mut policies = vec![Policy::new("p1", Effect::Allow, ["get"], ["alice"], ["doc1"])];
    /// let request = Request::new("get", "alice", "doc1", "2024-01-01 10:00");
    ///
    /// assert!(engine.is_allowed(&policies, &request).unwrap());
    ///
    /// policies.push(Policy::new("p2", Effect::Deny, ["get"], ["*"], ["doc1"]));
    /// assert!(!engine.is_allowed(&policies, &request).unwrap());
    /// ```
    pub fn is_allowed(&self, policies: &[Policy], request: &Request) -> Result<bool> {
        self.evaluate(policies, request).map(|decision| decision.allowed)
    }

    /// Evaluate the request and report which policy decided it
    pub fn evaluate(&self, policies: &[Policy], request: &Request) -> Result<Decision> {
        let now = Timestamp::parse(&request.current_time, TimestampField::CurrentTime)?;

        let outcome = policies
            .iter()
            .try_fold(None::<&Policy>, |first_allow, policy| {
                match self.applies_at(policy, request, now) {
                    Err(e) => Err(Halt::Failed(e)),
                    Ok(false) => Ok(first_allow),
                    Ok(true) if policy.allows_access() => Ok(first_allow.or(Some(policy))),
                    Ok(true) => Err(Halt::Denied(policy)),
                }
            });

        let decision = match outcome {
            Ok(Some(policy)) => Decision::allow(&policy.id),
            Ok(None) => Decision::no_applicable_policy(),
            Err(Halt::Denied(policy)) => Decision::deny(&policy.id),
            Err(Halt::Failed(e)) => return Err(e),
        };

        debug!(
            action = %request.action,
            subject = %request.subject,
            resource = %request.resource,
            policies = policies.len(),
            "{}",
            decision
        );

        Ok(decision)
    }

    /// Check whether a single policy applies to the request
    pub fn applies(&self, policy: &Policy, request: &Request) -> Result<bool> {
        let now = Timestamp::parse(&request.current_time, TimestampField::CurrentTime)?;
        self.applies_at(policy, request, now)
    }

    /// Run the gates in order of expected cost: window, action, subject,
    /// resource, conditions. The order only affects cost, not the result.
    fn applies_at(&self, policy: &Policy, request: &Request, now: Timestamp) -> Result<bool> {
        if policy.has_window() {
            let inside = in_window(policy.from_time.as_deref(), policy.to_time.as_deref(), now)
                .map_err(|e| {
                    warn!(policy = %policy.id, error = %e, "aborting evaluation");
                    e
                })?;
            if !inside {
                debug!(policy = %policy.id, current_time = %now, "outside validity window");
                return Ok(false);
            }
        }

        if !PatternMatcher::matches(&policy.actions, &request.action) {
            debug!(policy = %policy.id, actions = ?policy.actions, action = %request.action, "action mismatch");
            return Ok(false);
        }

        if !PatternMatcher::matches(&policy.subjects, &request.subject) {
            debug!(policy = %policy.id, subjects = ?policy.subjects, subject = %request.subject, "subject mismatch");
            return Ok(false);
        }

        if !PatternMatcher::matches(&policy.resources, &request.resource) {
            debug!(policy = %policy.id, resources = ?policy.resources, resource = %request.resource, "resource mismatch");
            return Ok(false);
        }

        if !self.conditions.passes_conditions(policy, request) {
            debug!(policy = %policy.id, "conditions not met");
            return Ok(false);
        }

        Ok(true)
    }
}

impl Default for PolicyEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Decide a request with a shared engine using the built-in condition kinds
pub fn is_allowed(policies: &[Policy], request: &Request) -> Result<bool> {
    static DEFAULT_ENGINE: OnceLock<PolicyEngine> = OnceLock::new();
    DEFAULT_ENGINE
        .get_or_init(PolicyEngine::new)
        .is_allowed(policies, request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::iam::Effect;

    fn request(action: &str, subject: &str, resource: &str) -> Request {
        Request::new(action, subject, resource, "2024-01-01 10:00")
    }

    #[test]
    fn test_simple_allow() {
        let engine = PolicyEngine::new();
        let policies = vec![Policy::new("p1", Effect::Allow, ["get"], ["alice"], ["doc1"])];

        assert!(engine.is_allowed(&policies, &request("get", "alice", "doc1")).unwrap());
        assert!(!engine.is_allowed(&policies, &request("put", "alice", "doc1")).unwrap());
        assert!(!engine.is_allowed(&policies, &request("get", "bob", "doc1")).unwrap());
        assert!(!engine.is_allowed(&policies, &request("get", "alice", "doc2")).unwrap());
    }

    #[test]
    fn test_deny_precedence() {
        let engine = PolicyEngine::new();
        let allow = Policy::new("allow", Effect::Allow, ["get"], ["alice"], ["doc1"]);
        let deny = Policy::new("deny", Effect::Deny, ["get"], ["*"], ["doc1"]);
        let req = request("get", "alice", "doc1");

        let decision = engine.evaluate(&[allow.clone(), deny.clone()], &req).unwrap();
        assert_eq!(decision, Decision::deny("deny"));

        let decision = engine.evaluate(&[deny, allow], &req).unwrap();
        assert_eq!(decision, Decision::deny("deny"));
    }

    #[test]
    fn test_default_deny() {
        let engine = PolicyEngine::new();
        let decision = engine.evaluate(&[], &request("get", "alice", "doc1")).unwrap();
        assert_eq!(decision, Decision::no_applicable_policy());
    }

    #[test]
    fn test_first_allow_is_reported() {
        let engine = PolicyEngine::new();
        let policies = vec![
            Policy::new("narrow", Effect::Allow, ["get"], ["alice"], ["doc1"]),
            Policy::new("broad", Effect::Allow, ["*"], ["*"], ["*"]),
        ];
        let decision = engine.evaluate(&policies, &request("get", "alice", "doc1")).unwrap();
        assert_eq!(decision.decided_by(), Some("narrow"));
    }

    #[test]
    fn test_wildcard_action() {
        let engine = PolicyEngine::new();
        let policies = vec![Policy::new("p1", Effect::Allow, ["read:*"], ["*"], ["*"])];

        assert!(engine.is_allowed(&policies, &request("read:file", "alice", "doc1")).unwrap());
        assert!(!engine.is_allowed(&policies, &request("write:file", "alice", "doc1")).unwrap());
    }

    #[test]
    fn test_time_window_skips_policy() {
        let engine = PolicyEngine::new();
        let policies = vec![Policy::new("p1", Effect::Allow, ["get"], ["alice"], ["doc1"])
            .with_window("2024-01-01 00:00", "2024-01-01 09:00")];

        assert!(!engine.is_allowed(&policies, &request("get", "alice", "doc1")).unwrap());
    }

    #[test]
    fn test_expired_deny_does_not_veto() {
        let engine = PolicyEngine::new();
        let policies = vec![
            Policy::new("deny", Effect::Deny, ["*"], ["*"], ["*"]).with_to_time("2024-01-01 10:00"),
            Policy::new("allow", Effect::Allow, ["get"], ["alice"], ["doc1"]),
        ];

        assert!(engine.is_allowed(&policies, &request("get", "alice", "doc1")).unwrap());
    }

    #[test]
    fn test_malformed_request_time_is_an_error() {
        let engine = PolicyEngine::new();
        let policies = vec![Policy::new("p1", Effect::Allow, ["get"], ["alice"], ["doc1"])];
        let req = Request::new("get", "alice", "doc1", "2024-01-01T10:00");

        let err = engine.is_allowed(&policies, &req).unwrap_err();
        assert!(matches!(
            err,
            PolicyError::MalformedTimestamp { field: TimestampField::CurrentTime, .. }
        ));
    }

    #[test]
    fn test_malformed_policy_window_aborts() {
        let engine = PolicyEngine::new();
        let policies = vec![
            Policy::new("ok", Effect::Allow, ["get"], ["alice"], ["doc1"]),
            Policy::new("broken", Effect::Allow, ["put"], ["bob"], ["doc9"]).with_from_time("2024-01-01 7:00"),
        ];

        // Error even though the broken policy would not match on patterns
        let err = engine.is_allowed(&policies, &request("get", "alice", "doc1")).unwrap_err();
        assert!(matches!(
            err,
            PolicyError::MalformedTimestamp { field: TimestampField::FromTime, .. }
        ));
    }

    #[test]
    fn test_deny_before_malformed_policy_short_circuits() {
        let engine = PolicyEngine::new();
        let policies = vec![
            Policy::new("deny", Effect::Deny, ["get"], ["*"], ["doc1"]),
            Policy::new("broken", Effect::Allow, ["get"], ["*"], ["*"]).with_to_time("tomorrow"),
        ];

        let decision = engine.evaluate(&policies, &request("get", "alice", "doc1")).unwrap();
        assert_eq!(decision, Decision::deny("deny"));
    }

    #[test]
    fn test_empty_pattern_set_never_applies() {
        let engine = PolicyEngine::new();
        let policies = vec![Policy::new("p1", Effect::Deny, Vec::<String>::new(), ["*"], ["*"])];
        let decision = engine.evaluate(&policies, &request("get", "alice", "doc1")).unwrap();
        assert_eq!(decision, Decision::no_applicable_policy());
    }

    #[test]
    fn test_applies_single_policy() {
        let engine = PolicyEngine::new();
        let policy = Policy::new("p1", Effect::Deny, ["get"], ["alice"], ["doc*"]);
        assert!(engine.applies(&policy, &request("get", "alice", "doc7")).unwrap());
        assert!(!engine.applies(&policy, &request("get", "alice", "img7")).unwrap());
    }

    #[test]
    fn test_free_function_uses_builtin_conditions() {
        let policies = vec![Policy::new("p1", Effect::Allow, ["get"], ["alice"], ["doc1"])];
        assert!(is_allowed(&policies, &request("get", "alice", "doc1")).unwrap());
    }
}
