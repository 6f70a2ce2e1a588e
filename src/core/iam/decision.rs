//! Outcome of evaluating a request against a policy set

use std::fmt;

/// Why a decision came out the way it did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecisionReason {
    /// At least one allow policy applied and no deny policy did.
    /// `policy_id` is the first allow policy that applied.
    ExplicitAllow { policy_id: String },
    /// A deny policy applied
    ExplicitDeny { policy_id: String },
    /// No policy applied (default deny)
    NoApplicablePolicy,
}

/// The result of an evaluation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub allowed: bool,
    pub reason: DecisionReason,
}

impl Decision {
    pub fn allow(policy_id: impl Into<String>) -> Self {
        Decision {
            allowed: true,
            reason: DecisionReason::ExplicitAllow {
                policy_id: policy_id.into(),
            },
        }
    }

    pub fn deny(policy_id: impl Into<String>) -> Self {
        Decision {
            allowed: false,
            reason: DecisionReason::ExplicitDeny {
                policy_id: policy_id.into(),
            },
        }
    }

    pub fn no_applicable_policy() -> Self {
        Decision {
            allowed: false,
            reason: DecisionReason::NoApplicablePolicy,
        }
    }

    /// Id of the policy that decided the outcome, if any
    pub fn decided_by(&self) -> Option<&str> {
        match &self.reason {
            DecisionReason::ExplicitAllow { policy_id } | DecisionReason::ExplicitDeny { policy_id } => {
                Some(policy_id)
            }
            DecisionReason::NoApplicablePolicy => None,
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reason {
            DecisionReason::ExplicitAllow { policy_id } => write!(f, "allowed by policy {}", policy_id),
            DecisionReason::ExplicitDeny { policy_id } => write!(f, "denied by policy {}", policy_id),
            DecisionReason::NoApplicablePolicy => f.write_str("denied: no applicable policy"),
        }
    }
}
