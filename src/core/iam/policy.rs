//! Policy record structure
//!
//! A policy grants or denies the actions it lists to the subjects it lists on
//! the resources it lists, optionally limited to a validity window and to
//! requests satisfying its conditions.

use super::timestamp::Timestamp;
use super::Condition;
use crate::error::{PolicyError, Result, TimestampField};
use serde::{Deserialize, Serialize};

/// Effect of a policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Effect {
    /// Allow the request
    Allow,
    /// Deny the request (takes precedence over Allow)
    Deny,
}

/// A single access policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Policy {
    /// Policy identifier
    pub id: String,

    /// Free-form description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Effect when this policy applies
    pub effect: Effect,

    /// Action patterns
    #[serde(default)]
    pub actions: Vec<String>,

    /// Subject patterns
    #[serde(default)]
    pub subjects: Vec<String>,

    /// Resource patterns
    #[serde(default)]
    pub resources: Vec<String>,

    /// Start of the validity window (exclusive), `yyyy-MM-dd HH:mm`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_time: Option<String>,

    /// End of the validity window (exclusive), `yyyy-MM-dd HH:mm`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_time: Option<String>,

    /// Conditions that must all hold
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,
}

impl Policy {
    /// Create a new policy without window or conditions
    pub fn new<A, S, R>(
        id: impl Into<String>,
        effect: Effect,
        actions: A,
        subjects: S,
        resources: R,
    ) -> Self
    where
        A: IntoIterator,
        A::Item: Into<String>,
        S: IntoIterator,
        S::Item: Into<String>,
        R: IntoIterator,
        R::Item: Into<String>,
    {
        Policy {
            id: id.into(),
            description: None,
            effect,
            actions: actions.into_iter().map(Into::into).collect(),
            subjects: subjects.into_iter().map(Into::into).collect(),
            resources: resources.into_iter().map(Into::into).collect(),
            from_time: None,
            to_time: None,
            conditions: Vec::new(),
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the lower bound of the validity window
    pub fn with_from_time(mut self, from_time: impl Into<String>) -> Self {
        self.from_time = Some(from_time.into());
        self
    }

    /// Set the upper bound of the validity window
    pub fn with_to_time(mut self, to_time: impl Into<String>) -> Self {
        self.to_time = Some(to_time.into());
        self
    }

    /// Set both bounds of the validity window
    pub fn with_window(self, from_time: impl Into<String>, to_time: impl Into<String>) -> Self {
        self.with_from_time(from_time).with_to_time(to_time)
    }

    /// Attach a condition
    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Whether this policy has an allow effect
    pub fn allows_access(&self) -> bool {
        self.effect == Effect::Allow
    }

    /// Whether this policy is limited to a validity window
    pub fn has_window(&self) -> bool {
        self.from_time.is_some() || self.to_time.is_some()
    }

    /// Parse policy from JSON string
    pub fn from_json(json: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Parse a JSON array of policies
    pub fn list_from_json(json: &str) -> std::result::Result<Vec<Self>, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize policy to JSON string
    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Validate policy structure
    ///
    /// The engine never calls this: it treats empty pattern sets as "matches
    /// nothing" and reports malformed bounds when it reaches them. Validation
    /// is for the management side, before a policy is stored.
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(PolicyError::InvalidPolicy("policy id must not be empty".to_string()));
        }

        for (name, patterns) in [
            ("actions", &self.actions),
            ("subjects", &self.subjects),
            ("resources", &self.resources),
        ] {
            if patterns.is_empty() {
                return Err(PolicyError::InvalidPolicy(format!(
                    "policy {} has no {}",
                    self.id, name
                )));
            }
        }

        let from = self
            .from_time
            .as_deref()
            .map(|value| Timestamp::parse(value, TimestampField::FromTime))
            .transpose()?;
        let to = self
            .to_time
            .as_deref()
            .map(|value| Timestamp::parse(value, TimestampField::ToTime))
            .transpose()?;

        if let (Some(from), Some(to)) = (from, to) {
            if from >= to {
                return Err(PolicyError::InvalidPolicy(format!(
                    "policy {} has an empty window: {} is not before {}",
                    self.id, from, to
                )));
            }
        }

        for (i, condition) in self.conditions.iter().enumerate() {
            if condition.kind.is_empty() {
                return Err(PolicyError::InvalidPolicy(format!(
                    "policy {} condition {} has no type",
                    self.id, i
                )));
            }
        }

        Ok(())
    }
}
