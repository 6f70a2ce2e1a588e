//! Configuration for the policy store and access service
//!
//! ```toml
//! validate_policies = true
//! max_policies = 10000
//! log_decisions = false
//! ```
//!
//! Every key is optional.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Reject policies that fail [`Policy::validate`](crate::iam::Policy::validate)
    /// when they are added to a store
    pub validate_policies: bool,

    /// Maximum number of policies a store accepts (unbounded if absent)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_policies: Option<usize>,

    /// Log every decision at info level
    pub log_decisions: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            validate_policies: true,
            max_policies: None,
            log_decisions: false,
        }
    }
}

impl EngineConfig {
    /// Parse configuration from a TOML string
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}
