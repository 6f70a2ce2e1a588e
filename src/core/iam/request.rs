//! Access request descriptor

use super::ConditionValue;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single access attempt
///
/// `action`, `subject` and `resource` are literal values matched against a
/// policy's pattern sets. `attributes` carries whatever extra context the
/// policies' conditions inspect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    pub action: String,
    pub subject: String,
    pub resource: String,

    /// Request time in `yyyy-MM-dd HH:mm` format
    pub current_time: String,

    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub attributes: HashMap<String, ConditionValue>,
}

impl Request {
    /// Create a request without extra attributes
    pub fn new(
        action: impl Into<String>,
        subject: impl Into<String>,
        resource: impl Into<String>,
        current_time: impl Into<String>,
    ) -> Self {
        Request {
            action: action.into(),
            subject: subject.into(),
            resource: resource.into(),
            current_time: current_time.into(),
            attributes: HashMap::new(),
        }
    }

    /// Add a condition attribute
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<ConditionValue>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Look up an attribute by name
    ///
    /// The request's own fields (`action`, `subject`, `resource`,
    /// `currentTime`) shadow custom attributes of the same name.
    pub fn attribute(&self, key: &str) -> Option<ConditionValue> {
        let builtin = match key {
            "action" => Some(&self.action),
            "subject" => Some(&self.subject),
            "resource" => Some(&self.resource),
            "currentTime" => Some(&self.current_time),
            _ => None,
        };

        match builtin {
            Some(value) => Some(ConditionValue::String(value.clone())),
            None => self.attributes.get(key).cloned(),
        }
    }

    /// Parse a request from JSON
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
