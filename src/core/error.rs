use std::fmt;
use thiserror::Error;

/// Which timestamp field failed to parse
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampField {
    /// Policy lower bound (`fromTime`)
    FromTime,
    /// Policy upper bound (`toTime`)
    ToTime,
    /// Request time (`currentTime`)
    CurrentTime,
}

impl fmt::Display for TimestampField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TimestampField::FromTime => "fromTime",
            TimestampField::ToTime => "toTime",
            TimestampField::CurrentTime => "currentTime",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum PolicyError {
    #[error("Malformed timestamp in {field}: {value:?} (expected yyyy-MM-dd HH:mm)")]
    MalformedTimestamp { field: TimestampField, value: String },

    #[error("Invalid policy: {0}")]
    InvalidPolicy(String),

    #[error("Policy already exists: {0}")]
    DuplicatePolicy(String),

    #[error("Policy not found: {0}")]
    PolicyNotFound(String),

    #[error("Policy store is full: at most {0} policies allowed")]
    CapacityExceeded(usize),

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PolicyError {
    /// Whether this error comes from malformed request or policy data
    /// rather than from the store or its configuration.
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            PolicyError::MalformedTimestamp { .. } | PolicyError::InvalidPolicy(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, PolicyError>;
