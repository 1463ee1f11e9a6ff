use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

lazy_static! {
    /// Phrasings hosts use when the entity to delete is already gone
    static ref MISSING_ENTITY: Regex =
        Regex::new(r"(?i)(not\s+found|does\s+not\s+exist|doesn't\s+exist|no\s+such|already\s+(?:deleted|removed))")
            .unwrap();
}

/// Failures reported by the host SDK
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HostError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Host rejected operation: {0}")]
    Rejected(String),

    #[error("Host unavailable: {0}")]
    Unavailable(String),
}

impl HostError {
    /// Whether the failure only means the entity is already absent.
    ///
    /// Hosts do not always use a dedicated error type for this, so rejected
    /// operations are also inspected by message.
    pub fn is_missing_entity(&self) -> bool {
        match self {
            HostError::NotFound(_) => true,
            HostError::Rejected(message) => MISSING_ENTITY.is_match(message),
            HostError::Unavailable(_) => false,
        }
    }
}

/// Invalid decoration configuration
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Configuration value '{field}' must be finite")]
    NonFinite { field: &'static str },

    #[error("Configuration value '{field}' must not be negative")]
    Negative { field: &'static str },

    #[error("Configuration value '{field}' must not be empty")]
    Empty { field: &'static str },

    #[error("Invalid timestamp format: {0}")]
    InvalidTimestampFormat(String),

    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}
