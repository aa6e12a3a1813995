//! Custom error types for finance-store
//!
//! Cell operations themselves never fail. Errors come from the edges: the
//! identifier-based JSON access, configuration loading, the audit journal, and
//! the domain helpers that look records up by index.

use thiserror::Error;

/// The main error type for finance-store operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors (settings files, audit writers)
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// Write attempted on a derived cell
    #[error("Cell '{0}' is derived and cannot be written")]
    ReadOnly(String),
}

impl StoreError {
    /// Create a "not found" error for a rule index
    pub fn rule_not_found(index: usize) -> Self {
        Self::NotFound {
            entity_type: "Rule",
            identifier: index.to_string(),
        }
    }

    /// Create a "not found" error for an unknown cell identifier
    pub fn cell_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Cell",
            identifier: identifier.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a read-only error
    pub fn is_read_only(&self) -> bool {
        matches!(self, Self::ReadOnly(_))
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

impl From<serde_yaml::Error> for StoreError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Config(err.to_string())
    }
}

/// Result type alias for finance-store operations
pub type StoreResult<T> = Result<T, StoreError>;
