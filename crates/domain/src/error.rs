//! Unified error type for the domain layer

use thiserror::Error;

/// Unified error type for domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Validation failed (e.g., invalid field values)
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Identifier string could not be parsed
    #[error("Invalid ID string: {0}")]
    InvalidId(String),

    /// Entity not found
    #[error("{entity_type} with id {id} not found")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// Parse error (for enumerated values)
    #[error("Parse error: {0}")]
    Parse(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn not_found(entity_type: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity_type,
            id: id.to_string(),
        }
    }

    /// Creates a parse error for raw-value-to-enum conversions.
    ///
    /// # Example
    /// ```
    /// use cityroute_domain::{DomainError, SpaceType};
    ///
    /// let err = SpaceType::try_from(7).unwrap_err();
    /// assert!(matches!(err, DomainError::Parse(_)));
    /// ```
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }
}
