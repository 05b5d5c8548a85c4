//! Error types for port operations.

/// Repository operation errors with context for debugging.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    /// Entity not found - includes entity type and ID for actionable error messages.
    #[error("{entity_type} not found: {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// Another board already uses the requested name.
    #[error("Board name already taken: {0}")]
    NameTaken(String),

    /// Database operation failed - includes operation name for tracing.
    #[error("Database error in {operation}: {message}")]
    Database {
        operation: &'static str,
        message: String,
    },

    /// Serialization/deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Storage constraint violated that validation did not anticipate.
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),
}

impl RepoError {
    /// Create a NotFound error with entity type and ID context.
    pub fn not_found(entity_type: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity_type,
            id: id.to_string(),
        }
    }

    /// Create a Database error with operation context.
    pub fn database(operation: &'static str, message: impl ToString) -> Self {
        Self::Database {
            operation,
            message: message.to_string(),
        }
    }

    /// Create a Serialization error.
    pub fn serialization(message: impl ToString) -> Self {
        Self::Serialization(message.to_string())
    }

    /// Create a ConstraintViolation error.
    pub fn constraint(message: impl ToString) -> Self {
        Self::ConstraintViolation(message.to_string())
    }

    /// Check if this is a NotFound error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Map a sqlx error raised while running `operation`.
    ///
    /// A storage-level "no rows" result is the same condition as a missing
    /// record, so it becomes `NotFound` rather than a database failure.
    pub fn from_sqlx(operation: &'static str, err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Self::not_found("Record", operation),
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                Self::constraint(format!("{operation}: {}", db.message()))
            }
            other => Self::database(operation, other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_not_found_is_a_not_found_error() {
        let err = RepoError::from_sqlx("get_board", sqlx::Error::RowNotFound);
        assert!(err.is_not_found());
    }

    #[test]
    fn other_sqlx_errors_keep_operation_context() {
        let err = RepoError::from_sqlx("list_boards", sqlx::Error::PoolTimedOut);
        assert!(matches!(
            err,
            RepoError::Database {
                operation: "list_boards",
                ..
            }
        ));
    }
}
