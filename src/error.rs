//! # Error Types
//!
//! Crate-wide error taxonomy. Compiler errors are client errors and fail the
//! request before any plan is produced; assignment errors are raised by the
//! concurrency guard only after its transaction has been rolled back.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TodoError {
    #[error("{field} field not found in {entity} entity")]
    UnknownField { entity: String, field: String },

    #[error("Unsupported operator '{operator}' for {entity}.{field}")]
    UnknownOperator {
        entity: String,
        field: String,
        operator: String,
    },

    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    #[error("Invalid sort: {0}")]
    InvalidSort(String),

    #[error("Filter nesting exceeds the maximum depth of {max_depth}")]
    DepthExceeded { max_depth: usize },

    #[error("Unknown entity: {0}")]
    UnknownEntity(String),

    #[error("{entity} {id} not found")]
    NotFound { entity: String, id: String },

    #[error("Business rule violated: {0}")]
    BusinessRule(String),

    #[error("Concurrency error. Please try again.")]
    Conflict,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl TodoError {
    pub fn unknown_field(entity: impl Into<String>, field: impl Into<String>) -> Self {
        Self::UnknownField {
            entity: entity.into(),
            field: field.into(),
        }
    }

    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// HTTP-equivalent status used by the request layer when surfacing the error
    pub fn status_code(&self) -> u16 {
        match self {
            TodoError::UnknownField { .. }
            | TodoError::UnknownOperator { .. }
            | TodoError::InvalidFilter(_)
            | TodoError::InvalidSort(_)
            | TodoError::DepthExceeded { .. }
            | TodoError::BusinessRule(_)
            | TodoError::Validation(_) => 400,
            TodoError::NotFound { .. } => 404,
            TodoError::Conflict => 409,
            TodoError::UnknownEntity(_)
            | TodoError::Configuration(_)
            | TodoError::Database(_) => 500,
        }
    }

    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code())
    }

    /// Only write conflicts are safe to retry as a whole: nothing was committed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, TodoError::Conflict)
    }
}

impl From<sqlx::Error> for TodoError {
    fn from(err: sqlx::Error) -> Self {
        TodoError::Database(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, TodoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_field_message_names_field_and_entity() {
        let err = TodoError::unknown_field("Todo", "priority");
        assert_eq!(err.to_string(), "priority field not found in Todo entity");
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(TodoError::not_found("Todo", "abc").status_code(), 404);
        assert_eq!(TodoError::BusinessRule("x".into()).status_code(), 400);
        assert_eq!(TodoError::Conflict.status_code(), 409);
        assert_eq!(TodoError::UnknownEntity("Foo".into()).status_code(), 500);
    }

    #[test]
    fn test_only_conflicts_are_retryable() {
        assert!(TodoError::Conflict.is_retryable());
        assert!(!TodoError::BusinessRule("already assigned".into()).is_retryable());
        assert!(!TodoError::Database("boom".into()).is_retryable());
    }
}
