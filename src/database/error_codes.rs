//! PostgreSQL Error Codes
//!
//! SQLSTATE constants used to classify storage errors, so the rest of the
//! crate never matches on magic strings.
//!
//! Full list: <https://www.postgresql.org/docs/current/errcodes-appendix.html>
//!
//! ## Usage
//!
//! ```rust
//! use todo_core::database::error_codes::PgErrorCode;
//!
//! assert!(PgErrorCode::is_write_conflict("40001"));
//! assert!(PgErrorCode::is_foreign_key_violation("23503"));
//! ```

/// PostgreSQL SQLSTATE error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PgErrorCode;

impl PgErrorCode {
    // =========================================================================
    // Class 23: Integrity Constraint Violation
    // =========================================================================

    /// Unique violation (duplicate key) - Code 23505
    ///
    /// Raised when creating a user whose email already exists.
    pub const UNIQUE_VIOLATION: &'static str = "23505";

    /// Foreign key violation - Code 23503
    ///
    /// Raised when a todo is assigned to an email with no matching user.
    pub const FOREIGN_KEY_VIOLATION: &'static str = "23503";

    /// Not null violation - Code 23502
    pub const NOT_NULL_VIOLATION: &'static str = "23502";

    // =========================================================================
    // Class 40: Transaction Rollback
    // =========================================================================

    /// Serialization failure - Code 40001
    ///
    /// A SERIALIZABLE transaction could not be serialized with a concurrent
    /// one. Nothing it wrote was committed.
    pub const SERIALIZATION_FAILURE: &'static str = "40001";

    /// Deadlock detected - Code 40P01
    ///
    /// One of the waiting transactions was rolled back to break the cycle.
    pub const DEADLOCK_DETECTED: &'static str = "40P01";

    // =========================================================================
    // Class 57: Operator Intervention
    // =========================================================================

    /// Query canceled - Code 57014
    ///
    /// Raised when `statement_timeout` expires.
    pub const QUERY_CANCELED: &'static str = "57014";

    /// Check if the error code is a unique constraint violation
    #[inline]
    pub fn is_unique_violation(code: &str) -> bool {
        code == Self::UNIQUE_VIOLATION
    }

    /// Check if the error code is a foreign key violation
    #[inline]
    pub fn is_foreign_key_violation(code: &str) -> bool {
        code == Self::FOREIGN_KEY_VIOLATION
    }

    /// Check if the error code is any integrity constraint violation (Class 23)
    #[inline]
    pub fn is_integrity_constraint_violation(code: &str) -> bool {
        code.starts_with("23")
    }

    /// Serialization failures and deadlocks: concurrent writers that cannot both commit
    #[inline]
    pub fn is_write_conflict(code: &str) -> bool {
        code == Self::SERIALIZATION_FAILURE || code == Self::DEADLOCK_DETECTED
    }

    #[inline]
    pub fn is_query_canceled(code: &str) -> bool {
        code == Self::QUERY_CANCELED
    }
}

/// SQLSTATE of a database error, if `err` carries one
pub fn sqlstate(err: &sqlx::Error) -> Option<String> {
    err.as_database_error()
        .and_then(|db_err| db_err.code())
        .map(|code| code.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integrity_constraint_class() {
        assert!(PgErrorCode::is_integrity_constraint_violation("23505"));
        assert!(PgErrorCode::is_integrity_constraint_violation("23503"));
        assert!(!PgErrorCode::is_integrity_constraint_violation("40001"));
        assert!(PgErrorCode::is_unique_violation("23505"));
        assert!(!PgErrorCode::is_unique_violation("23503"));
    }

    #[test]
    fn test_write_conflicts() {
        assert!(PgErrorCode::is_write_conflict("40001"));
        assert!(PgErrorCode::is_write_conflict("40P01"));
        assert!(!PgErrorCode::is_write_conflict("23505"));
        assert!(!PgErrorCode::is_write_conflict("57014"));
    }

    #[test]
    fn test_non_database_errors_have_no_sqlstate() {
        assert_eq!(sqlstate(&sqlx::Error::RowNotFound), None);
        assert!(PgErrorCode::is_query_canceled("57014"));
    }
}
