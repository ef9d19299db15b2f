//! Transaction surface consumed by the concurrency guard.

use crate::database::error_codes::{sqlstate, PgErrorCode};
use crate::error::TodoError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Current owner of one resource, read inside a transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentState {
    pub resource_id: Uuid,
    pub current_owner: Option<String>,
}

/// Two concurrent serializable transactions could not both commit.
/// Carries no retry state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConflictSignal;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IsolationLevel {
    ReadCommitted,
    RepeatableRead,
    Serializable,
}

impl IsolationLevel {
    pub fn as_sql(&self) -> &'static str {
        match self {
            IsolationLevel::ReadCommitted => "READ COMMITTED",
            IsolationLevel::RepeatableRead => "REPEATABLE READ",
            IsolationLevel::Serializable => "SERIALIZABLE",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("write conflict with a concurrent transaction")]
    Conflict(ConflictSignal),

    #[error("owner does not exist: {0}")]
    ForeignKey(String),

    #[error("storage error: {0}")]
    Backend(String),
}

impl StorageError {
    /// Classify a SQLx error by SQLSTATE
    pub fn from_sqlx(err: sqlx::Error) -> Self {
        match sqlstate(&err) {
            Some(code) if PgErrorCode::is_write_conflict(&code) => {
                StorageError::Conflict(ConflictSignal)
            }
            Some(code) if PgErrorCode::is_foreign_key_violation(&code) => {
                StorageError::ForeignKey(err.to_string())
            }
            _ => StorageError::Backend(err.to_string()),
        }
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, StorageError::Conflict(_))
    }
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        StorageError::from_sqlx(err)
    }
}

impl From<StorageError> for TodoError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Conflict(_) => TodoError::Conflict,
            StorageError::ForeignKey(detail) => {
                TodoError::Validation(format!("assignee must be an existing user ({detail})"))
            }
            StorageError::Backend(detail) => TodoError::Database(detail),
        }
    }
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Opens transactions at a requested isolation level
#[async_trait]
pub trait AssignmentStore: Send + Sync {
    async fn begin(&self, isolation: IsolationLevel) -> StorageResult<Box<dyn AssignmentTransaction>>;
}

/// One open transaction. Dropping it without `commit` discards its writes.
#[async_trait]
pub trait AssignmentTransaction: Send {
    /// `None` when the resource does not exist
    async fn load_assignment(&mut self, resource_id: Uuid) -> StorageResult<Option<AssignmentState>>;

    async fn store_owner(&mut self, resource_id: Uuid, owner: &str) -> StorageResult<()>;

    async fn commit(self: Box<Self>) -> StorageResult<()>;

    async fn rollback(self: Box<Self>) -> StorageResult<()>;
}
