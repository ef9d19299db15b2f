//! # Assignment Concurrency Control
//!
//! Enforces "assign resource X to owner Y only if unassigned or already
//! assigned to Y" under concurrent writers.
//!
//! Each attempt runs in one serializable transaction: load the current owner,
//! apply the business rule, write, commit. Storage-level write conflicts
//! (SQLSTATE `40001`/`40P01` on PostgreSQL, a changed read set in memory)
//! surface as [`TodoError::Conflict`](crate::error::TodoError::Conflict).
//! Nothing here retries.
//!
//! ## Key Components
//!
//! - [`store`] - The `AssignmentStore`/`AssignmentTransaction` surface
//! - [`guard`] - `ConcurrencyGuard`: unit of work with rollback on every error path
//! - [`postgres`] - SQLx implementation
//! - [`memory`] - In-memory implementation with first-committer-wins validation
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use todo_core::assignment::{AssignmentOutcome, ConcurrencyGuard, InMemoryAssignmentStore};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let store = InMemoryAssignmentStore::new();
//! let todo_id = store.insert(None);
//! let guard = ConcurrencyGuard::new(Arc::new(store));
//!
//! let outcome = guard.run_assignment(todo_id, "carlos.rgn@gmail.com").await.unwrap();
//! assert_eq!(outcome, AssignmentOutcome::Assigned);
//! # }
//! ```

pub mod guard;
pub mod memory;
pub mod postgres;
pub mod store;

pub use guard::{AssignmentOutcome, ConcurrencyGuard};
pub use memory::InMemoryAssignmentStore;
pub use postgres::PgAssignmentStore;
pub use store::{
    AssignmentState, AssignmentStore, AssignmentTransaction, ConflictSignal, IsolationLevel,
    StorageError, StorageResult,
};
