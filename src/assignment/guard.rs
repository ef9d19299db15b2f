//! Serializable unit of work for single-owner assignment.

use super::store::{AssignmentStore, AssignmentTransaction, IsolationLevel};
use crate::constants::entities::TODO;
use crate::error::{Result, TodoError};
use crate::logging::{log_assignment_operation, log_error};
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

/// Result of a successful assignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentOutcome {
    /// The resource was unassigned and now belongs to the requested owner
    Assigned,
    /// The requested owner already held the resource; nothing was written
    Unchanged,
}

impl AssignmentOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssignmentOutcome::Assigned => "assigned",
            AssignmentOutcome::Unchanged => "unchanged",
        }
    }
}

/// Runs business transactions with guaranteed rollback on every error path.
///
/// Conflicts are surfaced as [`TodoError::Conflict`] and never retried here.
#[derive(Clone)]
pub struct ConcurrencyGuard {
    store: Arc<dyn AssignmentStore>,
}

impl std::fmt::Debug for ConcurrencyGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConcurrencyGuard").finish_non_exhaustive()
    }
}

impl ConcurrencyGuard {
    pub fn new(store: Arc<dyn AssignmentStore>) -> Self {
        Self { store }
    }

    /// Run `work` inside one transaction at `isolation`.
    ///
    /// Commits when `work` succeeds; rolls back and returns its error otherwise.
    /// A conflict at any statement or at commit becomes [`TodoError::Conflict`].
    pub async fn run_in_transaction<T, F>(&self, isolation: IsolationLevel, work: F) -> Result<T>
    where
        T: Send,
        F: for<'t> FnOnce(&'t mut dyn AssignmentTransaction) -> BoxFuture<'t, Result<T>> + Send,
    {
        let mut tx = self.store.begin(isolation).await?;

        match work(tx.as_mut()).await {
            Ok(value) => {
                tx.commit().await?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback().await {
                    warn!(error = %rollback_err, "rollback after failed unit of work also failed");
                }
                Err(err)
            }
        }
    }

    /// Assign `resource_id` to `requested_owner` if it is unassigned or
    /// already theirs.
    ///
    /// Among concurrent attempts on one unassigned resource at most one
    /// observes it unassigned and commits; the others fail with
    /// [`TodoError::BusinessRule`] or [`TodoError::Conflict`].
    #[instrument(skip_all, fields(resource_id = %resource_id))]
    pub async fn run_assignment(
        &self,
        resource_id: Uuid,
        requested_owner: &str,
    ) -> Result<AssignmentOutcome> {
        let owner = requested_owner.to_string();
        let result = self
            .run_in_transaction(IsolationLevel::Serializable, move |tx| {
                Box::pin(async move {
                    let state = tx
                        .load_assignment(resource_id)
                        .await?
                        .ok_or_else(|| TodoError::not_found(TODO, resource_id))?;

                    match state.current_owner.as_deref() {
                        Some(current) if current == owner => {
                            debug!("requested owner already holds the resource");
                            Ok(AssignmentOutcome::Unchanged)
                        }
                        Some(_) => Err(TodoError::BusinessRule(
                            "Todo is already assigned".to_string(),
                        )),
                        None => {
                            tx.store_owner(resource_id, &owner).await?;
                            Ok(AssignmentOutcome::Assigned)
                        }
                    }
                })
            })
            .await;

        let resource = resource_id.to_string();
        match &result {
            Ok(outcome) => {
                log_assignment_operation(&resource, requested_owner, outcome.as_str(), None)
            }
            Err(err) if err.is_client_error() => log_assignment_operation(
                &resource,
                requested_owner,
                "rejected",
                Some(&err.to_string()),
            ),
            Err(err) => log_error(
                "concurrency_guard",
                "run_assignment",
                &err.to_string(),
                Some(&resource),
            ),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assignment::memory::InMemoryAssignmentStore;

    fn guard_with(store: &InMemoryAssignmentStore) -> ConcurrencyGuard {
        ConcurrencyGuard::new(Arc::new(store.clone()))
    }

    #[tokio::test]
    async fn test_assigns_unassigned_resource() {
        let store = InMemoryAssignmentStore::new();
        let id = store.insert(None);

        let outcome = guard_with(&store).run_assignment(id, "a@b.com").await.unwrap();

        assert_eq!(outcome, AssignmentOutcome::Assigned);
        assert_eq!(store.owner_of(id), Some(Some("a@b.com".to_string())));
    }

    #[tokio::test]
    async fn test_same_owner_is_a_noop() {
        let store = InMemoryAssignmentStore::new();
        let id = store.insert(Some("a@b.com"));
        let version = store.version_of(id);

        let outcome = guard_with(&store).run_assignment(id, "a@b.com").await.unwrap();

        assert_eq!(outcome, AssignmentOutcome::Unchanged);
        assert_eq!(store.version_of(id), version);
    }

    #[tokio::test]
    async fn test_other_owner_violates_business_rule() {
        let store = InMemoryAssignmentStore::new();
        let id = store.insert(Some("a@b.com"));

        let err = guard_with(&store)
            .run_assignment(id, "c@d.com")
            .await
            .unwrap_err();

        assert_eq!(err, TodoError::BusinessRule("Todo is already assigned".to_string()));
        assert_eq!(store.owner_of(id), Some(Some("a@b.com".to_string())));
    }

    #[tokio::test]
    async fn test_missing_resource_is_not_found() {
        let store = InMemoryAssignmentStore::new();
        let id = Uuid::new_v4();

        let err = guard_with(&store).run_assignment(id, "a@b.com").await.unwrap_err();

        assert_eq!(err, TodoError::not_found("Todo", id));
    }

    #[tokio::test]
    async fn test_failed_work_is_rolled_back() {
        let store = InMemoryAssignmentStore::new();
        let id = store.insert(None);

        let err = guard_with(&store)
            .run_in_transaction(IsolationLevel::Serializable, move |tx| {
                Box::pin(async move {
                    tx.store_owner(id, "a@b.com").await?;
                    Err::<(), _>(TodoError::Validation("late failure".to_string()))
                })
            })
            .await
            .unwrap_err();

        assert!(matches!(err, TodoError::Validation(_)));
        assert_eq!(store.owner_of(id), Some(None));
    }
}
