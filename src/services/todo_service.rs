use super::{build_list_query, ListQuery};
use crate::assignment::{AssignmentOutcome, ConcurrencyGuard, PgAssignmentStore};
use crate::config::AppConfig;
use crate::constants::entities::TODO;
use crate::error::{Result, TodoError};
use crate::metadata::MetadataRegistry;
use crate::models::{NewTodo, Todo};
use crate::validation::{validate_owner, validate_todo_description, validate_todo_name};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{debug, info, instrument};
use uuid::Uuid;

/// Todo operations: filtered listing, creation, assignment and removal.
///
/// Assignment runs through a [`ConcurrencyGuard`] so that concurrent
/// requests for one unassigned todo produce exactly one owner.
#[derive(Debug, Clone)]
pub struct TodoService {
    pool: PgPool,
    registry: Arc<MetadataRegistry>,
    guard: ConcurrencyGuard,
    config: Arc<AppConfig>,
}

impl TodoService {
    pub fn new(pool: PgPool, registry: Arc<MetadataRegistry>, config: Arc<AppConfig>) -> Self {
        let guard = ConcurrencyGuard::new(Arc::new(PgAssignmentStore::new(pool.clone())));
        Self {
            pool,
            registry,
            guard,
            config,
        }
    }

    /// Replace the assignment guard, e.g. to run assignment against another store
    pub fn with_guard(mut self, guard: ConcurrencyGuard) -> Self {
        self.guard = guard;
        self
    }

    /// List todos matching the request's filter, order and page
    #[instrument(skip_all)]
    pub async fn find_all(&self, request: &ListQuery) -> Result<Vec<Todo>> {
        let (plan, builder) = build_list_query(&self.registry, &self.config.query, TODO, request)?;
        let todos = Todo::find_by_query(&self.pool, &builder).await?;
        debug!(
            joins = plan.joins.len(),
            count = todos.len(),
            "listed todos"
        );
        Ok(todos)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Todo> {
        Todo::find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| TodoError::not_found(TODO, id))
    }

    /// Create an unassigned todo after trimming and length checks
    pub async fn create(&self, name: &str, description: Option<&str>) -> Result<Todo> {
        let new_todo = NewTodo {
            name: validate_todo_name(name)?,
            description: validate_todo_description(description)?,
        };
        let todo = Todo::create(&self.pool, new_todo).await?;
        info!(todo_id = %todo.id, "created todo");
        Ok(todo)
    }

    /// Assign a todo to `owner` (a user email).
    ///
    /// Fails with [`TodoError::BusinessRule`] when another owner holds it and
    /// [`TodoError::Conflict`] when a concurrent assignment won the race.
    pub async fn assign_to(&self, id: Uuid, owner: &str) -> Result<AssignmentOutcome> {
        let owner = validate_owner(owner, self.config.assignment.max_owner_length)?;
        self.guard.run_assignment(id, &owner).await
    }

    pub async fn remove(&self, id: Uuid) -> Result<()> {
        if Todo::delete(&self.pool, id).await? {
            info!(todo_id = %id, "removed todo");
            Ok(())
        } else {
            Err(TodoError::not_found(TODO, id))
        }
    }
}
