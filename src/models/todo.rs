use crate::query_builder::QueryBuilder;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

/// A todo item, optionally assigned to a user by email.
/// Maps to the `todos` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub assignee: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// New Todo for creation (without generated fields)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTodo {
    pub name: String,
    pub description: Option<String>,
}

const COLUMNS: &str = "id, name, description, assignee, created_at";

impl Todo {
    /// Create a new, unassigned todo
    pub async fn create(pool: &PgPool, new_todo: NewTodo) -> Result<Todo, sqlx::Error> {
        sqlx::query_as::<_, Todo>(&format!(
            "INSERT INTO todos (name, description) VALUES ($1, $2) RETURNING {COLUMNS}"
        ))
        .bind(new_todo.name)
        .bind(new_todo.description)
        .fetch_one(pool)
        .await
    }

    /// Find a todo by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Todo>, sqlx::Error> {
        sqlx::query_as::<_, Todo>(&format!("SELECT {COLUMNS} FROM todos WHERE id = $1"))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all todos, newest first
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Todo>, sqlx::Error> {
        sqlx::query_as::<_, Todo>(&format!(
            "SELECT {COLUMNS} FROM todos ORDER BY created_at DESC"
        ))
        .fetch_all(pool)
        .await
    }

    /// Run an assembled query rooted at `todos e0`
    pub async fn find_by_query(pool: &PgPool, query: &QueryBuilder) -> Result<Vec<Todo>, sqlx::Error> {
        query.fetch_all::<Todo>(pool).await
    }

    /// Delete a todo; returns whether a row was removed
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM todos WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
