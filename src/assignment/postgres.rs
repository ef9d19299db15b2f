//! PostgreSQL transaction surface.

use super::store::{
    AssignmentState, AssignmentStore, AssignmentTransaction, IsolationLevel, StorageResult,
};
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct PgAssignmentStore {
    pool: PgPool,
}

impl PgAssignmentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AssignmentStore for PgAssignmentStore {
    async fn begin(&self, isolation: IsolationLevel) -> StorageResult<Box<dyn AssignmentTransaction>> {
        let mut tx = self.pool.begin().await?;
        // Must be the first statement of the transaction.
        sqlx::query(&format!(
            "SET TRANSACTION ISOLATION LEVEL {}",
            isolation.as_sql()
        ))
        .execute(&mut *tx)
        .await?;
        debug!(isolation = isolation.as_sql(), "opened assignment transaction");
        Ok(Box::new(PgAssignmentTransaction { tx }))
    }
}

pub struct PgAssignmentTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl AssignmentTransaction for PgAssignmentTransaction {
    async fn load_assignment(&mut self, resource_id: Uuid) -> StorageResult<Option<AssignmentState>> {
        let row = sqlx::query_as::<_, (Uuid, Option<String>)>(
            "SELECT id, assignee FROM todos WHERE id = $1",
        )
        .bind(resource_id)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(row.map(|(resource_id, current_owner)| AssignmentState {
            resource_id,
            current_owner,
        }))
    }

    async fn store_owner(&mut self, resource_id: Uuid, owner: &str) -> StorageResult<()> {
        sqlx::query("UPDATE todos SET assignee = $1 WHERE id = $2")
            .bind(owner)
            .bind(resource_id)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn commit(self: Box<Self>) -> StorageResult<()> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> StorageResult<()> {
        self.tx.rollback().await?;
        Ok(())
    }
}
