//! In-memory transaction surface with serializable conflict detection.
//!
//! Rows carry a version. A repeatable-read or serializable transaction
//! remembers the version of every row it read and fails at commit with a
//! [`ConflictSignal`] if any of them changed meanwhile, so the first
//! committer wins. Used by tests and tooling that run without PostgreSQL.

use super::store::{
    AssignmentState, AssignmentStore, AssignmentTransaction, ConflictSignal, IsolationLevel,
    StorageError, StorageResult,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::trace;
use uuid::Uuid;

#[derive(Debug, Clone)]
struct VersionedRow {
    owner: Option<String>,
    version: u64,
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryAssignmentStore {
    rows: Arc<Mutex<HashMap<Uuid, VersionedRow>>>,
    read_delay: Option<Duration>,
}

impl InMemoryAssignmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep after every read, widening the window between read and commit
    pub fn with_read_delay(mut self, delay: Duration) -> Self {
        self.read_delay = Some(delay);
        self
    }

    /// Insert a new resource and return its id
    pub fn insert(&self, owner: Option<&str>) -> Uuid {
        let id = Uuid::new_v4();
        self.insert_with_id(id, owner);
        id
    }

    pub fn insert_with_id(&self, id: Uuid, owner: Option<&str>) {
        self.rows.lock().insert(
            id,
            VersionedRow {
                owner: owner.map(str::to_string),
                version: 0,
            },
        );
    }

    /// Committed owner; `None` when the resource does not exist
    pub fn owner_of(&self, id: Uuid) -> Option<Option<String>> {
        self.rows.lock().get(&id).map(|row| row.owner.clone())
    }

    /// Committed row version; bumped by every committed write
    pub fn version_of(&self, id: Uuid) -> Option<u64> {
        self.rows.lock().get(&id).map(|row| row.version)
    }
}

#[async_trait]
impl AssignmentStore for InMemoryAssignmentStore {
    async fn begin(&self, isolation: IsolationLevel) -> StorageResult<Box<dyn AssignmentTransaction>> {
        Ok(Box::new(InMemoryTransaction {
            rows: Arc::clone(&self.rows),
            read_delay: self.read_delay,
            isolation,
            read_versions: HashMap::new(),
            writes: HashMap::new(),
        }))
    }
}

struct InMemoryTransaction {
    rows: Arc<Mutex<HashMap<Uuid, VersionedRow>>>,
    read_delay: Option<Duration>,
    isolation: IsolationLevel,
    /// Version seen per row read; `None` when the row was absent
    read_versions: HashMap<Uuid, Option<u64>>,
    writes: HashMap<Uuid, String>,
}

impl InMemoryTransaction {
    fn validates_reads(&self) -> bool {
        !matches!(self.isolation, IsolationLevel::ReadCommitted)
    }
}

#[async_trait]
impl AssignmentTransaction for InMemoryTransaction {
    async fn load_assignment(&mut self, resource_id: Uuid) -> StorageResult<Option<AssignmentState>> {
        if let Some(owner) = self.writes.get(&resource_id) {
            return Ok(Some(AssignmentState {
                resource_id,
                current_owner: Some(owner.clone()),
            }));
        }

        let row = self.rows.lock().get(&resource_id).cloned();
        self.read_versions
            .entry(resource_id)
            .or_insert(row.as_ref().map(|row| row.version));

        if let Some(delay) = self.read_delay {
            tokio::time::sleep(delay).await;
        }

        Ok(row.map(|row| AssignmentState {
            resource_id,
            current_owner: row.owner,
        }))
    }

    async fn store_owner(&mut self, resource_id: Uuid, owner: &str) -> StorageResult<()> {
        self.writes.insert(resource_id, owner.to_string());
        Ok(())
    }

    async fn commit(self: Box<Self>) -> StorageResult<()> {
        let validates_reads = self.validates_reads();
        let InMemoryTransaction {
            rows,
            read_versions,
            writes,
            ..
        } = *self;
        let mut rows = rows.lock();

        if validates_reads {
            for (id, seen) in &read_versions {
                let current = rows.get(id).map(|row| row.version);
                if current != *seen {
                    trace!(resource_id = %id, "read set changed before commit");
                    return Err(StorageError::Conflict(ConflictSignal));
                }
            }
        }

        for (id, owner) in writes {
            if let Some(row) = rows.get_mut(&id) {
                row.owner = Some(owner);
                row.version += 1;
            }
        }
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> StorageResult<()> {
        Ok(())
    }
}
