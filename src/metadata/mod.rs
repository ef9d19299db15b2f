//! # Entity Metadata Registry
//!
//! Statically declared description of every queryable entity: its table, its
//! fields, and for each field whether it is a scalar column or a relation to
//! another entity. The registry is built once at startup, validated, and then
//! shared read-only (`Arc<MetadataRegistry>`) by every compile.
//!
//! ## Key Components
//!
//! - [`FieldKind`] - Scalar column or relation (with its join keys)
//! - [`EntityMetadata`] - One entity's table and field map
//! - [`MetadataRegistry`] - Lookup by entity name
//! - [`schema`] - The declared `Todo`/`User` schema

pub mod schema;

use crate::error::{Result, TodoError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub use schema::todo_schema;

/// Storage type of a scalar column, used to cast bound parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    Text,
    Uuid,
    Timestamp,
    Integer,
    Boolean,
}

impl ColumnType {
    /// Cast applied to a bound parameter compared against this column
    pub fn parameter_cast(&self) -> Option<&'static str> {
        match self {
            ColumnType::Uuid => Some("uuid"),
            ColumnType::Timestamp => Some("timestamptz"),
            ColumnType::Text | ColumnType::Integer | ColumnType::Boolean => None,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, ColumnType::Text)
    }
}

/// Kind of a declared field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldKind {
    Scalar {
        column: String,
        column_type: ColumnType,
    },
    /// Joined as `<target>.<foreign_column> = <parent>.<local_column>`
    Relation {
        target_entity: String,
        local_column: String,
        foreign_column: String,
    },
}

impl FieldKind {
    pub fn is_relation(&self) -> bool {
        matches!(self, FieldKind::Relation { .. })
    }
}

/// Metadata for one entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityMetadata {
    pub name: String,
    pub table: String,
    pub primary_key: String,
    fields: HashMap<String, FieldKind>,
}

impl EntityMetadata {
    pub fn new(name: &str, table: &str) -> Self {
        Self {
            name: name.to_string(),
            table: table.to_string(),
            primary_key: "id".to_string(),
            fields: HashMap::new(),
        }
    }

    pub fn with_primary_key(mut self, column: &str) -> Self {
        self.primary_key = column.to_string();
        self
    }

    /// Declare a scalar field stored in `column`
    pub fn scalar(mut self, field: &str, column: &str, column_type: ColumnType) -> Self {
        self.fields.insert(
            field.to_string(),
            FieldKind::Scalar {
                column: column.to_string(),
                column_type,
            },
        );
        self
    }

    /// Declare a relation field pointing at `target_entity`
    pub fn relation(
        mut self,
        field: &str,
        target_entity: &str,
        local_column: &str,
        foreign_column: &str,
    ) -> Self {
        self.fields.insert(
            field.to_string(),
            FieldKind::Relation {
                target_entity: target_entity.to_string(),
                local_column: local_column.to_string(),
                foreign_column: foreign_column.to_string(),
            },
        );
        self
    }

    pub fn field(&self, name: &str) -> Option<&FieldKind> {
        self.fields.get(name)
    }

    /// Field names in a stable (sorted) order
    pub fn field_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.fields.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn relations(&self) -> impl Iterator<Item = (&str, &FieldKind)> {
        self.fields
            .iter()
            .filter(|(_, kind)| kind.is_relation())
            .map(|(name, kind)| (name.as_str(), kind))
    }
}

/// Registry of all declared entities
#[derive(Debug, Clone, Default)]
pub struct MetadataRegistry {
    entities: HashMap<String, EntityMetadata>,
}

impl MetadataRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an entity; names must be unique
    pub fn register(&mut self, entity: EntityMetadata) -> Result<()> {
        if self.entities.contains_key(&entity.name) {
            return Err(TodoError::Configuration(format!(
                "entity '{}' is already registered",
                entity.name
            )));
        }
        self.entities.insert(entity.name.clone(), entity);
        Ok(())
    }

    /// Look up an entity by name. An unknown name is a programming error, not a request error.
    pub fn get_entity(&self, name: &str) -> Result<&EntityMetadata> {
        self.entities
            .get(name)
            .ok_or_else(|| TodoError::UnknownEntity(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entities.contains_key(name)
    }

    pub fn entity_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entities.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Check that every relation points at a registered entity
    pub fn validate(&self) -> Result<()> {
        for entity in self.entities.values() {
            for (field, kind) in entity.relations() {
                if let FieldKind::Relation { target_entity, .. } = kind {
                    if !self.contains(target_entity) {
                        return Err(TodoError::Configuration(format!(
                            "relation {}.{} targets unregistered entity '{}'",
                            entity.name, field, target_entity
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}
