//! Declared schema for the todo service.
//!
//! Mirrors the `users`/`todos` tables in `migrations/`. A todo's assignee is
//! stored as the owning user's email, so `Todo.assignee` joins on
//! `users.email` and `User.todos` is the inverse relation.

use super::{ColumnType, EntityMetadata, MetadataRegistry};
use crate::constants::entities::{TODO, USER};
use crate::error::Result;

pub fn todo_entity() -> EntityMetadata {
    EntityMetadata::new(TODO, "todos")
        .with_primary_key("id")
        .scalar("id", "id", ColumnType::Uuid)
        .scalar("name", "name", ColumnType::Text)
        .scalar("description", "description", ColumnType::Text)
        .scalar("createdAt", "created_at", ColumnType::Timestamp)
        .relation("assignee", USER, "assignee", "email")
}

pub fn user_entity() -> EntityMetadata {
    EntityMetadata::new(USER, "users")
        .with_primary_key("id")
        .scalar("id", "id", ColumnType::Uuid)
        .scalar("email", "email", ColumnType::Text)
        .scalar("name", "name", ColumnType::Text)
        .scalar("createdAt", "created_at", ColumnType::Timestamp)
        .relation("todos", TODO, "email", "assignee")
}

/// Build and validate the registry used by the service
pub fn todo_schema() -> Result<MetadataRegistry> {
    let mut registry = MetadataRegistry::new();
    registry.register(todo_entity())?;
    registry.register(user_entity())?;
    registry.validate()?;
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::FieldKind;

    #[test]
    fn test_schema_is_valid() {
        let registry = todo_schema().unwrap();
        assert_eq!(registry.entity_names(), vec![TODO, USER]);
    }

    #[test]
    fn test_assignee_relation_joins_on_email() {
        let registry = todo_schema().unwrap();
        let todo = registry.get_entity(TODO).unwrap();
        assert_eq!(
            todo.field("assignee"),
            Some(&FieldKind::Relation {
                target_entity: USER.to_string(),
                local_column: "assignee".to_string(),
                foreign_column: "email".to_string(),
            })
        );
    }

    #[test]
    fn test_created_at_maps_to_snake_case_column() {
        let registry = todo_schema().unwrap();
        let user = registry.get_entity(USER).unwrap();
        assert_eq!(
            user.field("createdAt"),
            Some(&FieldKind::Scalar {
                column: "created_at".to_string(),
                column_type: ColumnType::Timestamp,
            })
        );
    }
}
