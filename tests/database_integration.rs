//! PostgreSQL-backed tests. Run with `--features test-database` and `DATABASE_URL` set.
#![cfg(feature = "test-database")]

use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;
use todo_core::assignment::{
    AssignmentOutcome, AssignmentStore, AssignmentTransaction, IsolationLevel, PgAssignmentStore,
};
use todo_core::models::{NewTodo, NewUser, Todo, User};
use todo_core::services::{ListQuery, TodoService, UserService};
use todo_core::{todo_schema, AppConfig, TodoError};

fn services(pool: &PgPool) -> (TodoService, UserService) {
    let registry = Arc::new(todo_schema().expect("schema"));
    let config = Arc::new(AppConfig::default());
    (
        TodoService::new(pool.clone(), Arc::clone(&registry), Arc::clone(&config)),
        UserService::new(pool.clone(), registry, config),
    )
}

#[sqlx::test(migrator = "todo_core::database::migrator::MIGRATOR")]
async fn test_filter_through_assignee_relation(pool: PgPool) -> Result<(), Box<dyn std::error::Error>> {
    let (todos, users) = services(&pool);
    users.create("carlos.rgn@gmail.com", "Carlos").await?;
    users.create("ana@example.com", "Ana").await?;

    let milk = todos.create("Buy milk for Carlos", Some("two liters")).await?;
    let bread = todos.create("Buy bread for Carlos", None).await?;
    todos.create("Walk the dog", None).await?;
    todos.assign_to(milk.id, "carlos.rgn@gmail.com").await?;
    todos.assign_to(bread.id, "ana@example.com").await?;

    let found = todos
        .find_all(&ListQuery::default().with_filter(json!({
            "name": { "_contains": "Carlos" },
            "assignee": { "email": { "_eq": "carlos.rgn@gmail.com" } }
        })))
        .await?;

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, milk.id);
    assert_eq!(found[0].assignee.as_deref(), Some("carlos.rgn@gmail.com"));
    Ok(())
}

#[sqlx::test(migrator = "todo_core::database::migrator::MIGRATOR")]
async fn test_order_and_pagination(pool: PgPool) -> Result<(), Box<dyn std::error::Error>> {
    let (todos, _) = services(&pool);
    for name in ["c", "a", "b"] {
        todos.create(name, None).await?;
    }

    let page = todos
        .find_all(
            &ListQuery::default()
                .with_order(json!({ "name": "asc" }))
                .with_page(1, 2),
        )
        .await?;

    let names: Vec<_> = page.iter().map(|todo| todo.name.as_str()).collect();
    assert_eq!(names, vec!["a", "b"]);
    Ok(())
}

#[sqlx::test(migrator = "todo_core::database::migrator::MIGRATOR")]
async fn test_user_listing_through_todos_relation(pool: PgPool) -> Result<(), Box<dyn std::error::Error>> {
    let (todos, users) = services(&pool);
    users.create("a@b.com", "A").await?;
    users.create("c@d.com", "C").await?;
    let todo = todos.create("Write report", None).await?;
    todos.assign_to(todo.id, "c@d.com").await?;

    let found = users
        .find_all(&ListQuery::default().with_filter(json!({
            "todos": { "name": { "_ilike": "write%" } }
        })))
        .await?;

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].email, "c@d.com");
    Ok(())
}

#[sqlx::test(migrator = "todo_core::database::migrator::MIGRATOR")]
async fn test_ordering_users_by_todos_lists_each_user_once(
    pool: PgPool,
) -> Result<(), Box<dyn std::error::Error>> {
    let (todos, users) = services(&pool);
    users.create("a@b.com", "A").await?;
    users.create("c@d.com", "C").await?;
    for (name, owner) in [("zeta", "a@b.com"), ("alpha", "a@b.com"), ("beta", "c@d.com")] {
        let todo = todos.create(name, None).await?;
        todos.assign_to(todo.id, owner).await?;
    }

    let found = users
        .find_all(
            &ListQuery::default()
                .with_filter(json!({ "todos": { "name": { "_contains": "a" } } }))
                .with_order(json!({ "todos": { "name": "asc" } })),
        )
        .await?;

    let emails: Vec<_> = found.iter().map(|user| user.email.as_str()).collect();
    assert_eq!(emails, vec!["a@b.com", "c@d.com"]);
    Ok(())
}

#[sqlx::test(migrator = "todo_core::database::migrator::MIGRATOR")]
async fn test_assignment_rules(pool: PgPool) -> Result<(), Box<dyn std::error::Error>> {
    let (todos, users) = services(&pool);
    users.create("a@b.com", "A").await?;
    users.create("c@d.com", "C").await?;
    let todo = todos.create("Pay rent", None).await?;

    assert_eq!(todos.assign_to(todo.id, "a@b.com").await?, AssignmentOutcome::Assigned);
    assert_eq!(todos.assign_to(todo.id, "a@b.com").await?, AssignmentOutcome::Unchanged);
    assert!(matches!(
        todos.assign_to(todo.id, "c@d.com").await,
        Err(TodoError::BusinessRule(_))
    ));

    let missing = uuid::Uuid::new_v4();
    assert!(matches!(
        todos.assign_to(missing, "a@b.com").await,
        Err(TodoError::NotFound { .. })
    ));
    assert_eq!(
        todos.find_by_id(todo.id).await?.assignee.as_deref(),
        Some("a@b.com")
    );
    Ok(())
}

#[sqlx::test(migrator = "todo_core::database::migrator::MIGRATOR")]
async fn test_unknown_owner_is_a_validation_error(pool: PgPool) -> Result<(), Box<dyn std::error::Error>> {
    let (todos, _) = services(&pool);
    let todo = todos.create("Orphan", None).await?;

    let err = todos.assign_to(todo.id, "nobody@example.com").await.unwrap_err();
    assert!(matches!(err, TodoError::Validation(_)));
    assert_eq!(todos.find_by_id(todo.id).await?.assignee, None);
    Ok(())
}

#[sqlx::test(migrator = "todo_core::database::migrator::MIGRATOR")]
async fn test_concurrent_assignment_has_exactly_one_winner(
    pool: PgPool,
) -> Result<(), Box<dyn std::error::Error>> {
    let (todos, users) = services(&pool);
    for i in 0..10 {
        users.create(&format!("user{i}@example.com"), "User").await?;
    }
    let todo = todos.create("Contested", None).await?;

    let handles: Vec<_> = (0..10)
        .map(|i| {
            let todos = todos.clone();
            tokio::spawn(async move {
                todos
                    .assign_to(todo.id, &format!("user{i}@example.com"))
                    .await
            })
        })
        .collect();

    let mut winners = 0;
    for handle in handles {
        match handle.await? {
            Ok(AssignmentOutcome::Assigned) => winners += 1,
            Err(TodoError::BusinessRule(_)) | Err(TodoError::Conflict) => {}
            other => panic!("unexpected result: {other:?}"),
        }
    }
    assert_eq!(winners, 1);
    Ok(())
}

#[sqlx::test(migrator = "todo_core::database::migrator::MIGRATOR")]
async fn test_serialization_failure_becomes_conflict(
    pool: PgPool,
) -> Result<(), Box<dyn std::error::Error>> {
    let todo = Todo::create(
        &pool,
        NewTodo {
            name: "Race".to_string(),
            description: None,
        },
    )
    .await?;
    User::create(
        &pool,
        NewUser {
            email: "a@b.com".to_string(),
            name: "A".to_string(),
        },
    )
    .await?;
    User::create(
        &pool,
        NewUser {
            email: "c@d.com".to_string(),
            name: "C".to_string(),
        },
    )
    .await?;

    let store = PgAssignmentStore::new(pool.clone());
    let mut first = store.begin(IsolationLevel::Serializable).await?;
    let mut second = store.begin(IsolationLevel::Serializable).await?;
    first.load_assignment(todo.id).await?;
    second.load_assignment(todo.id).await?;
    first.store_owner(todo.id, "a@b.com").await?;
    first.commit().await?;

    let err = second.store_owner(todo.id, "c@d.com").await.unwrap_err();
    assert!(err.is_conflict());
    second.rollback().await?;
    Ok(())
}

#[sqlx::test(migrator = "todo_core::database::migrator::MIGRATOR")]
async fn test_duplicate_user_email_is_rejected(pool: PgPool) -> Result<(), Box<dyn std::error::Error>> {
    let (_, users) = services(&pool);
    users.create("a@b.com", "A").await?;

    let err = users.create("a@b.com", "Other").await.unwrap_err();
    assert!(matches!(err, TodoError::Validation(_)));
    assert_eq!(users.find_by_email("a@b.com").await?.name, "A");
    Ok(())
}

#[sqlx::test(migrator = "todo_core::database::migrator::MIGRATOR")]
async fn test_connection_health_check(pool: PgPool) -> Result<(), Box<dyn std::error::Error>> {
    let db = todo_core::database::DatabaseConnection::from_pool(pool);
    assert!(db.health_check().await?);

    let todos = Todo::list_all(db.pool()).await?;
    assert!(todos.is_empty());
    Ok(())
}
