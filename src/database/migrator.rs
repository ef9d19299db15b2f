//! # Database Migration Support
//!
//! Migrations live in the root `migrations/` directory and are embedded at
//! compile time.
//!
//! ```rust,ignore
//! #[sqlx::test(migrator = "todo_core::database::migrator::MIGRATOR")]
//! async fn test_something(pool: PgPool) { /* ... */ }
//! ```

use sqlx::PgPool;
use tracing::info;

/// Migrator for the `users` and `todos` tables
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Result type for migration operations
pub type MigrationResult<T> = Result<T, sqlx::migrate::MigrateError>;

pub async fn run_migrations(pool: &PgPool) -> MigrationResult<()> {
    info!("Running migrations...");
    MIGRATOR.run(pool).await?;
    info!("Migrations complete");
    Ok(())
}
