//! # Database Operations
//!
//! PostgreSQL access through SQLx.
//!
//! ## Key Components
//!
//! - [`connection`] - Pool construction from [`DatabaseConfig`](crate::config::DatabaseConfig)
//! - [`error_codes`] - SQLSTATE constants used to classify storage errors
//! - [`migrator`] - Embedded migrations
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use todo_core::config::AppConfig;
//! use todo_core::database::DatabaseConnection;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::default();
//! let db = DatabaseConnection::new(&config.database).await?;
//! db.migrate().await?;
//! assert!(db.health_check().await?);
//! # Ok(())
//! # }
//! ```

pub mod connection;
pub mod error_codes;
pub mod migrator;

pub use connection::DatabaseConnection;
pub use error_codes::PgErrorCode;
pub use migrator::MIGRATOR;
