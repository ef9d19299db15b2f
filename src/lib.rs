#![allow(clippy::doc_markdown)] // Allow technical terms like PostgreSQL, SQLx in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Todo Core Rust
//!
//! Query compilation and assignment control for the todo service.
//!
//! ## Overview
//!
//! Two independent pieces sit on top of a PostgreSQL-backed todo store:
//!
//! - A **filter/sort compiler** that turns client-supplied, nested JSON filter
//!   and sort documents into a typed predicate tree, an order list and a
//!   deduplicated set of LEFT JOINs, validated against a static metadata
//!   registry, and then into parameterized SQL.
//! - A **concurrency guard** that assigns a todo to a user under serializable
//!   isolation so that among concurrent attempts on one unassigned todo
//!   exactly one succeeds.
//!
//! ## Module Organization
//!
//! - [`metadata`] - Entity/field registry and the declared todo schema
//! - [`filter`] - Wire parsing, join planning, filter and order compilation
//! - [`query_builder`] - SQL assembly with bound parameters
//! - [`assignment`] - Transaction surface and the concurrency guard
//! - [`models`] - SQLx row types
//! - [`services`] - Request-level todo and user operations
//! - [`database`] - Pool setup, migrations, SQLSTATE classification
//! - [`config`] - Layered configuration
//! - [`logging`] - Structured logging setup and domain log helpers
//! - [`error`] - Structured error handling
//!
//! ## Quick Start
//!
//! ```rust
//! use todo_core::filter::QueryPlanner;
//! use todo_core::metadata::todo_schema;
//! use todo_core::query_builder::QueryAssembler;
//! use serde_json::json;
//!
//! # fn main() -> todo_core::Result<()> {
//! let registry = todo_schema()?;
//! let plan = QueryPlanner::new(&registry).plan_wire(
//!     "Todo",
//!     Some(&json!({ "assignee": { "email": { "_eq": "a@b.com" } } })),
//!     Some(&json!({ "createdAt": "desc" })),
//! )?;
//!
//! let query = QueryAssembler::new(&registry).assemble(&plan)?.build();
//! assert!(query.sql.contains("LEFT JOIN users e1"));
//! # Ok(())
//! # }
//! ```
//!
//! ## Testing
//!
//! ```bash
//! cargo test --lib                       # Unit tests
//! cargo test                             # Unit and integration tests
//! cargo test --features test-database    # Adds PostgreSQL-backed tests
//! ```

pub mod assignment;
pub mod config;
pub mod constants;
pub mod database;
pub mod error;
pub mod filter;
pub mod logging;
pub mod metadata;
pub mod models;
pub mod query_builder;
pub mod services;
pub mod validation;

pub use assignment::{AssignmentOutcome, ConcurrencyGuard};
pub use config::{AppConfig, ConfigManager};
pub use error::{Result, TodoError};
pub use filter::{PredicateTree, QueryPlan, QueryPlanner};
pub use metadata::{todo_schema, MetadataRegistry};
pub use query_builder::QueryAssembler;
pub use services::{ListQuery, TodoService, UserService};
