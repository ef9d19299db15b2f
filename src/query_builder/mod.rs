//! # Query Builder System
//!
//! Parameterised PostgreSQL query building for compiled filter/sort plans.
//!
//! ## Key Components
//!
//! - [`assembler`] - Turns a [`QueryPlan`](crate::filter::QueryPlan) into a query
//! - [`builder`] - Core query builder with SQL generation and execution
//! - [`conditions`] - WHERE clause building with `$n` placeholders
//! - [`joins`] - JOIN clause management
//! - [`pagination`] - LIMIT/OFFSET pagination
//!
//! ## Aliasing
//!
//! The root entity is always aliased `e0`; joined relations use the aliases
//! allocated by the join planner (`e1`, `e2`, ...). Each join renders as
//! `LEFT JOIN <table> <alias> ON <alias>.<foreign> = <parent>.<local>`, and a
//! query with joins is grouped on the root primary key so root rows stay unique.
//!
//! ## Example Usage
//!
//! ```rust
//! use serde_json::json;
//! use todo_core::filter::QueryPlanner;
//! use todo_core::metadata::todo_schema;
//! use todo_core::query_builder::QueryAssembler;
//!
//! let registry = todo_schema().unwrap();
//! let plan = QueryPlanner::new(&registry)
//!     .plan_wire("Todo", Some(&json!({ "name": { "_eq": "Buy milk" } })), None)
//!     .unwrap();
//! let built = QueryAssembler::new(&registry).assemble(&plan).unwrap().build();
//!
//! assert_eq!(built.sql, "SELECT e0.* FROM todos e0 WHERE e0.name = $1");
//! assert_eq!(built.params, vec![json!("Buy milk")]);
//! ```

pub mod assembler;
pub mod builder;
pub mod conditions;
pub mod joins;
pub mod pagination;

pub use assembler::QueryAssembler;
pub use builder::{BuiltQuery, QueryBuilder};
pub use conditions::{Condition, LogicalOperator, WhereClause};
pub use joins::{Join, JoinType};
pub use pagination::{Page, Pagination};
