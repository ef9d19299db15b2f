//! # Filter and Sort Compilation
//!
//! Translates nested, user-supplied filter trees and sort specifications into
//! a [`QueryPlan`]: a predicate tree over alias-qualified columns, an ordered
//! list of sort terms and a deduplicated join list.
//!
//! ## Flow
//!
//! ```text
//! request JSON ──wire──▶ FilterNode / OrderSpec
//!                              │
//!            FilterCompiler ───┼─── OrderCompiler
//!                   └── JoinPlanner (one per request) ──┘
//!                              │
//!                          QueryPlan ──▶ query_builder::QueryAssembler
//! ```
//!
//! Compilation is synchronous and pure apart from the per-request
//! [`JoinPlanner`]. Errors fail the whole compile; no partial plan is returned.
//!
//! ## Example
//!
//! ```rust
//! use serde_json::json;
//! use todo_core::filter::QueryPlanner;
//! use todo_core::metadata::todo_schema;
//!
//! let registry = todo_schema().unwrap();
//! let plan = QueryPlanner::new(&registry)
//!     .plan_wire(
//!         "Todo",
//!         Some(&json!({
//!             "name": { "_contains": "Carlos" },
//!             "assignee": { "email": { "_eq": "a@b.com" } }
//!         })),
//!         None,
//!     )
//!     .unwrap();
//!
//! assert_eq!(plan.joins.len(), 1);
//! assert_eq!(
//!     plan.predicate.unwrap().to_string(),
//!     "AND[name LIKE %Carlos%, e1.email = a@b.com]"
//! );
//! ```

pub mod compiler;
pub mod node;
pub mod order;
pub mod plan;
pub mod planner;
pub mod predicate;
pub mod wire;

pub use compiler::FilterCompiler;
pub use node::{ConjunctionKind, FilterNode, OrderSpec, OrderValue, SortDirection};
pub use order::OrderCompiler;
pub use plan::{QueryPlan, QueryPlanner};
pub use planner::{JoinConfig, JoinKind, JoinPlanner};
pub use predicate::{ComparisonOperator, OrderTerm, PredicateTree, QualifiedColumn};
pub use wire::{parse_filter, parse_order};
