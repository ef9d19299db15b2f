#![allow(dead_code)]

pub mod strategies;

use serde_json::Value;
use todo_core::filter::{JoinPlanner, PredicateTree, QueryPlan, QueryPlanner};
use todo_core::metadata::{todo_schema, MetadataRegistry};
use todo_core::Result;

pub fn registry() -> MetadataRegistry {
    todo_schema().expect("declared schema is valid")
}

/// Plan raw filter/sort JSON against the todo schema
pub fn plan(entity: &str, filter: Option<Value>, order: Option<Value>) -> Result<QueryPlan> {
    let registry = registry();
    QueryPlanner::new(&registry).plan_wire(entity, filter.as_ref(), order.as_ref())
}

/// Compile a raw filter and return the predicate with the planner that recorded its joins
pub fn compile_filter(entity: &str, filter: Value) -> Result<(PredicateTree, JoinPlanner)> {
    let registry = registry();
    let tree = todo_core::filter::parse_filter(&filter)?;
    let mut planner = JoinPlanner::new();
    let predicate =
        todo_core::filter::FilterCompiler::new(&registry).compile(entity, &tree, &mut planner)?;
    Ok((predicate, planner))
}
