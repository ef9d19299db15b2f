//! Query plan: the hand-off from the compilers to the query assembler.

use super::compiler::FilterCompiler;
use super::node::{FilterNode, OrderSpec};
use super::order::OrderCompiler;
use super::planner::{JoinConfig, JoinPlanner};
use super::predicate::{OrderTerm, PredicateTree};
use super::wire;
use crate::constants::limits::MAX_FILTER_DEPTH;
use crate::error::Result;
use crate::metadata::MetadataRegistry;
use serde::Serialize;
use serde_json::Value;

/// Compiled request for one root entity
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryPlan {
    pub entity: String,
    pub predicate: Option<PredicateTree>,
    pub order: Vec<OrderTerm>,
    pub joins: Vec<JoinConfig>,
}

impl QueryPlan {
    /// Plan with no filter, no sort and no joins
    pub fn unfiltered(entity: &str) -> Self {
        Self {
            entity: entity.to_string(),
            predicate: None,
            order: Vec::new(),
            joins: Vec::new(),
        }
    }

    pub fn has_predicate(&self) -> bool {
        self.predicate.as_ref().is_some_and(|p| !p.is_empty())
    }
}

/// Runs the filter and order compilers for one request over a single
/// [`JoinPlanner`]. The filter is compiled first, so its aliases come first.
#[derive(Debug, Clone, Copy)]
pub struct QueryPlanner<'r> {
    registry: &'r MetadataRegistry,
    max_depth: usize,
}

impl<'r> QueryPlanner<'r> {
    pub fn new(registry: &'r MetadataRegistry) -> Self {
        Self {
            registry,
            max_depth: MAX_FILTER_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn plan(
        &self,
        entity: &str,
        filter: Option<&FilterNode>,
        order: Option<&OrderSpec>,
    ) -> Result<QueryPlan> {
        let mut planner = JoinPlanner::new();

        let predicate = filter
            .map(|tree| {
                FilterCompiler::new(self.registry)
                    .with_max_depth(self.max_depth)
                    .compile(entity, tree, &mut planner)
            })
            .transpose()?;

        let order = match order {
            Some(spec) => OrderCompiler::new(self.registry)
                .with_max_depth(self.max_depth)
                .compile(entity, spec, &mut planner)?,
            None => Vec::new(),
        };

        // Surfaces an unknown root entity even when neither tree was given.
        self.registry.get_entity(entity)?;

        Ok(QueryPlan {
            entity: entity.to_string(),
            predicate,
            order,
            joins: planner.into_joins(),
        })
    }

    /// Parse raw request JSON and plan it
    pub fn plan_wire(
        &self,
        entity: &str,
        filter: Option<&Value>,
        order: Option<&Value>,
    ) -> Result<QueryPlan> {
        let filter = filter
            .map(|value| wire::parse_filter_with_depth(value, self.max_depth))
            .transpose()?;
        let order = order
            .map(|value| wire::parse_order_with_depth(value, self.max_depth))
            .transpose()?;
        self.plan(entity, filter.as_ref(), order.as_ref())
    }
}
