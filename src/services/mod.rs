//! # Service Layer
//!
//! Request-level operations over the models. Listing requests carry raw
//! filter/sort JSON which is validated, compiled into a [`QueryPlan`] and
//! assembled into SQL here; assignment goes through the
//! [`ConcurrencyGuard`](crate::assignment::ConcurrencyGuard).

pub mod todo_service;
pub mod user_service;

pub use todo_service::TodoService;
pub use user_service::UserService;

use crate::config::QueryConfig;
use crate::error::Result;
use crate::filter::{QueryPlan, QueryPlanner};
use crate::logging::log_query_plan;
use crate::metadata::MetadataRegistry;
use crate::query_builder::{Page, QueryAssembler, QueryBuilder};
use crate::validation::validate_query_input;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Raw listing request as received from a caller
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListQuery {
    pub filter: Option<Value>,
    pub order: Option<Value>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl ListQuery {
    pub fn with_filter(mut self, filter: Value) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_order(mut self, order: Value) -> Self {
        self.order = Some(order);
        self
    }

    pub fn with_page(mut self, page: u32, per_page: u32) -> Self {
        self.page = Some(page);
        self.per_page = Some(per_page);
        self
    }

    /// Requested page; a page without a size uses `default_page_size`
    pub fn page(&self, default_page_size: u32) -> Option<Page> {
        match (self.page, self.per_page) {
            (None, None) => None,
            (page, per_page) => Some(Page::new(
                page.unwrap_or(1),
                per_page.unwrap_or(default_page_size),
            )),
        }
    }
}

/// Validate, compile and assemble a listing request for `entity`
pub(crate) fn build_list_query(
    registry: &MetadataRegistry,
    config: &QueryConfig,
    entity: &str,
    request: &ListQuery,
) -> Result<(QueryPlan, QueryBuilder)> {
    if let Some(filter) = &request.filter {
        validate_query_input(filter)?;
    }
    if let Some(order) = &request.order {
        validate_query_input(order)?;
    }

    let plan = QueryPlanner::new(registry)
        .with_max_depth(config.max_filter_depth)
        .plan_wire(entity, request.filter.as_ref(), request.order.as_ref())?;

    let predicate = plan.predicate.as_ref().map(ToString::to_string);
    log_query_plan(
        &plan.entity,
        plan.joins.len(),
        plan.order.len(),
        predicate.as_deref(),
    );

    let builder = QueryAssembler::new(registry)
        .with_max_page_size(config.max_page_size)
        .assemble_page(&plan, request.page(config.default_page_size))?;

    Ok((plan, builder))
}
