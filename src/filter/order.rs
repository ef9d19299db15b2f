//! Sort specification compilation.

use super::compiler::{lookup, Scope};
use super::node::{OrderSpec, OrderValue};
use super::planner::JoinPlanner;
use super::predicate::OrderTerm;
use crate::constants::limits::MAX_FILTER_DEPTH;
use crate::error::{Result, TodoError};
use crate::metadata::{FieldKind, MetadataRegistry};

/// Turns an [`OrderSpec`] into alias-qualified order terms.
///
/// Relation entries reuse the same [`JoinPlanner`] as the filter, so sorting by
/// a relation that is also filtered on does not add a second join.
#[derive(Debug, Clone, Copy)]
pub struct OrderCompiler<'r> {
    registry: &'r MetadataRegistry,
    max_depth: usize,
}

impl<'r> OrderCompiler<'r> {
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

    pub fn compile(
        &self,
        entity: &str,
        spec: &OrderSpec,
        planner: &mut JoinPlanner,
    ) -> Result<Vec<OrderTerm>> {
        let scope = Scope::root(self.registry.get_entity(entity)?);
        let mut terms = Vec::with_capacity(spec.entries().len());
        self.compile_into(spec, scope, planner, &mut terms, 1)?;
        Ok(terms)
    }

    fn compile_into(
        &self,
        spec: &OrderSpec,
        scope: Scope<'_>,
        planner: &mut JoinPlanner,
        terms: &mut Vec<OrderTerm>,
        depth: usize,
    ) -> Result<()> {
        if depth > self.max_depth {
            return Err(TodoError::DepthExceeded {
                max_depth: self.max_depth,
            });
        }

        for (field, value) in spec.entries() {
            match (lookup(scope.entity, field)?, value) {
                (FieldKind::Scalar { column, .. }, OrderValue::Direction(direction)) => {
                    terms.push(OrderTerm {
                        column: scope.qualify(column),
                        direction: *direction,
                    });
                }
                (FieldKind::Relation { target_entity, .. }, OrderValue::Nested(nested)) => {
                    let alias = planner.resolve(scope.alias, field);
                    let nested_scope = Scope {
                        entity: self.registry.get_entity(target_entity)?,
                        alias: Some(alias.as_str()),
                    };
                    self.compile_into(nested, nested_scope, planner, terms, depth + 1)?;
                }
                (FieldKind::Scalar { .. }, OrderValue::Nested(_)) => {
                    return Err(TodoError::InvalidSort(format!(
                        "{}.{field} is a scalar and takes \"asc\" or \"desc\"",
                        scope.entity.name
                    )));
                }
                (FieldKind::Relation { .. }, OrderValue::Direction(_)) => {
                    return Err(TodoError::InvalidSort(format!(
                        "{}.{field} is a relation and takes a nested sort object",
                        scope.entity.name
                    )));
                }
            }
        }
        Ok(())
    }
}
