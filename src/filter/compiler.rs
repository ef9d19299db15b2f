//! Filter tree compilation.
//!
//! Walks a [`FilterNode`] against the metadata registry, resolving each
//! comparison to an alias-qualified column and each relation to a join from
//! the shared [`JoinPlanner`].

use super::node::{ConjunctionKind, FilterNode};
use super::planner::JoinPlanner;
use super::predicate::{translate_condition, PredicateTree, QualifiedColumn};
use crate::constants::limits::MAX_FILTER_DEPTH;
use crate::error::{Result, TodoError};
use crate::metadata::{EntityMetadata, FieldKind, MetadataRegistry};

/// Entity and alias that unqualified field names currently refer to
#[derive(Debug, Clone, Copy)]
pub(crate) struct Scope<'a> {
    pub entity: &'a EntityMetadata,
    pub alias: Option<&'a str>,
}

impl<'a> Scope<'a> {
    pub fn root(entity: &'a EntityMetadata) -> Self {
        Self {
            entity,
            alias: None,
        }
    }

    pub fn qualify(&self, column: &str) -> QualifiedColumn {
        QualifiedColumn {
            alias: self.alias.map(str::to_string),
            column: column.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FilterCompiler<'r> {
    registry: &'r MetadataRegistry,
    max_depth: usize,
}

impl<'r> FilterCompiler<'r> {
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

    /// Compile `tree` for `entity`.
    ///
    /// The result is rooted at an `AND` conjunction unless `tree` itself is an
    /// explicit conjunction, whose kind is kept. Joins are recorded in `planner`.
    pub fn compile(
        &self,
        entity: &str,
        tree: &FilterNode,
        planner: &mut JoinPlanner,
    ) -> Result<PredicateTree> {
        let metadata = self.registry.get_entity(entity)?;
        let scope = Scope::root(metadata);

        let (kind, roots) = match tree {
            FilterNode::Conjunction { kind, children } => (*kind, children.as_slice()),
            single => (ConjunctionKind::And, std::slice::from_ref(single)),
        };

        let mut children = Vec::with_capacity(roots.len());
        for node in roots {
            self.compile_into(node, scope, planner, &mut children, 1)?;
        }
        Ok(PredicateTree::Conjunction { kind, children })
    }

    fn compile_into(
        &self,
        node: &FilterNode,
        scope: Scope<'_>,
        planner: &mut JoinPlanner,
        target: &mut Vec<PredicateTree>,
        depth: usize,
    ) -> Result<()> {
        if depth > self.max_depth {
            return Err(TodoError::DepthExceeded {
                max_depth: self.max_depth,
            });
        }

        match node {
            FilterNode::Conjunction { kind, children } => {
                let mut group = Vec::with_capacity(children.len());
                for child in children {
                    self.compile_into(child, scope, planner, &mut group, depth + 1)?;
                }
                target.push(PredicateTree::Conjunction {
                    kind: *kind,
                    children: group,
                });
            }
            FilterNode::FieldComparison {
                field,
                operator,
                operand,
            } => match lookup(scope.entity, field)? {
                FieldKind::Scalar {
                    column,
                    column_type,
                } => {
                    let (operator, operand) =
                        translate_condition(operator, operand).ok_or_else(|| {
                            TodoError::UnknownOperator {
                                entity: scope.entity.name.clone(),
                                field: field.clone(),
                                operator: operator.clone(),
                            }
                        })?;
                    target.push(PredicateTree::Comparison {
                        column: scope.qualify(column),
                        column_type: *column_type,
                        operator,
                        operand,
                    });
                }
                FieldKind::Relation { .. } => {
                    return Err(TodoError::InvalidFilter(format!(
                        "{}.{field} is a relation and needs a nested filter",
                        scope.entity.name
                    )));
                }
            },
            FilterNode::RelationFilter { field, nested } => match lookup(scope.entity, field)? {
                FieldKind::Relation { target_entity, .. } => {
                    let alias = planner.resolve(scope.alias, field);
                    let nested_scope = Scope {
                        entity: self.registry.get_entity(target_entity)?,
                        alias: Some(alias.as_str()),
                    };
                    // A relation scopes its conditions; it does not group them.
                    match nested.as_ref() {
                        FilterNode::Conjunction {
                            kind: ConjunctionKind::And,
                            children,
                        } => {
                            for child in children {
                                self.compile_into(child, nested_scope, planner, target, depth + 1)?;
                            }
                        }
                        other => {
                            self.compile_into(other, nested_scope, planner, target, depth + 1)?
                        }
                    }
                }
                FieldKind::Scalar { .. } => {
                    return Err(TodoError::InvalidFilter(format!(
                        "{}.{field} is a scalar and needs an operator object",
                        scope.entity.name
                    )));
                }
            },
        }
        Ok(())
    }
}

pub(crate) fn lookup<'a>(entity: &'a EntityMetadata, field: &str) -> Result<&'a FieldKind> {
    entity
        .field(field)
        .ok_or_else(|| TodoError::unknown_field(&entity.name, field))
}
