//! Turns a compiled [`QueryPlan`] into a parameterised PostgreSQL query.

use super::conditions::{Condition, WhereClause};
use super::{Join, JoinType, Page, QueryBuilder};
use crate::constants::aliases::ROOT;
use crate::constants::limits::MAX_PAGE_SIZE;
use crate::error::{Result, TodoError};
use crate::filter::{
    ComparisonOperator, ConjunctionKind, OrderTerm, PredicateTree, QualifiedColumn, QueryPlan,
    SortDirection,
};
use crate::metadata::{ColumnType, EntityMetadata, FieldKind, MetadataRegistry};
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy)]
pub struct QueryAssembler<'r> {
    registry: &'r MetadataRegistry,
    max_page_size: u32,
}

impl<'r> QueryAssembler<'r> {
    pub fn new(registry: &'r MetadataRegistry) -> Self {
        Self {
            registry,
            max_page_size: MAX_PAGE_SIZE,
        }
    }

    pub fn with_max_page_size(mut self, max_page_size: u32) -> Self {
        self.max_page_size = max_page_size;
        self
    }

    /// Assemble `plan` selecting every root column.
    ///
    /// With joins present the rows are grouped on the root primary key, so
    /// each root row appears once however many related rows match. Order
    /// terms on joined aliases then sort by `MIN` (ascending) or `MAX`
    /// (descending) of the related column.
    pub fn assemble(&self, plan: &QueryPlan) -> Result<QueryBuilder> {
        let root = self.registry.get_entity(&plan.entity)?;
        let root_select = format!("{ROOT}.*");
        let mut builder =
            QueryBuilder::new(&format!("{} {ROOT}", root.table)).select(&[root_select.as_str()]);

        let mut scopes: HashMap<&str, &EntityMetadata> = HashMap::new();
        scopes.insert(ROOT, root);

        for join in &plan.joins {
            let parent_alias = join.parent_alias.as_deref().unwrap_or(ROOT);
            let parent = scopes.get(parent_alias).copied().ok_or_else(|| {
                TodoError::InvalidFilter(format!(
                    "join '{}' references unknown scope '{parent_alias}'",
                    join.alias
                ))
            })?;
            let Some(FieldKind::Relation {
                target_entity,
                local_column,
                foreign_column,
            }) = parent.field(&join.relation_path)
            else {
                return Err(TodoError::unknown_field(&parent.name, &join.relation_path));
            };
            let target = self.registry.get_entity(target_entity)?;

            builder = builder.join(Join::new(
                JoinType::from(join.kind),
                &format!("{} {}", target.table, join.alias),
                &format!(
                    "{alias}.{foreign_column} = {parent_alias}.{local_column}",
                    alias = join.alias
                ),
            ));
            scopes.insert(join.alias.as_str(), target);
        }

        if let Some(predicate) = &plan.predicate {
            if let Some(condition) = to_condition(predicate)? {
                builder = builder.where_clause(WhereClause::and(vec![condition]));
            }
        }

        let grouped = !plan.joins.is_empty();
        if grouped {
            builder = builder.group_by(&format!("{ROOT}.{}", root.primary_key));
        }

        for term in &plan.order {
            builder = builder.order_by(&order_expression(term, grouped), term.direction.as_sql());
        }

        tracing::debug!(
            entity = %plan.entity,
            joins = plan.joins.len(),
            order_terms = plan.order.len(),
            "assembled query plan"
        );
        Ok(builder)
    }

    /// Assemble `plan` for one page, its size capped at the configured maximum
    pub fn assemble_page(&self, plan: &QueryPlan, page: Option<Page>) -> Result<QueryBuilder> {
        let builder = self.assemble(plan)?;
        Ok(match page {
            Some(page) => builder.paginate(page.capped(self.max_page_size).window()),
            None => builder,
        })
    }
}

fn render_column(column: &QualifiedColumn) -> String {
    format!(
        "{}.{}",
        column.alias.as_deref().unwrap_or(ROOT),
        column.column
    )
}

fn order_expression(term: &OrderTerm, grouped: bool) -> String {
    let column = render_column(&term.column);
    match (grouped, term.column.alias.is_some(), term.direction) {
        (true, true, SortDirection::Asc) => format!("MIN({column})"),
        (true, true, SortDirection::Desc) => format!("MAX({column})"),
        _ => column,
    }
}

/// `None` means the tree imposes no constraint. An empty group is such a
/// tree; an AND skips those children while an OR holding one is itself
/// unconstrained.
fn to_condition(tree: &PredicateTree) -> Result<Option<Condition>> {
    match tree {
        PredicateTree::Conjunction { kind, children } => {
            let mut conditions = Vec::with_capacity(children.len());
            for child in children {
                match to_condition(child)? {
                    Some(condition) => conditions.push(condition),
                    None if *kind == ConjunctionKind::Or => return Ok(None),
                    None => {}
                }
            }
            if conditions.is_empty() {
                return Ok(None);
            }
            let clause = match kind {
                ConjunctionKind::And => WhereClause::and(conditions),
                ConjunctionKind::Or => WhereClause::or(conditions),
            };
            Ok(Some(Condition::Group(clause)))
        }
        PredicateTree::Comparison {
            column,
            column_type,
            operator,
            operand,
        } => comparison(column, *column_type, *operator, operand).map(Some),
    }
}

fn comparison(
    column: &QualifiedColumn,
    column_type: ColumnType,
    operator: ComparisonOperator,
    operand: &Value,
) -> Result<Condition> {
    let field = render_column(column);
    let cast = column_type.parameter_cast();

    if operator.is_set() {
        let Value::Array(values) = operand else {
            return Err(TodoError::InvalidFilter(format!(
                "{} on {column} expects an array, got {operand}",
                operator
            )));
        };
        return Ok(match operator {
            ComparisonOperator::NotIn => Condition::NotIn {
                field,
                values: values.clone(),
                cast,
            },
            _ => Condition::In {
                field,
                values: values.clone(),
                cast,
            },
        });
    }

    if operand.is_null() {
        match operator {
            ComparisonOperator::Eq => return Ok(Condition::IsNull { field }),
            ComparisonOperator::Ne => return Ok(Condition::IsNotNull { field }),
            _ => {
                return Err(TodoError::InvalidFilter(format!(
                    "{operator} on {column} does not accept null"
                )))
            }
        }
    }

    if operator.is_pattern() {
        let field = if column_type.is_text() {
            field
        } else {
            format!("{field}::text")
        };
        let pattern = match operand {
            Value::String(s) => Value::String(s.clone()),
            other => Value::String(other.to_string()),
        };
        return Ok(Condition::Simple {
            field,
            operator: operator.sql().to_string(),
            value: pattern,
            cast: None,
        });
    }

    Ok(Condition::Simple {
        field,
        operator: operator.sql().to_string(),
        value: operand.clone(),
        cast,
    })
}
