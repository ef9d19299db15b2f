//! Request-boundary parsing of filter and sort JSON into typed trees.
//!
//! Parsing is metadata-free: it only decides shape. A key whose value is an
//! object made entirely of `_`-prefixed operator keys is a comparison; any
//! other object value is a relation filter. Whether the field exists, and
//! whether it is really a scalar or a relation, is checked by the compilers.
//!
//! Key order is the order of the incoming JSON document (`serde_json` is built
//! with `preserve_order`).

use super::node::{ConjunctionKind, FilterNode, OrderSpec, OrderValue};
use crate::constants::filter_keys;
use crate::constants::limits::MAX_FILTER_DEPTH;
use crate::error::{Result, TodoError};
use serde_json::{Map, Value};

/// Parse a filter object into a root `AND` conjunction
pub fn parse_filter(value: &Value) -> Result<FilterNode> {
    parse_filter_with_depth(value, MAX_FILTER_DEPTH)
}

pub fn parse_filter_with_depth(value: &Value, max_depth: usize) -> Result<FilterNode> {
    let Value::Object(map) = value else {
        return Err(TodoError::InvalidFilter(
            "filter must be a JSON object".to_string(),
        ));
    };
    Ok(FilterNode::Conjunction {
        kind: ConjunctionKind::And,
        children: parse_filter_object(map, 1, max_depth)?,
    })
}

fn parse_filter_object(
    map: &Map<String, Value>,
    depth: usize,
    max_depth: usize,
) -> Result<Vec<FilterNode>> {
    // `depth` is the level of this object's entries; an empty group adds none.
    if depth > max_depth && !map.is_empty() {
        return Err(TodoError::DepthExceeded { max_depth });
    }

    let mut children = Vec::with_capacity(map.len());
    for (key, value) in map {
        if let Some(kind) = conjunction_kind(key) {
            let Value::Object(inner) = value else {
                return Err(TodoError::InvalidFilter(format!(
                    "'{key}' expects a filter object"
                )));
            };
            children.push(FilterNode::Conjunction {
                kind,
                children: parse_filter_object(inner, depth + 1, max_depth)?,
            });
            continue;
        }

        let Value::Object(inner) = value else {
            return Err(TodoError::InvalidFilter(format!(
                "condition for field '{key}' must be an object"
            )));
        };

        if inner.is_empty() {
            return Err(TodoError::InvalidFilter(format!(
                "empty condition for field '{key}'"
            )));
        }

        if is_operator_map(inner) {
            let mut comparisons: Vec<FilterNode> = inner
                .iter()
                .map(|(operator, operand)| FilterNode::FieldComparison {
                    field: key.clone(),
                    operator: operator.clone(),
                    operand: operand.clone(),
                })
                .collect();
            if comparisons.len() == 1 {
                children.push(comparisons.remove(0));
            } else {
                // Several operators on one field form their own AND level.
                if depth + 1 > max_depth {
                    return Err(TodoError::DepthExceeded { max_depth });
                }
                children.push(FilterNode::and(comparisons));
            }
        } else {
            children.push(FilterNode::RelationFilter {
                field: key.clone(),
                nested: Box::new(FilterNode::and(parse_filter_object(
                    inner,
                    depth + 1,
                    max_depth,
                )?)),
            });
        }
    }
    Ok(children)
}

fn conjunction_kind(key: &str) -> Option<ConjunctionKind> {
    match key {
        filter_keys::AND => Some(ConjunctionKind::And),
        filter_keys::OR => Some(ConjunctionKind::Or),
        _ => None,
    }
}

fn is_operator_map(map: &Map<String, Value>) -> bool {
    map.keys().all(|key| {
        key.starts_with(filter_keys::OPERATOR_PREFIX) && conjunction_kind(key).is_none()
    })
}

/// Parse a sort object into an [`OrderSpec`]
pub fn parse_order(value: &Value) -> Result<OrderSpec> {
    parse_order_with_depth(value, MAX_FILTER_DEPTH)
}

pub fn parse_order_with_depth(value: &Value, max_depth: usize) -> Result<OrderSpec> {
    let Value::Object(map) = value else {
        return Err(TodoError::InvalidSort(
            "sort must be a JSON object".to_string(),
        ));
    };
    parse_order_object(map, 1, max_depth)
}

fn parse_order_object(
    map: &Map<String, Value>,
    depth: usize,
    max_depth: usize,
) -> Result<OrderSpec> {
    if depth > max_depth {
        return Err(TodoError::DepthExceeded { max_depth });
    }

    let mut spec = OrderSpec::new();
    for (key, value) in map {
        let entry = match value {
            Value::String(direction) => OrderValue::Direction(direction.parse()?),
            Value::Object(inner) => {
                OrderValue::Nested(parse_order_object(inner, depth + 1, max_depth)?)
            }
            other => {
                return Err(TodoError::InvalidSort(format!(
                    "sort value for '{key}' must be \"asc\", \"desc\" or an object, got {other}"
                )))
            }
        };
        spec.push(key.clone(), entry);
    }
    Ok(spec)
}
