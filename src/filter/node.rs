//! Typed filter and sort trees.
//!
//! These are the only inputs the compilers accept. Raw request JSON is turned
//! into them by [`super::wire`].

use crate::error::TodoError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Boolean operator of a conjunction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ConjunctionKind {
    And,
    Or,
}

impl ConjunctionKind {
    pub fn as_sql(&self) -> &'static str {
        match self {
            ConjunctionKind::And => "AND",
            ConjunctionKind::Or => "OR",
        }
    }
}

/// A node of a request's filter tree
#[derive(Debug, Clone, PartialEq)]
pub enum FilterNode {
    /// `field <operator> operand`, with the operator in wire form (`_eq`, `_contains`, ...)
    FieldComparison {
        field: String,
        operator: String,
        operand: Value,
    },
    /// Conditions on the entity reached through relation `field`
    RelationFilter {
        field: String,
        nested: Box<FilterNode>,
    },
    Conjunction {
        kind: ConjunctionKind,
        children: Vec<FilterNode>,
    },
}

impl FilterNode {
    pub fn compare(field: &str, operator: &str, operand: impl Into<Value>) -> Self {
        FilterNode::FieldComparison {
            field: field.to_string(),
            operator: operator.to_string(),
            operand: operand.into(),
        }
    }

    pub fn relation(field: &str, nested: FilterNode) -> Self {
        FilterNode::RelationFilter {
            field: field.to_string(),
            nested: Box::new(nested),
        }
    }

    pub fn and(children: Vec<FilterNode>) -> Self {
        FilterNode::Conjunction {
            kind: ConjunctionKind::And,
            children,
        }
    }

    pub fn or(children: Vec<FilterNode>) -> Self {
        FilterNode::Conjunction {
            kind: ConjunctionKind::Or,
            children,
        }
    }

    /// Nesting depth; a lone comparison has depth 1
    pub fn depth(&self) -> usize {
        match self {
            FilterNode::FieldComparison { .. } => 1,
            FilterNode::RelationFilter { nested, .. } => 1 + nested.depth(),
            FilterNode::Conjunction { children, .. } => {
                1 + children.iter().map(FilterNode::depth).max().unwrap_or(0)
            }
        }
    }
}

/// Sort direction of one order term
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

impl FromStr for SortDirection {
    type Err = TodoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            other => Err(TodoError::InvalidSort(format!(
                "'{other}' is not a sort direction (expected asc or desc)"
            ))),
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Asc => write!(f, "asc"),
            SortDirection::Desc => write!(f, "desc"),
        }
    }
}

/// Value of one sort entry: a direction for scalars, a nested spec for relations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderValue {
    Direction(SortDirection),
    Nested(OrderSpec),
}

/// Ordered mapping from field name to direction or nested spec
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderSpec {
    entries: Vec<(String, OrderValue)>,
}

impl OrderSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn by(mut self, field: &str, direction: SortDirection) -> Self {
        self.entries
            .push((field.to_string(), OrderValue::Direction(direction)));
        self
    }

    pub fn nested(mut self, field: &str, spec: OrderSpec) -> Self {
        self.entries.push((field.to_string(), OrderValue::Nested(spec)));
        self
    }

    pub fn push(&mut self, field: String, value: OrderValue) {
        self.entries.push((field, value));
    }

    pub fn entries(&self) -> &[(String, OrderValue)] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn depth(&self) -> usize {
        1 + self
            .entries
            .iter()
            .map(|(_, value)| match value {
                OrderValue::Direction(_) => 0,
                OrderValue::Nested(spec) => spec.depth(),
            })
            .max()
            .unwrap_or(0)
    }
}
