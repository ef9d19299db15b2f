//! Compiled predicate and order types handed to the query assembler.

use super::node::{ConjunctionKind, SortDirection};
use crate::metadata::ColumnType;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Engine-level comparison operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonOperator {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    Like,
    ILike,
    In,
    NotIn,
}

impl ComparisonOperator {
    /// Map a wire operator name (without its `_` prefix) to the engine operator
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "eq" => Some(Self::Eq),
            "neq" | "ne" => Some(Self::Ne),
            "gt" => Some(Self::Gt),
            "gte" => Some(Self::Gte),
            "lt" => Some(Self::Lt),
            "lte" => Some(Self::Lte),
            "like" => Some(Self::Like),
            "ilike" => Some(Self::ILike),
            "in" => Some(Self::In),
            "nin" => Some(Self::NotIn),
            _ => None,
        }
    }

    /// Engine marker (`$eq`, `$like`, ...)
    pub fn marker(&self) -> &'static str {
        match self {
            Self::Eq => "$eq",
            Self::Ne => "$ne",
            Self::Gt => "$gt",
            Self::Gte => "$gte",
            Self::Lt => "$lt",
            Self::Lte => "$lte",
            Self::Like => "$like",
            Self::ILike => "$ilike",
            Self::In => "$in",
            Self::NotIn => "$nin",
        }
    }

    pub fn sql(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "<>",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Lt => "<",
            Self::Lte => "<=",
            Self::Like => "LIKE",
            Self::ILike => "ILIKE",
            Self::In => "IN",
            Self::NotIn => "NOT IN",
        }
    }

    pub fn is_pattern(&self) -> bool {
        matches!(self, Self::Like | Self::ILike)
    }

    pub fn is_set(&self) -> bool {
        matches!(self, Self::In | Self::NotIn)
    }
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.marker())
    }
}

/// Translate one wire condition into an engine operator and operand.
///
/// `_contains` becomes a `LIKE` with the operand wrapped in `%` on both sides;
/// every other operator keeps its operand and swaps the `_` prefix for `$`.
/// Returns `None` for operators the engine does not know.
pub fn translate_condition(operator: &str, operand: &Value) -> Option<(ComparisonOperator, Value)> {
    let name = operator.strip_prefix('_')?;
    if name == "contains" {
        let needle = match operand {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        return Some((ComparisonOperator::Like, Value::String(format!("%{needle}%"))));
    }
    ComparisonOperator::from_name(name).map(|op| (op, operand.clone()))
}

/// Column reference qualified with the alias of its relation scope.
/// Columns of the root entity carry no alias.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QualifiedColumn {
    pub alias: Option<String>,
    pub column: String,
}

impl QualifiedColumn {
    pub fn root(column: &str) -> Self {
        Self {
            alias: None,
            column: column.to_string(),
        }
    }

    pub fn aliased(alias: &str, column: &str) -> Self {
        Self {
            alias: Some(alias.to_string()),
            column: column.to_string(),
        }
    }
}

impl fmt::Display for QualifiedColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.alias {
            Some(alias) => write!(f, "{alias}.{}", self.column),
            None => f.write_str(&self.column),
        }
    }
}

/// Compiled filter: the filter tree with columns resolved and operators mapped
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PredicateTree {
    Comparison {
        column: QualifiedColumn,
        column_type: ColumnType,
        operator: ComparisonOperator,
        operand: Value,
    },
    Conjunction {
        kind: ConjunctionKind,
        children: Vec<PredicateTree>,
    },
}

impl PredicateTree {
    /// Every comparison in traversal order
    pub fn comparisons(&self) -> Vec<&PredicateTree> {
        let mut out = Vec::new();
        self.collect_comparisons(&mut out);
        out
    }

    fn collect_comparisons<'a>(&'a self, out: &mut Vec<&'a PredicateTree>) {
        match self {
            PredicateTree::Comparison { .. } => out.push(self),
            PredicateTree::Conjunction { children, .. } => {
                for child in children {
                    child.collect_comparisons(out);
                }
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            PredicateTree::Comparison { .. } => false,
            PredicateTree::Conjunction { children, .. } => children.iter().all(Self::is_empty),
        }
    }
}

impl fmt::Display for PredicateTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PredicateTree::Comparison {
                column,
                operator,
                operand,
                ..
            } => match operand {
                Value::String(s) => write!(f, "{column} {} {s}", operator.sql()),
                other => write!(f, "{column} {} {other}", operator.sql()),
            },
            PredicateTree::Conjunction { kind, children } => {
                write!(f, "{}[", kind.as_sql())?;
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{child}")?;
                }
                f.write_str("]")
            }
        }
    }
}

/// One compiled sort term
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTerm {
    pub column: QualifiedColumn,
    pub direction: SortDirection,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_eq_passes_operand_through() {
        assert_eq!(
            translate_condition("_eq", &json!("value")),
            Some((ComparisonOperator::Eq, json!("value")))
        );
        assert_eq!(ComparisonOperator::Eq.marker(), "$eq");
    }

    #[test]
    fn test_contains_wraps_operand_in_wildcards() {
        assert_eq!(
            translate_condition("_contains", &json!("value")),
            Some((ComparisonOperator::Like, json!("%value%")))
        );
        assert_eq!(
            translate_condition("_contains", &json!(42)),
            Some((ComparisonOperator::Like, json!("%42%")))
        );
    }

    #[test]
    fn test_unknown_or_unprefixed_operators() {
        assert_eq!(translate_condition("_between", &json!(1)), None);
        assert_eq!(translate_condition("eq", &json!(1)), None);
    }

    #[test]
    fn test_display_renders_readable_predicate() {
        let tree = PredicateTree::Conjunction {
            kind: ConjunctionKind::And,
            children: vec![
                PredicateTree::Comparison {
                    column: QualifiedColumn::root("name"),
                    column_type: ColumnType::Text,
                    operator: ComparisonOperator::Like,
                    operand: json!("%Carlos%"),
                },
                PredicateTree::Comparison {
                    column: QualifiedColumn::aliased("e1", "email"),
                    column_type: ColumnType::Text,
                    operator: ComparisonOperator::Eq,
                    operand: json!("a@b.com"),
                },
            ],
        };
        assert_eq!(tree.to_string(), "AND[name LIKE %Carlos%, e1.email = a@b.com]");
        assert_eq!(tree.comparisons().len(), 2);
        assert!(!tree.is_empty());
    }
}
