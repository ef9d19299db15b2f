use serde_json::Value;

/// Represents different types of SQL conditions.
///
/// Operands are never inlined: rendering pushes them onto the parameter list
/// and emits `$n` placeholders.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Simple {
        field: String,
        operator: String,
        value: Value,
        cast: Option<&'static str>,
    },
    In {
        field: String,
        values: Vec<Value>,
        cast: Option<&'static str>,
    },
    NotIn {
        field: String,
        values: Vec<Value>,
        cast: Option<&'static str>,
    },
    IsNull {
        field: String,
    },
    IsNotNull {
        field: String,
    },
    Group(WhereClause),
}

impl Condition {
    /// Render the condition, or `None` when it imposes no constraint
    pub fn to_sql(&self, params: &mut Vec<Value>) -> Option<String> {
        match self {
            Condition::Simple {
                field,
                operator,
                value,
                cast,
            } => {
                let placeholder = push_param(params, value.clone(), *cast);
                Some(format!("{field} {operator} {placeholder}"))
            }
            Condition::In {
                field,
                values,
                cast,
            } => {
                if values.is_empty() {
                    return Some("FALSE".to_string());
                }
                let list = placeholder_list(params, values, *cast);
                Some(format!("{field} IN ({list})"))
            }
            Condition::NotIn {
                field,
                values,
                cast,
            } => {
                if values.is_empty() {
                    return Some("TRUE".to_string());
                }
                let list = placeholder_list(params, values, *cast);
                Some(format!("{field} NOT IN ({list})"))
            }
            Condition::IsNull { field } => Some(format!("{field} IS NULL")),
            Condition::IsNotNull { field } => Some(format!("{field} IS NOT NULL")),
            Condition::Group(clause) => clause.to_sql(params),
        }
    }
}

fn push_param(params: &mut Vec<Value>, value: Value, cast: Option<&'static str>) -> String {
    params.push(value);
    match cast {
        Some(cast) => format!("${}::{cast}", params.len()),
        None => format!("${}", params.len()),
    }
}

fn placeholder_list(params: &mut Vec<Value>, values: &[Value], cast: Option<&'static str>) -> String {
    values
        .iter()
        .map(|value| push_param(params, value.clone(), cast))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Represents a WHERE clause that can contain multiple conditions
#[derive(Debug, Clone, PartialEq)]
pub struct WhereClause {
    pub conditions: Vec<Condition>,
    pub operator: LogicalOperator,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOperator {
    And,
    Or,
}

impl LogicalOperator {
    fn separator(&self) -> &'static str {
        match self {
            LogicalOperator::And => " AND ",
            LogicalOperator::Or => " OR ",
        }
    }
}

impl WhereClause {
    /// Create a simple WHERE clause with a single condition
    pub fn simple(field: &str, operator: &str, value: Value) -> Self {
        Self::and(vec![Condition::Simple {
            field: field.to_string(),
            operator: operator.to_string(),
            value,
            cast: None,
        }])
    }

    /// Create WHERE IN clause
    pub fn in_condition(field: &str, values: Vec<Value>) -> Self {
        Self::and(vec![Condition::In {
            field: field.to_string(),
            values,
            cast: None,
        }])
    }

    /// Combine multiple conditions with AND
    pub fn and(conditions: Vec<Condition>) -> Self {
        Self {
            conditions,
            operator: LogicalOperator::And,
        }
    }

    /// Combine multiple conditions with OR
    pub fn or(conditions: Vec<Condition>) -> Self {
        Self {
            conditions,
            operator: LogicalOperator::Or,
        }
    }

    /// Render to SQL, or `None` when the clause imposes no constraint.
    ///
    /// An empty clause is unconstrained. AND skips unconstrained conditions;
    /// OR is unconstrained as soon as one of its conditions is, and then
    /// binds no parameters.
    pub fn to_sql(&self, params: &mut Vec<Value>) -> Option<String> {
        let mark = params.len();
        let mut parts = Vec::with_capacity(self.conditions.len());
        for condition in &self.conditions {
            match condition.to_sql(params) {
                Some(part) => parts.push(part),
                None if self.operator == LogicalOperator::Or => {
                    params.truncate(mark);
                    return None;
                }
                None => {}
            }
        }

        match parts.len() {
            0 => None,
            1 => parts.into_iter().next(),
            _ => Some(format!("({})", parts.join(self.operator.separator()))),
        }
    }
}
