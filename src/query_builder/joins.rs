use crate::filter::JoinKind;

/// Represents different types of SQL JOINs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    Inner,
    Left,
}

impl JoinType {
    pub fn to_sql(&self) -> &'static str {
        match self {
            JoinType::Inner => "INNER JOIN",
            JoinType::Left => "LEFT JOIN",
        }
    }
}

impl From<JoinKind> for JoinType {
    fn from(kind: JoinKind) -> Self {
        match kind {
            JoinKind::LeftJoin => JoinType::Left,
            JoinKind::InnerJoin => JoinType::Inner,
        }
    }
}

/// Represents a SQL JOIN clause
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Join {
    pub join_type: JoinType,
    pub table: String,
    pub on_condition: String,
}

impl Join {
    pub fn new(join_type: JoinType, table: &str, on_condition: &str) -> Self {
        Self {
            join_type,
            table: table.to_string(),
            on_condition: on_condition.to_string(),
        }
    }

    /// Create an INNER JOIN
    pub fn inner(table: &str, on_condition: &str) -> Self {
        Self::new(JoinType::Inner, table, on_condition)
    }

    /// Create a LEFT JOIN
    pub fn left(table: &str, on_condition: &str) -> Self {
        Self::new(JoinType::Left, table, on_condition)
    }

    /// Convert to SQL string
    pub fn to_sql(&self) -> String {
        format!(
            "{} {} ON {}",
            self.join_type.to_sql(),
            self.table,
            self.on_condition
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_left_join() {
        let join = Join::left("users e1", "e1.email = e0.assignee");
        assert_eq!(join.to_sql(), "LEFT JOIN users e1 ON e1.email = e0.assignee");
    }

    #[test]
    fn test_join_type_from_planned_kind() {
        assert_eq!(JoinType::from(JoinKind::LeftJoin), JoinType::Left);
        assert_eq!(
            Join::new(JoinKind::InnerJoin.into(), "todos e2", "e2.assignee = e1.email").to_sql(),
            "INNER JOIN todos e2 ON e2.assignee = e1.email"
        );
    }
}
