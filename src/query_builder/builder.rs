use super::{Join, Pagination, WhereClause};
use serde_json::Value;
use sqlx::postgres::PgArguments;
use sqlx::{Arguments, PgPool};

/// SQL text plus the parameters bound to its `$n` placeholders
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltQuery {
    pub sql: String,
    pub params: Vec<Value>,
}

/// Main query builder for the compiled filter/sort plans.
/// Every operand travels as a bound parameter.
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    base_table: String,
    select_fields: Vec<String>,
    joins: Vec<Join>,
    where_clauses: Vec<WhereClause>,
    group_by: Vec<String>,
    order_by: Vec<String>,
    pagination: Option<Pagination>,
}

impl QueryBuilder {
    /// Create a new query builder for the given table (optionally with alias)
    pub fn new(table: &str) -> Self {
        Self {
            base_table: table.to_string(),
            select_fields: vec!["*".to_string()],
            joins: Vec::new(),
            where_clauses: Vec::new(),
            group_by: Vec::new(),
            order_by: Vec::new(),
            pagination: None,
        }
    }

    /// Set specific fields to select
    pub fn select(mut self, fields: &[&str]) -> Self {
        self.select_fields = fields.iter().map(|f| f.to_string()).collect();
        self
    }

    /// Add a JOIN clause
    pub fn join(mut self, join: Join) -> Self {
        self.joins.push(join);
        self
    }

    /// Add a LEFT JOIN
    pub fn left_join(self, table: &str, on_condition: &str) -> Self {
        self.join(Join::left(table, on_condition))
    }

    /// Add a WHERE clause; clauses AND together
    pub fn where_clause(mut self, clause: WhereClause) -> Self {
        self.where_clauses.push(clause);
        self
    }

    /// Add a simple WHERE condition
    pub fn where_eq(self, field: &str, value: Value) -> Self {
        self.where_clause(WhereClause::simple(field, "=", value))
    }

    /// Add GROUP BY column
    pub fn group_by(mut self, field: &str) -> Self {
        self.group_by.push(field.to_string());
        self
    }

    /// Add ORDER BY clause
    pub fn order_by(mut self, field: &str, direction: &str) -> Self {
        self.order_by.push(format!("{field} {direction}"));
        self
    }

    /// Add pagination (LIMIT/OFFSET)
    pub fn paginate(mut self, pagination: Pagination) -> Self {
        self.pagination = Some(pagination);
        self
    }

    /// Add LIMIT clause
    pub fn limit(mut self, limit: u32) -> Self {
        self.pagination.get_or_insert_with(Pagination::default).limit = Some(limit);
        self
    }

    /// Add OFFSET clause
    pub fn offset(mut self, offset: u64) -> Self {
        self.pagination.get_or_insert_with(Pagination::default).offset = Some(offset);
        self
    }

    pub fn joins(&self) -> &[Join] {
        &self.joins
    }

    /// Build SQL text and its parameters
    pub fn build(&self) -> BuiltQuery {
        let mut params = Vec::new();
        let mut sql = String::from("SELECT ");

        sql.push_str(&self.select_fields.join(", "));

        sql.push_str(&format!(" FROM {}", self.base_table));

        for join in &self.joins {
            sql.push(' ');
            sql.push_str(&join.to_sql());
        }

        let where_parts: Vec<String> = self
            .where_clauses
            .iter()
            .filter_map(|clause| clause.to_sql(&mut params))
            .collect();
        if !where_parts.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&where_parts.join(" AND "));
        }

        if !self.group_by.is_empty() {
            sql.push_str(&format!(" GROUP BY {}", self.group_by.join(", ")));
        }

        if !self.order_by.is_empty() {
            sql.push_str(&format!(" ORDER BY {}", self.order_by.join(", ")));
        }

        if let Some(ref pagination) = self.pagination {
            sql.push_str(&pagination.to_sql());
        }

        BuiltQuery { sql, params }
    }

    /// Build the complete SQL query string
    pub fn build_sql(&self) -> String {
        self.build().sql
    }

    /// Execute the query and return all rows
    pub async fn fetch_all<T>(&self, pool: &PgPool) -> Result<Vec<T>, sqlx::Error>
    where
        T: for<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> + Send + Unpin,
    {
        let BuiltQuery { sql, params } = self.build();
        tracing::debug!(sql = %sql, params = params.len(), "executing query");
        sqlx::query_as_with::<_, T, _>(&sql, bind_arguments(&params)?)
            .fetch_all(pool)
            .await
    }

    /// Execute the query and return optional row
    pub async fn fetch_optional<T>(&self, pool: &PgPool) -> Result<Option<T>, sqlx::Error>
    where
        T: for<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> + Send + Unpin,
    {
        let BuiltQuery { sql, params } = self.build();
        sqlx::query_as_with::<_, T, _>(&sql, bind_arguments(&params)?)
            .fetch_optional(pool)
            .await
    }

    /// Execute count query, ignoring ordering and pagination
    pub async fn count(&self, pool: &PgPool) -> Result<i64, sqlx::Error> {
        let mut inner = self.clone();
        inner.order_by.clear();
        inner.pagination = None;

        let BuiltQuery { sql, params } = inner.build();
        let sql = format!("SELECT COUNT(*) FROM ({sql}) counted");
        sqlx::query_scalar_with::<_, i64, _>(&sql, bind_arguments(&params)?)
            .fetch_one(pool)
            .await
    }
}

/// Bind JSON operands with the closest PostgreSQL type
pub fn bind_arguments(params: &[Value]) -> Result<PgArguments, sqlx::Error> {
    let mut arguments = PgArguments::default();
    for value in params {
        let added = match value {
            Value::Null => arguments.add(None::<String>),
            Value::Bool(b) => arguments.add(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => arguments.add(i),
                None => arguments.add(n.as_f64()),
            },
            Value::String(s) => arguments.add(s.clone()),
            other => arguments.add(sqlx::types::Json(other.clone())),
        };
        added.map_err(sqlx::Error::Encode)?;
    }
    Ok(arguments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query_builder::Condition;
    use serde_json::json;

    #[test]
    fn test_basic_query_building() {
        let query = QueryBuilder::new("todos e0")
            .select(&["e0.id", "e0.name"])
            .where_eq("e0.name", json!("Buy milk"))
            .order_by("e0.created_at", "DESC")
            .limit(10);

        let built = query.build();
        assert_eq!(
            built.sql,
            "SELECT e0.id, e0.name FROM todos e0 WHERE e0.name = $1 ORDER BY e0.created_at DESC LIMIT 10"
        );
        assert_eq!(built.params, vec![json!("Buy milk")]);
    }

    #[test]
    fn test_group_by_precedes_order_by() {
        let sql = QueryBuilder::new("users e0")
            .select(&["e0.*"])
            .left_join("todos e1", "e1.assignee = e0.email")
            .group_by("e0.id")
            .order_by("MIN(e1.name)", "ASC")
            .limit(5)
            .offset(10)
            .build_sql();
        assert_eq!(
            sql,
            "SELECT e0.* FROM users e0 LEFT JOIN todos e1 ON e1.assignee = e0.email \
             GROUP BY e0.id ORDER BY MIN(e1.name) ASC LIMIT 5 OFFSET 10"
        );
    }

    #[test]
    fn test_where_clauses_share_placeholder_numbering() {
        let built = QueryBuilder::new("todos e0")
            .where_eq("e0.name", json!("a"))
            .where_clause(WhereClause::or(vec![
                Condition::IsNull {
                    field: "e0.assignee".to_string(),
                },
                Condition::Simple {
                    field: "e0.assignee".to_string(),
                    operator: "=".to_string(),
                    value: json!("b"),
                    cast: None,
                },
            ]))
            .build();
        assert!(built
            .sql
            .ends_with("WHERE e0.name = $1 AND (e0.assignee IS NULL OR e0.assignee = $2)"));
        assert_eq!(built.params.len(), 2);
    }

    #[test]
    fn test_empty_where_is_omitted() {
        let sql = QueryBuilder::new("todos e0")
            .where_clause(WhereClause::and(vec![]))
            .offset(5)
            .build_sql();
        assert_eq!(sql, "SELECT * FROM todos e0 OFFSET 5");
    }

    #[test]
    fn test_bind_arguments_accepts_every_json_kind() {
        let params = vec![
            json!(null),
            json!(true),
            json!(3),
            json!(2.5),
            json!("text"),
            json!({ "k": [1, 2] }),
        ];
        assert!(bind_arguments(&params).is_ok());
    }
}
