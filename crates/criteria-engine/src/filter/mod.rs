use expr::SqlFilterExpr;

pub mod compiler;
pub mod condition;
pub mod expr;
pub mod sql;

/// A lowered `WHERE` clause. No expression means every row matches.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SqlFilter {
    pub expr: Option<SqlFilterExpr>,
}

impl SqlFilter {
    pub fn new() -> Self {
        SqlFilter { expr: None }
    }

    pub fn with_expr(expr: SqlFilterExpr) -> Self {
        SqlFilter { expr: Some(expr) }
    }

    /// Render " WHERE ..." or an empty string if there is no expression.
    pub fn to_sql(&self) -> String {
        self.expr
            .as_ref()
            .map(|e| format!(" WHERE {}", e.to_sql()))
            .unwrap_or_default()
    }

    /// Tables referenced by `EXISTS` sub-queries, deduplicated.
    pub fn tables(&self) -> Vec<String> {
        self.expr.as_ref().map(|e| e.tables()).unwrap_or_default()
    }
}
