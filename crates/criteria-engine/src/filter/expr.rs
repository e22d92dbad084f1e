use super::condition::Condition;
use std::fmt;

/// A boolean SQL expression (T-SQL flavoured).
#[derive(Debug, Clone, PartialEq)]
pub enum SqlFilterExpr {
    Leaf(Condition),

    /// `PATINDEX(pattern, column) > 0`
    PatIndex { column: String, pattern: String },

    /// `EXISTS (SELECT 1 FROM table [WHERE filter])`
    Exists {
        table: String,
        filter: Option<Box<SqlFilterExpr>>,
    },

    /// Matches no row; rendered as `1 = 0`.
    False,

    Not(Box<SqlFilterExpr>),
    And(Vec<SqlFilterExpr>),
    Or(Vec<SqlFilterExpr>),
}

impl SqlFilterExpr {
    pub fn leaf(cond: Condition) -> Self {
        SqlFilterExpr::Leaf(cond)
    }

    /// Nested ANDs are flattened into one chain.
    pub fn and(exprs: Vec<SqlFilterExpr>) -> Self {
        Self::chain(exprs, true)
    }

    /// Nested ORs are flattened into one chain.
    pub fn or(exprs: Vec<SqlFilterExpr>) -> Self {
        Self::chain(exprs, false)
    }

    pub fn not(expr: SqlFilterExpr) -> Self {
        match expr {
            SqlFilterExpr::Not(inner) => *inner,
            other => SqlFilterExpr::Not(Box::new(other)),
        }
    }

    fn chain(exprs: Vec<SqlFilterExpr>, conjunctive: bool) -> Self {
        let mut flat = Vec::with_capacity(exprs.len());
        for expr in exprs {
            match (expr, conjunctive) {
                (SqlFilterExpr::And(items), true) | (SqlFilterExpr::Or(items), false) => {
                    flat.extend(items)
                }
                (other, _) => flat.push(other),
            }
        }

        if flat.len() == 1 {
            if let Some(single) = flat.pop() {
                return single;
            }
        }
        if conjunctive {
            SqlFilterExpr::And(flat)
        } else {
            SqlFilterExpr::Or(flat)
        }
    }

    pub fn to_sql(&self) -> String {
        match self {
            SqlFilterExpr::Leaf(cond) => cond.to_sql_fragment(),
            SqlFilterExpr::PatIndex { column, pattern } => {
                format!("PATINDEX({pattern}, {column}) > 0")
            }
            SqlFilterExpr::Exists { table, filter } => match filter {
                Some(filter) => format!("EXISTS (SELECT 1 FROM {table} WHERE {})", filter.to_sql()),
                None => format!("EXISTS (SELECT 1 FROM {table})"),
            },
            SqlFilterExpr::False => "1 = 0".to_string(),
            SqlFilterExpr::Not(inner) => format!("NOT ({})", inner.to_sql()),
            SqlFilterExpr::And(exprs) => {
                let exprs = exprs.iter().map(SqlFilterExpr::to_sql).collect::<Vec<_>>();
                format!("({})", exprs.join(" AND "))
            }
            SqlFilterExpr::Or(exprs) => {
                let exprs = exprs.iter().map(SqlFilterExpr::to_sql).collect::<Vec<_>>();
                format!("({})", exprs.join(" OR "))
            }
        }
    }

    /// Return a deduplicated list of the tables referenced by sub-queries.
    pub fn tables(&self) -> Vec<String> {
        let mut tables: Vec<String> = match self {
            SqlFilterExpr::Leaf(_) | SqlFilterExpr::PatIndex { .. } | SqlFilterExpr::False => {
                Vec::new()
            }
            SqlFilterExpr::Exists { table, filter } => {
                let mut tables = vec![table.clone()];
                if let Some(filter) = filter {
                    tables.extend(filter.tables());
                }
                tables
            }
            SqlFilterExpr::Not(inner) => inner.tables(),
            SqlFilterExpr::And(exprs) | SqlFilterExpr::Or(exprs) => {
                exprs.iter().flat_map(|e| e.tables()).collect()
            }
        };
        tables.sort_unstable();
        tables.dedup();
        tables
    }
}

impl fmt::Display for SqlFilterExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_sql())
    }
}
