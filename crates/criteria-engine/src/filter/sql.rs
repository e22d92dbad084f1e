use super::{SqlFilter, compiler::FilterCompiler, condition::Condition, expr::SqlFilterExpr};
use crate::{
    error::LowerError,
    lambda::{CollectionLink, CompareOp, Expr, FieldRef, Lambda, TextMethod},
};
use model::core::value::Value;
use tracing::debug;

/// Lowers a predicate into a T-SQL `WHERE` clause.
///
/// Negation is pushed down to the leaves so that rows with NULL columns
/// match exactly when the in-memory predicate accepts them. `Any` becomes an
/// `EXISTS` subquery correlated to the enclosing row, which is named after
/// the lambda's record at the root and after the collection inside a
/// subquery.
pub struct SqlFilterCompiler;

impl FilterCompiler for SqlFilterCompiler {
    type Filter = SqlFilter;

    fn compile(lambda: &Lambda) -> Result<Self::Filter, LowerError> {
        let scope = check_arity(lambda)?;
        let filter = match lower(&lambda.body, false, scope)? {
            Lowered::Const(true) => SqlFilter::new(),
            Lowered::Const(false) => SqlFilter::with_expr(SqlFilterExpr::False),
            Lowered::Sql(expr) => SqlFilter::with_expr(expr),
        };
        debug!(lambda = %lambda, sql = %filter.to_sql(), "Lowered predicate to SQL");
        Ok(filter)
    }
}

enum Lowered {
    Const(bool),
    Sql(SqlFilterExpr),
}

/// The record name of a single-parameter lambda.
fn check_arity(lambda: &Lambda) -> Result<&'static str, LowerError> {
    match lambda.parameters.as_slice() {
        [parameter] => Ok(parameter.record),
        _ => Err(LowerError::MultiParameter {
            parameters: lambda.arity(),
        }),
    }
}

fn lower(expr: &Expr, negated: bool, scope: &str) -> Result<Lowered, LowerError> {
    Ok(match expr {
        Expr::Constant(value) => Lowered::Const(*value != negated),
        Expr::Compare { field, op, value, .. } => lower_compare(field, *op, value, negated),
        Expr::Text { field, method, value } => match value {
            Value::String(needle) => match_or_null(
                field,
                Condition {
                    comparator: "LIKE".to_string(),
                    value: Value::String(like_pattern(*method, needle)).to_string(),
                    ..condition(field)
                }
                .into(),
                negated,
            ),
            _ => Lowered::Const(negated),
        },
        Expr::PatternMatch { field, pattern } => match pattern {
            Value::String(_) => match_or_null(
                field,
                SqlFilterExpr::PatIndex {
                    column: condition(field).column_ref(),
                    pattern: pattern.to_string(),
                },
                negated,
            ),
            _ => Lowered::Const(negated),
        },
        Expr::Any {
            field,
            link,
            predicate,
            ..
        } => {
            let link = link.ok_or_else(|| LowerError::UnlinkedCollection {
                field: field.clone(),
            })?;
            check_arity(predicate)?;
            let correlation = correlate(field, link, scope);
            let filter = match lower(&predicate.body, false, field)? {
                Lowered::Const(false) => return Ok(Lowered::Const(negated)),
                Lowered::Const(true) => correlation,
                Lowered::Sql(inner) => SqlFilterExpr::and(vec![correlation, inner]),
            };
            let exists = SqlFilterExpr::Exists {
                table: field.clone(),
                filter: Some(Box::new(filter)),
            };
            Lowered::Sql(if negated {
                SqlFilterExpr::not(exists)
            } else {
                exists
            })
        }
        Expr::And(items) => lower_chain(items, !negated, negated, scope)?,
        Expr::Or(items) => lower_chain(items, negated, negated, scope)?,
        Expr::Not(inner) => lower(inner, !negated, scope)?,
    })
}

/// Fold a chain, dropping neutral constants and stopping at an absorbing one.
fn lower_chain(
    items: &[Expr],
    conjunctive: bool,
    negated: bool,
    scope: &str,
) -> Result<Lowered, LowerError> {
    let mut parts = Vec::with_capacity(items.len());
    for item in items {
        match lower(item, negated, scope)? {
            Lowered::Const(value) if value == conjunctive => {}
            Lowered::Const(value) => return Ok(Lowered::Const(value)),
            Lowered::Sql(expr) => parts.push(expr),
        }
    }

    if parts.is_empty() {
        return Ok(Lowered::Const(conjunctive));
    }
    Ok(Lowered::Sql(if conjunctive {
        SqlFilterExpr::and(parts)
    } else {
        SqlFilterExpr::or(parts)
    }))
}

fn lower_compare(field: &FieldRef, op: CompareOp, value: &Value, negated: bool) -> Lowered {
    if value.is_null() {
        let is_null = match op {
            CompareOp::Eq => true,
            CompareOp::Ne => false,
            _ => return Lowered::Const(negated),
        };
        return Lowered::Sql(null_test(field, is_null != negated));
    }

    // `col <> v` also holds for NULL columns, so treat it as a negated `=`.
    let (op, negated) = match op {
        CompareOp::Ne => (CompareOp::Eq, !negated),
        op => (op, negated),
    };

    if negated {
        Lowered::Sql(SqlFilterExpr::or(vec![
            compare_leaf(field, complement(op), value),
            null_test(field, true),
        ]))
    } else {
        Lowered::Sql(compare_leaf(field, op, value))
    }
}

/// A match that is false for NULL columns; its negation therefore accepts them.
fn match_or_null(field: &FieldRef, test: SqlFilterExpr, negated: bool) -> Lowered {
    Lowered::Sql(if negated {
        SqlFilterExpr::or(vec![SqlFilterExpr::not(test), null_test(field, true)])
    } else {
        test
    })
}

/// `table.foreign_key = scope.parent_key`
fn correlate(table: &str, link: CollectionLink, scope: &str) -> SqlFilterExpr {
    Condition {
        table: table.to_string(),
        column: link.foreign_key.to_string(),
        comparator: "=".to_string(),
        value: format!("{scope}.{}", link.parent_key),
    }
    .into()
}

fn complement(op: CompareOp) -> CompareOp {
    match op {
        CompareOp::Eq => CompareOp::Ne,
        CompareOp::Ne => CompareOp::Eq,
        CompareOp::Lt => CompareOp::Ge,
        CompareOp::Le => CompareOp::Gt,
        CompareOp::Gt => CompareOp::Le,
        CompareOp::Ge => CompareOp::Lt,
    }
}

fn comparator(op: CompareOp) -> &'static str {
    match op {
        CompareOp::Eq => "=",
        CompareOp::Ne => "<>",
        CompareOp::Lt => "<",
        CompareOp::Le => "<=",
        CompareOp::Gt => ">",
        CompareOp::Ge => ">=",
    }
}

fn compare_leaf(field: &FieldRef, op: CompareOp, value: &Value) -> SqlFilterExpr {
    Condition {
        comparator: comparator(op).to_string(),
        value: literal(value),
        ..condition(field)
    }
    .into()
}

fn null_test(field: &FieldRef, is_null: bool) -> SqlFilterExpr {
    Condition {
        comparator: if is_null { "IS" } else { "IS NOT" }.to_string(),
        value: "NULL".to_string(),
        ..condition(field)
    }
    .into()
}

/// Split `a.b.c` into table `a.b` and column `c`.
fn condition(field: &FieldRef) -> Condition {
    let (table, column) = match field.path.rsplit_once('.') {
        Some((table, column)) => (table.to_string(), column.to_string()),
        None => (String::new(), field.path.clone()),
    };
    Condition {
        table,
        column,
        comparator: String::new(),
        value: String::new(),
    }
}

fn literal(value: &Value) -> String {
    match value {
        Value::Boolean(true) => "1".to_string(),
        Value::Boolean(false) => "0".to_string(),
        other => other.to_string(),
    }
}

/// Wrap `needle` for LIKE, bracket-escaping its wildcard characters.
fn like_pattern(method: TextMethod, needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len());
    for c in needle.chars() {
        match c {
            '[' | '%' | '_' => {
                escaped.push('[');
                escaped.push(c);
                escaped.push(']');
            }
            other => escaped.push(other),
        }
    }
    match method {
        TextMethod::Contains => format!("%{escaped}%"),
        TextMethod::StartsWith => format!("{escaped}%"),
        TextMethod::EndsWith => format!("%{escaped}"),
    }
}

impl From<Condition> for SqlFilterExpr {
    fn from(cond: Condition) -> Self {
        SqlFilterExpr::leaf(cond)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lambda::Parameter;
    use model::core::data_type::DataType;

    fn field(path: &str, data_type: DataType) -> FieldRef {
        FieldRef {
            path: path.to_string(),
            data_type,
        }
    }

    fn compare(path: &str, op: CompareOp, value: Value) -> Expr {
        Expr::Compare {
            field: field(path, DataType::Int),
            op,
            value,
            lexical: false,
        }
    }

    fn sql(body: Expr) -> String {
        SqlFilterCompiler::compile(&Lambda::new("Customer", body))
            .unwrap()
            .to_sql()
    }

    #[test]
    fn test_comparisons() {
        assert_eq!(sql(compare("age", CompareOp::Ge, Value::Int(18))), " WHERE age >= 18");
        assert_eq!(
            sql(compare("address.city", CompareOp::Eq, Value::from("O'Hara"))),
            " WHERE address.city = 'O''Hara'"
        );
        assert_eq!(
            sql(compare("active", CompareOp::Eq, Value::Boolean(true))),
            " WHERE active = 1"
        );
    }

    #[test]
    fn test_null_comparisons() {
        assert_eq!(sql(compare("age", CompareOp::Eq, Value::Null)), " WHERE age IS NULL");
        assert_eq!(sql(compare("age", CompareOp::Ne, Value::Null)), " WHERE age IS NOT NULL");
        assert_eq!(sql(compare("age", CompareOp::Lt, Value::Null)), " WHERE 1 = 0");
        assert_eq!(
            sql(compare("age", CompareOp::Ne, Value::Int(3))),
            " WHERE (age <> 3 OR age IS NULL)"
        );
    }

    #[test]
    fn test_negation_is_pushed_down() {
        let body = Expr::Not(Box::new(Expr::Or(vec![
            compare("age", CompareOp::Eq, Value::Int(5)),
            compare("age", CompareOp::Gt, Value::Int(60)),
        ])));
        assert_eq!(
            sql(body),
            " WHERE ((age <> 5 OR age IS NULL) AND (age <= 60 OR age IS NULL))"
        );

        let body = Expr::Not(Box::new(compare("age", CompareOp::Ne, Value::Int(5))));
        assert_eq!(sql(body), " WHERE age = 5");
    }

    #[test]
    fn test_constants_fold() {
        assert_eq!(sql(Expr::Constant(true)), "");
        assert_eq!(sql(Expr::Constant(false)), " WHERE 1 = 0");
        assert_eq!(sql(Expr::And(vec![])), "");
        assert_eq!(
            sql(Expr::And(vec![
                Expr::Constant(true),
                compare("age", CompareOp::Lt, Value::Int(3)),
            ])),
            " WHERE age < 3"
        );
        assert_eq!(
            sql(Expr::Or(vec![
                compare("age", CompareOp::Lt, Value::Int(3)),
                Expr::Not(Box::new(Expr::Constant(false))),
            ])),
            ""
        );
    }

    #[test]
    fn test_text_methods_escape_wildcards() {
        let body = Expr::Text {
            field: field("name", DataType::String),
            method: TextMethod::Contains,
            value: Value::from("50%_[x]"),
        };
        assert_eq!(sql(body), " WHERE name LIKE '%50[%][_][[]x]%'");

        let body = Expr::Not(Box::new(Expr::Text {
            field: field("name", DataType::String),
            method: TextMethod::StartsWith,
            value: Value::from("Jo"),
        }));
        assert_eq!(sql(body), " WHERE (NOT (name LIKE 'Jo%') OR name IS NULL)");
    }

    #[test]
    fn test_pattern_match() {
        let body = Expr::PatternMatch {
            field: field("email", DataType::String),
            pattern: Value::from("%@example.com"),
        };
        assert_eq!(sql(body), " WHERE PATINDEX('%@example.com', email) > 0");
    }

    fn any(field: &str, element: &'static str, link: Option<CollectionLink>, inner: Lambda) -> Expr {
        Expr::Any {
            field: field.to_string(),
            element,
            link,
            predicate: Box::new(inner),
        }
    }

    fn link(foreign_key: &'static str) -> Option<CollectionLink> {
        Some(CollectionLink {
            foreign_key,
            parent_key: "id",
        })
    }

    #[test]
    fn test_any_becomes_correlated_exists() {
        let inner = Lambda::new("Order", compare("total", CompareOp::Gt, Value::Int(100)));
        let body = any("orders", "Order", link("customer_id"), inner);
        assert_eq!(
            sql(body.clone()),
            " WHERE EXISTS (SELECT 1 FROM orders WHERE (orders.customer_id = Customer.id AND total > 100))"
        );
        assert_eq!(
            sql(Expr::Not(Box::new(body))),
            " WHERE NOT (EXISTS (SELECT 1 FROM orders WHERE (orders.customer_id = Customer.id AND total > 100)))"
        );

        let every = any("orders", "Order", link("customer_id"), Lambda::new("Order", Expr::Constant(true)));
        assert_eq!(
            sql(every),
            " WHERE EXISTS (SELECT 1 FROM orders WHERE orders.customer_id = Customer.id)"
        );

        let never = any("orders", "Order", link("customer_id"), Lambda::new("Order", Expr::Constant(false)));
        assert_eq!(sql(never), " WHERE 1 = 0");
    }

    #[test]
    fn test_nested_any_correlates_to_enclosing_collection() {
        let lines = Lambda::new("LineItem", compare("qty", CompareOp::Ge, Value::Int(10)));
        let orders = Lambda::new("Order", any("lines", "LineItem", link("order_id"), lines));
        assert_eq!(
            sql(any("orders", "Order", link("customer_id"), orders)),
            " WHERE EXISTS (SELECT 1 FROM orders WHERE (orders.customer_id = Customer.id \
             AND EXISTS (SELECT 1 FROM lines WHERE (lines.order_id = orders.id AND qty >= 10))))"
        );
    }

    #[test]
    fn test_unlinked_collection_is_rejected() {
        let inner = Lambda::new("Order", compare("total", CompareOp::Gt, Value::Int(100)));
        let lambda = Lambda::new("Customer", any("orders", "Order", None, inner));
        assert_eq!(
            SqlFilterCompiler::compile(&lambda).unwrap_err(),
            LowerError::UnlinkedCollection {
                field: "orders".into()
            }
        );
    }

    #[test]
    fn test_multi_parameter_lambda_is_rejected() {
        let mut lambda = Lambda::new("Customer", Expr::Constant(true));
        lambda.parameters.push(Parameter { record: "Order" });
        assert_eq!(
            SqlFilterCompiler::compile(&lambda).unwrap_err(),
            LowerError::MultiParameter { parameters: 2 }
        );
    }
}
