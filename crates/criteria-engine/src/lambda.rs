//! Type-erased, introspectable form of a compiled predicate.
//!
//! A [`Lambda`] mirrors what the in-memory closure does, so that a query
//! engine can lower it into its own language instead of evaluating records
//! one by one.

use crate::error::{CompileError, Result};
use model::core::{data_type::DataType, value::Value};
use std::{cmp::Ordering, fmt};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub record: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRef {
    pub path: String,
    pub data_type: DataType,
}

/// Keys joining a collection's rows to the record that owns them:
/// `element.foreign_key = parent.parent_key`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectionLink {
    pub foreign_key: &'static str,
    pub parent_key: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            CompareOp::Eq => "==",
            CompareOp::Ne => "!=",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
        }
    }

    pub fn is_ordering(&self) -> bool {
        !matches!(self, CompareOp::Eq | CompareOp::Ne)
    }

    /// Compare with lifted null semantics: null equals only null, and any
    /// ordering involving null is false.
    pub fn evaluate(&self, left: &Value, right: &Value) -> bool {
        match (left.is_null(), right.is_null()) {
            (true, true) => *self == CompareOp::Eq,
            (true, false) | (false, true) => *self == CompareOp::Ne,
            (false, false) => self.test(left.compare(right)),
        }
    }

    fn test(&self, ordering: Option<Ordering>) -> bool {
        match self {
            CompareOp::Eq => ordering == Some(Ordering::Equal),
            CompareOp::Ne => ordering != Some(Ordering::Equal),
            CompareOp::Lt => ordering == Some(Ordering::Less),
            CompareOp::Le => matches!(ordering, Some(Ordering::Less | Ordering::Equal)),
            CompareOp::Gt => ordering == Some(Ordering::Greater),
            CompareOp::Ge => matches!(ordering, Some(Ordering::Greater | Ordering::Equal)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextMethod {
    Contains,
    StartsWith,
    EndsWith,
}

impl TextMethod {
    pub fn apply(&self, haystack: &str, needle: &str) -> bool {
        match self {
            TextMethod::Contains => haystack.contains(needle),
            TextMethod::StartsWith => haystack.starts_with(needle),
            TextMethod::EndsWith => haystack.ends_with(needle),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TextMethod::Contains => "Contains",
            TextMethod::StartsWith => "StartsWith",
            TextMethod::EndsWith => "EndsWith",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Constant(bool),
    Compare {
        field: FieldRef,
        op: CompareOp,
        value: Value,
        /// Ordering over text, compared as a three-way string comparison.
        lexical: bool,
    },
    Text {
        field: FieldRef,
        method: TextMethod,
        value: Value,
    },
    /// The query engine's pattern primitive: `PATINDEX(pattern, field) > 0`.
    PatternMatch {
        field: FieldRef,
        pattern: Value,
    },
    Any {
        field: String,
        element: &'static str,
        /// Without a link the query engine cannot tell which rows belong
        /// to the record under test.
        link: Option<CollectionLink>,
        predicate: Box<Lambda>,
    },
    And(Vec<Expr>),
    Or(Vec<Expr>),
    Not(Box<Expr>),
}

impl Expr {
    /// Nodes the query engine cannot reproduce: pattern matches and
    /// collections without a link to their owner.
    fn has_engine_divergence(&self) -> bool {
        match self {
            Expr::PatternMatch { .. } => true,
            Expr::Any { link: None, .. } => true,
            Expr::Any { predicate, .. } => predicate.body.has_engine_divergence(),
            Expr::And(items) | Expr::Or(items) => items.iter().any(Expr::has_engine_divergence),
            Expr::Not(inner) => inner.has_engine_divergence(),
            Expr::Constant(_) | Expr::Compare { .. } | Expr::Text { .. } => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Lambda {
    pub parameters: Vec<Parameter>,
    pub body: Expr,
}

impl Lambda {
    pub fn new(record: &'static str, body: Expr) -> Self {
        Lambda {
            parameters: vec![Parameter { record }],
            body,
        }
    }

    pub fn arity(&self) -> usize {
        self.parameters.len()
    }

    /// Whether in-memory evaluation agrees with the query engine.
    pub fn is_portable(&self) -> bool {
        !self.body.has_engine_divergence()
    }

    pub fn and(self, other: Lambda) -> Lambda {
        let body = match (self.body, other.body) {
            (Expr::Constant(true), rhs) => rhs,
            (lhs, Expr::Constant(true)) => lhs,
            (Expr::Constant(false), _) | (_, Expr::Constant(false)) => Expr::Constant(false),
            (Expr::And(mut items), rhs) => {
                items.push(rhs);
                Expr::And(items)
            }
            (lhs, rhs) => Expr::And(vec![lhs, rhs]),
        };
        Lambda {
            parameters: self.parameters,
            body,
        }
    }

    pub fn or(self, other: Lambda) -> Lambda {
        let body = match (self.body, other.body) {
            (Expr::Constant(false), rhs) => rhs,
            (lhs, Expr::Constant(false)) => lhs,
            (Expr::Constant(true), _) | (_, Expr::Constant(true)) => Expr::Constant(true),
            (Expr::Or(mut items), rhs) => {
                items.push(rhs);
                Expr::Or(items)
            }
            (lhs, rhs) => Expr::Or(vec![lhs, rhs]),
        };
        Lambda {
            parameters: self.parameters,
            body,
        }
    }

    pub fn negate(self) -> Result<Lambda> {
        if self.parameters.len() != 1 {
            return Err(CompileError::InvalidNegation {
                parameters: self.parameters.len(),
            });
        }
        let body = match self.body {
            Expr::Constant(value) => Expr::Constant(!value),
            body => Expr::Not(Box::new(body)),
        };
        Ok(Lambda {
            parameters: self.parameters,
            body,
        })
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Constant(value) => write!(f, "{value}"),
            Expr::Compare {
                field,
                op,
                value,
                lexical: true,
            } => write!(f, "compare({}, {value}) {} 0", field.path, op.symbol()),
            Expr::Compare { field, op, value, .. } => {
                write!(f, "{} {} {value}", field.path, op.symbol())
            }
            Expr::Text { field, method, value } => {
                write!(f, "{}.{}({value})", field.path, method.name())
            }
            Expr::PatternMatch { field, pattern } => {
                write!(f, "PATINDEX({pattern}, {}) > 0", field.path)
            }
            Expr::Any { field, predicate, .. } => write!(f, "{field}.any({predicate})"),
            Expr::And(items) => write_joined(f, items, " && "),
            Expr::Or(items) => write_joined(f, items, " || "),
            Expr::Not(inner) => write!(f, "!({inner})"),
        }
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, items: &[Expr], separator: &str) -> fmt::Result {
    write!(f, "(")?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, "{separator}")?;
        }
        write!(f, "{item}")?;
    }
    write!(f, ")")
}

impl fmt::Display for Lambda {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let records: Vec<_> = self.parameters.iter().map(|p| p.record).collect();
        write!(f, "|{}| {}", records.join(", "), self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn age_eq(value: i64) -> Lambda {
        Lambda::new(
            "Customer",
            Expr::Compare {
                field: FieldRef {
                    path: "age".into(),
                    data_type: DataType::Int,
                },
                op: CompareOp::Eq,
                value: Value::Int(value),
                lexical: false,
            },
        )
    }

    #[test]
    fn test_compare_null_semantics() {
        assert!(CompareOp::Eq.evaluate(&Value::Null, &Value::Null));
        assert!(!CompareOp::Ne.evaluate(&Value::Null, &Value::Null));
        assert!(CompareOp::Ne.evaluate(&Value::Null, &Value::Int(1)));
        assert!(!CompareOp::Le.evaluate(&Value::Null, &Value::Null));
        assert!(!CompareOp::Gt.evaluate(&Value::Int(2), &Value::Null));
    }

    #[test]
    fn test_compare_ordering() {
        let a = Value::String("a".into());
        let b = Value::String("b".into());
        assert!(CompareOp::Lt.evaluate(&a, &b));
        assert!(!CompareOp::Lt.evaluate(&b, &b));
        assert!(CompareOp::Ge.evaluate(&b, &b));
    }

    #[test]
    fn test_and_drops_neutral_element() {
        let lambda = Lambda::new("Customer", Expr::Constant(true)).and(age_eq(1));
        assert_eq!(lambda, age_eq(1));

        let lambda = lambda.and(age_eq(2)).and(age_eq(3));
        assert!(matches!(lambda.body, Expr::And(ref items) if items.len() == 3));
    }

    #[test]
    fn test_or_with_true_is_true() {
        let lambda = age_eq(1).or(Lambda::new("Customer", Expr::Constant(true)));
        assert_eq!(lambda.body, Expr::Constant(true));
    }

    #[test]
    fn test_negate_requires_single_parameter() {
        let negated = age_eq(1).negate().unwrap();
        assert!(matches!(negated.body, Expr::Not(_)));

        let mut pair = age_eq(1);
        pair.parameters.push(Parameter { record: "Order" });
        let err = pair.negate().unwrap_err();
        assert!(matches!(err, CompileError::InvalidNegation { parameters: 2 }));
    }

    #[test]
    fn test_unlinked_collection_is_not_portable() {
        let any = |link: Option<CollectionLink>| {
            Lambda::new(
                "Customer",
                Expr::Any {
                    field: "orders".into(),
                    element: "Order",
                    link,
                    predicate: Box::new(Lambda::new("Order", Expr::Constant(true))),
                },
            )
        };
        let link = CollectionLink {
            foreign_key: "customer_id",
            parent_key: "id",
        };

        assert!(!any(None).is_portable());
        assert!(any(Some(link)).is_portable());
        assert!(!age_eq(1).and(any(None)).is_portable());
    }

    #[test]
    fn test_display() {
        let lambda = age_eq(5).or(age_eq(6)).negate().unwrap();
        assert_eq!(lambda.to_string(), "|Customer| !((age == 5 || age == 6))");
    }
}
