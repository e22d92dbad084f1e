use crate::{ast::operator::Operator, wire::WireNode};
use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Utc};
use model::core::value::Value;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// One node of a selection-criteria tree.
///
/// Nodes are built through the factory functions below or deserialized from
/// the wire format, and are read-only afterwards. Which attributes are
/// populated depends on the operator:
///
/// - relational, method and `Like` nodes: `field_name` and `right_hand_side`
/// - `Any`: `field_name` and `inner_criteria`
/// - aggregates and `Add`: `aggregate_list`
/// - `Constant`: `constant_value`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "WireNode", into = "WireNode")]
pub struct Node {
    operator: Operator,
    field_name: Option<String>,
    right_hand_side: Option<Box<Node>>,
    constant_value: Option<Value>,
    inner_criteria: Option<Box<Node>>,
    aggregate_list: Vec<Node>,
}

impl Node {
    fn bare(operator: Operator) -> Self {
        Node {
            operator,
            field_name: None,
            right_hand_side: None,
            constant_value: None,
            inner_criteria: None,
            aggregate_list: Vec::new(),
        }
    }

    /// Assemble a node from already-validated parts.
    pub(crate) fn from_parts(
        operator: Operator,
        field_name: Option<String>,
        right_hand_side: Option<Node>,
        constant_value: Option<Value>,
        inner_criteria: Option<Node>,
        aggregate_list: Vec<Node>,
    ) -> Self {
        let constant_value = match (operator, constant_value) {
            (Operator::Constant, None) => Some(Value::Null),
            (_, value) => value,
        };
        Node {
            operator,
            field_name,
            right_hand_side: right_hand_side.map(Box::new),
            constant_value,
            inner_criteria: inner_criteria.map(Box::new),
            aggregate_list,
        }
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }

    pub fn field_name(&self) -> Option<&str> {
        self.field_name.as_deref()
    }

    pub fn right_hand_side(&self) -> Option<&Node> {
        self.right_hand_side.as_deref()
    }

    pub fn constant_value(&self) -> Option<&Value> {
        self.constant_value.as_ref()
    }

    pub fn inner_criteria(&self) -> Option<&Node> {
        self.inner_criteria.as_deref()
    }

    pub fn aggregate_list(&self) -> &[Node] {
        &self.aggregate_list
    }

    pub fn is_aggregate(&self) -> bool {
        self.operator.is_aggregate()
    }

    pub fn is_negate(&self) -> bool {
        self.operator.is_negate()
    }

    pub fn is_and(&self) -> bool {
        self.operator.is_and()
    }

    pub fn is_method_call(&self) -> bool {
        self.operator.is_method_call()
    }

    pub fn is_static_call(&self) -> bool {
        self.operator.is_static_call()
    }

    pub fn is_any(&self) -> bool {
        self.operator.is_any()
    }

    pub fn is_unary(&self) -> bool {
        self.operator.is_unary()
    }

    pub fn is_constant(&self) -> bool {
        self.operator.is_constant()
    }

    pub fn is_add(&self) -> bool {
        self.operator.is_add()
    }

    pub fn compare(operator: Operator, field: impl Into<String>, rhs: impl Into<Node>) -> Node {
        Node {
            field_name: Some(field.into()),
            right_hand_side: Some(Box::new(rhs.into())),
            ..Node::bare(operator)
        }
    }

    pub fn always_true() -> Node {
        Node::bare(Operator::IsTrue)
    }

    pub fn always_false() -> Node {
        Node::bare(Operator::IsFalse)
    }

    pub fn equal(field: impl Into<String>, rhs: impl Into<Node>) -> Node {
        Node::compare(Operator::Equal, field, rhs)
    }

    pub fn not_equal(field: impl Into<String>, rhs: impl Into<Node>) -> Node {
        Node::compare(Operator::NotEqual, field, rhs)
    }

    pub fn greater_than(field: impl Into<String>, rhs: impl Into<Node>) -> Node {
        Node::compare(Operator::GreaterThan, field, rhs)
    }

    pub fn greater_than_or_equal(field: impl Into<String>, rhs: impl Into<Node>) -> Node {
        Node::compare(Operator::GreaterThanOrEqual, field, rhs)
    }

    pub fn less_than(field: impl Into<String>, rhs: impl Into<Node>) -> Node {
        Node::compare(Operator::LessThan, field, rhs)
    }

    pub fn less_than_or_equal(field: impl Into<String>, rhs: impl Into<Node>) -> Node {
        Node::compare(Operator::LessThanOrEqual, field, rhs)
    }

    pub fn contains(field: impl Into<String>, rhs: impl Into<Node>) -> Node {
        Node::compare(Operator::Contains, field, rhs)
    }

    pub fn starts_with(field: impl Into<String>, rhs: impl Into<Node>) -> Node {
        Node::compare(Operator::StartsWith, field, rhs)
    }

    pub fn ends_with(field: impl Into<String>, rhs: impl Into<Node>) -> Node {
        Node::compare(Operator::EndsWith, field, rhs)
    }

    /// SQL `LIKE` match, evaluated by the query engine's pattern primitive.
    pub fn like(field: impl Into<String>, pattern: impl Into<Node>) -> Node {
        Node::compare(Operator::Like, field, pattern)
    }

    /// True when at least one element of the collection `field` satisfies `inner`.
    pub fn any(field: impl Into<String>, inner: Node) -> Node {
        Node {
            field_name: Some(field.into()),
            inner_criteria: Some(Box::new(inner)),
            ..Node::bare(Operator::Any)
        }
    }

    pub fn and(criteria: impl IntoIterator<Item = Node>) -> Node {
        Node::aggregate(Operator::And, criteria)
    }

    pub fn or(criteria: impl IntoIterator<Item = Node>) -> Node {
        Node::aggregate(Operator::Or, criteria)
    }

    pub fn nand(criteria: impl IntoIterator<Item = Node>) -> Node {
        Node::aggregate(Operator::Nand, criteria)
    }

    pub fn nor(criteria: impl IntoIterator<Item = Node>) -> Node {
        Node::aggregate(Operator::Nor, criteria)
    }

    pub fn not(criteria: Node) -> Node {
        Node::nand([criteria])
    }

    /// `field` equals one of `values`.
    pub fn contained_in<I>(field: impl Into<String>, values: I) -> Node
    where
        I: IntoIterator,
        I::Item: Into<Node>,
    {
        let field = field.into();
        Node::or(
            values
                .into_iter()
                .map(|value| Node::equal(field.clone(), value)),
        )
    }

    /// Inclusive range test: `left <= field <= right`.
    pub fn between(field: impl Into<String>, left: impl Into<Node>, right: impl Into<Node>) -> Node {
        let field = field.into();
        Node::and([
            Node::greater_than_or_equal(field.clone(), left),
            Node::less_than_or_equal(field, right),
        ])
    }

    pub fn constant(value: impl Into<Value>) -> Node {
        Node {
            constant_value: Some(value.into()),
            ..Node::bare(Operator::Constant)
        }
    }

    /// Sum of constant operands, folded left to right at compile time.
    pub fn add<I>(operands: I) -> Node
    where
        I: IntoIterator,
        I::Item: Into<Node>,
    {
        Node {
            aggregate_list: operands.into_iter().map(Into::into).collect(),
            ..Node::bare(Operator::Add)
        }
    }

    fn aggregate(operator: Operator, criteria: impl IntoIterator<Item = Node>) -> Node {
        Node {
            aggregate_list: criteria.into_iter().collect(),
            ..Node::bare(operator)
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.operator {
            Operator::Constant => match &self.constant_value {
                Some(value) => write!(f, "{value}"),
                None => write!(f, "NULL"),
            },
            Operator::IsTrue | Operator::IsFalse => write!(f, "{}", self.operator),
            op if op.is_aggregate() || op.is_add() => {
                write!(f, "{op}[")?;
                for (i, child) in self.aggregate_list.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{child}")?;
                }
                write!(f, "]")
            }
            Operator::Any => {
                let field = self.field_name.as_deref().unwrap_or("?");
                match &self.inner_criteria {
                    Some(inner) => write!(f, "Any({field}, {inner})"),
                    None => write!(f, "Any({field})"),
                }
            }
            op => {
                let field = self.field_name.as_deref().unwrap_or("?");
                match &self.right_hand_side {
                    Some(rhs) => write!(f, "{op}({field}, {rhs})"),
                    None => write!(f, "{op}({field}, NULL)"),
                }
            }
        }
    }
}

/// Literals placed where a node is expected become `Constant` nodes.
macro_rules! impl_from_literal_for_node {
    ($($source:ty),* $(,)?) => {
        $(
            impl From<$source> for Node {
                fn from(value: $source) -> Self {
                    Node::constant(value)
                }
            }
        )*
    };
}

impl_from_literal_for_node!(
    i64,
    i32,
    u64,
    u32,
    f64,
    bool,
    &str,
    String,
    Value,
    BigDecimal,
    Uuid,
    NaiveDate,
    NaiveDateTime,
    DateTime<Utc>,
    NaiveTime,
    TimeDelta,
);

impl<T: Into<Value>> From<Option<T>> for Node {
    fn from(value: Option<T>) -> Self {
        Node::constant(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compare_wraps_literal_as_constant() {
        let node = Node::equal("age", 5);

        assert_eq!(node.operator(), Operator::Equal);
        assert_eq!(node.field_name(), Some("age"));
        let rhs = node.right_hand_side().unwrap();
        assert!(rhs.is_constant());
        assert_eq!(rhs.constant_value(), Some(&Value::Int(5)));
        assert!(node.inner_criteria().is_none());
        assert!(node.aggregate_list().is_empty());
    }

    #[test]
    fn test_any_sets_only_field_and_inner() {
        let node = Node::any("orders", Node::greater_than("total", 10.0));

        assert!(node.is_any());
        assert_eq!(node.field_name(), Some("orders"));
        assert!(node.right_hand_side().is_none());
        assert_eq!(
            node.inner_criteria().map(Node::operator),
            Some(Operator::GreaterThan)
        );
    }

    #[test]
    fn test_not_is_single_operand_nand() {
        let node = Node::not(Node::equal("name", "a"));

        assert_eq!(node.operator(), Operator::Nand);
        assert!(node.is_negate());
        assert_eq!(node.aggregate_list().len(), 1);
    }

    #[test]
    fn test_contained_in_expands_to_or_of_equals() {
        let node = Node::contained_in("x", [1, 2, 3]);

        assert_eq!(node.operator(), Operator::Or);
        assert_eq!(node.aggregate_list().len(), 3);
        for (child, expected) in node.aggregate_list().iter().zip([1, 2, 3]) {
            assert_eq!(child, &Node::equal("x", expected));
        }
    }

    #[test]
    fn test_between_is_inclusive_range() {
        let node = Node::between("x", 2, 5);

        assert_eq!(
            node,
            Node::and([
                Node::greater_than_or_equal("x", 2),
                Node::less_than_or_equal("x", 5),
            ])
        );
    }

    #[test]
    fn test_add_keeps_operands_in_order() {
        let node = Node::add(["{NOW}", "1.00:00:00"]);

        assert!(node.is_add());
        let values: Vec<_> = node
            .aggregate_list()
            .iter()
            .filter_map(Node::constant_value)
            .collect();
        assert_eq!(
            values,
            vec![
                &Value::String("{NOW}".into()),
                &Value::String("1.00:00:00".into())
            ]
        );
    }

    #[test]
    fn test_option_literal_becomes_null_constant() {
        let node = Node::equal("deleted_at", None::<NaiveDate>);
        assert_eq!(
            node.right_hand_side().and_then(Node::constant_value),
            Some(&Value::Null)
        );
    }

    #[test]
    fn test_display() {
        let node = Node::and([Node::equal("name", "O'Neil"), Node::always_true()]);
        assert_eq!(node.to_string(), "And[Equal(name, 'O''Neil'), IsTrue]");
    }
}
