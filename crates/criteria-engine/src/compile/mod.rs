//! Criteria compiler.
//!
//! Dispatch follows operator families in a fixed order: unary, aggregate,
//! method call, `Like`, `Any`, then the relational operators.

mod aggregate;
mod method;
mod quantifier;
mod relational;

use crate::{
    context::ContextValue,
    error::{CompileError, Result},
    options::CompileOptions,
    predicate::Predicate,
    resolve,
    schema::{FieldKind, Record, ResolvedField, ScalarPath},
};
use criteria_syntax::{Node, Operator};
use model::core::value::Value;
use tracing::trace;

#[derive(Debug, Clone, Default)]
pub struct Compiler<'a> {
    options: CompileOptions,
    context: Option<&'a ContextValue>,
}

impl<'a> Compiler<'a> {
    pub fn new(options: CompileOptions) -> Self {
        Compiler {
            options,
            context: None,
        }
    }

    pub fn with_context(mut self, context: &'a ContextValue) -> Self {
        self.context = Some(context);
        self
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    pub fn context(&self) -> Option<&'a ContextValue> {
        self.context
    }

    pub fn compile<T: Record>(&self, node: &Node) -> Result<Predicate<T>> {
        trace!(record = T::schema().name(), operator = %node.operator(), "Compiling criteria");

        if node.is_unary() {
            return Ok(match node.operator() {
                Operator::IsTrue => Predicate::always_true(),
                _ => Predicate::always_false(),
            });
        }
        if node.is_aggregate() {
            return aggregate::compile_aggregate(self, node);
        }
        if node.is_method_call() {
            return method::compile_method(self, node);
        }
        if node.is_static_call() {
            return method::compile_like(self, node);
        }
        if node.is_any() {
            return quantifier::compile_any(self, node);
        }
        relational::compile_relational(self, node)
    }

    fn field_name<'n>(&self, node: &'n Node) -> Result<&'n str> {
        node.field_name().ok_or(CompileError::MissingFieldName {
            operator: node.operator(),
        })
    }

    /// Resolve the node's field, which must be a scalar.
    fn scalar_field<T: Record>(&self, node: &Node) -> Result<ScalarPath<T>> {
        let name = self.field_name(node)?;
        match T::schema().resolve(name)? {
            ResolvedField::Scalar(scalar) => Ok(scalar),
            ResolvedField::Collection(_) => Err(CompileError::FieldKindMismatch {
                field: name.to_string(),
                expected: FieldKind::Scalar,
                actual: FieldKind::Collection,
            }),
        }
    }

    /// Resolve the right-hand side and convert it to the field's type.
    fn operand<T: Record>(&self, node: &Node, field: &ScalarPath<T>) -> Result<Value> {
        let value = resolve::right_hand_side(self, node.right_hand_side())?;
        resolve::coerce(value, field.data_type(), field.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        lambda::{CompareOp, Expr},
        options::{Clock, LikeEvaluation},
        schema::Schema,
    };
    use chrono::NaiveDate;
    use lazy_static::lazy_static;
    use model::core::data_type::DataType;

    struct Item {
        sku: String,
        qty: i64,
    }

    struct Crate {
        label: Option<String>,
        items: Vec<Item>,
    }

    lazy_static! {
        static ref ITEM: Schema<Item> = Schema::<Item>::new("Item")
            .scalar("sku", DataType::String, |i| Value::from(i.sku.as_str()))
            .scalar("qty", DataType::Int, |i| Value::Int(i.qty));
        static ref CRATE: Schema<Crate> = Schema::<Crate>::new("Crate")
            .scalar("label", DataType::String, |c| Value::from(c.label.clone()))
            .collection::<Item>("items", |c| c.items.as_slice());
    }

    impl Record for Item {
        fn schema() -> &'static Schema<Self> {
            &ITEM
        }
    }

    impl Record for Crate {
        fn schema() -> &'static Schema<Self> {
            &CRATE
        }
    }

    fn sample() -> Crate {
        Crate {
            label: Some("fragile".into()),
            items: vec![
                Item { sku: "A-1".into(), qty: 3 },
                Item { sku: "B-7".into(), qty: 0 },
            ],
        }
    }

    #[test]
    fn test_unary_needs_no_field() {
        let compiler = Compiler::default();
        let yes = compiler.compile::<Crate>(&Node::always_true()).unwrap();
        let no = compiler.compile::<Crate>(&Node::always_false()).unwrap();

        assert!(yes.evaluate(&sample()).unwrap());
        assert!(!no.evaluate(&sample()).unwrap());
    }

    #[test]
    fn test_relational_builds_compare_lambda() {
        let predicate = Compiler::default()
            .compile::<Item>(&Node::greater_than("qty", 2))
            .unwrap();

        assert!(matches!(
            predicate.lambda().body,
            Expr::Compare { op: CompareOp::Gt, lexical: false, .. }
        ));
        assert!(predicate.evaluate(&sample().items[0]).unwrap());
        assert!(!predicate.evaluate(&sample().items[1]).unwrap());
    }

    #[test]
    fn test_missing_field_name() {
        let node = criteria_syntax::wire::from_str(r#"{ "selectionComparison": "Equal" }"#).unwrap();
        let err = Compiler::default().compile::<Item>(&node).unwrap_err();
        assert!(matches!(err, CompileError::MissingFieldName { operator: Operator::Equal }));
    }

    #[test]
    fn test_scalar_operator_on_collection() {
        let err = Compiler::default()
            .compile::<Crate>(&Node::equal("items", 1))
            .unwrap_err();
        assert!(matches!(
            err,
            CompileError::FieldKindMismatch { actual: FieldKind::Collection, .. }
        ));
    }

    #[test]
    fn test_constant_node_is_not_a_predicate() {
        let err = Compiler::default()
            .compile::<Item>(&Node::constant(1))
            .unwrap_err();
        assert!(matches!(
            err,
            CompileError::UnsupportedOperator { operator: Operator::Constant, .. }
        ));
    }

    #[test]
    fn test_any_over_items() {
        let compiler = Compiler::default();
        let has_empty = compiler
            .compile::<Crate>(&Node::any("items", Node::equal("qty", 0)))
            .unwrap();
        let has_c = compiler
            .compile::<Crate>(&Node::any("items", Node::starts_with("sku", "C")))
            .unwrap();

        assert!(has_empty.evaluate(&sample()).unwrap());
        assert!(!has_c.evaluate(&sample()).unwrap());
        // `items` carries no key back to its crate.
        assert!(!has_empty.is_portable());
    }

    #[test]
    fn test_like_follows_options() {
        let node = Node::like("label", "frag%");

        let delegated = Compiler::default().compile::<Crate>(&node).unwrap();
        assert!(delegated.evaluate(&sample()).is_err());
        assert!(!delegated.is_portable());

        let emulated = Compiler::new(CompileOptions::default().with_like(LikeEvaluation::Emulate))
            .compile::<Crate>(&node)
            .unwrap();
        assert!(emulated.evaluate(&sample()).unwrap());
    }

    #[test]
    fn test_fixed_clock_resolves_now() {
        let now = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        let compiler = Compiler::new(CompileOptions::default().with_clock(Clock::Fixed(now)));
        let predicate = compiler
            .compile::<Crate>(&Node::equal("label", "{NOW:DATE}"))
            .unwrap();

        match &predicate.lambda().body {
            Expr::Compare { value, .. } => assert_eq!(value, &Value::from("2024-03-01T00:00:00")),
            other => panic!("unexpected lambda {other}"),
        }
    }
}
