use super::Compiler;
use crate::{
    error::{CompileError, Result},
    lambda::{CompareOp, Expr, Lambda},
    predicate::{Predicate, eval_fn},
    schema::Record,
};
use criteria_syntax::{Node, Operator};
use lazy_static::lazy_static;
use std::collections::HashMap;
use tracing::debug;

lazy_static! {
    static ref RELATIONAL_OPERATORS: HashMap<Operator, CompareOp> = {
        let mut m = HashMap::new();
        m.insert(Operator::Equal, CompareOp::Eq);
        m.insert(Operator::NotEqual, CompareOp::Ne);
        m.insert(Operator::LessThan, CompareOp::Lt);
        m.insert(Operator::LessThanOrEqual, CompareOp::Le);
        m.insert(Operator::GreaterThan, CompareOp::Gt);
        m.insert(Operator::GreaterThanOrEqual, CompareOp::Ge);
        m
    };
}

pub(super) fn compile_relational<T: Record>(
    compiler: &Compiler<'_>,
    node: &Node,
) -> Result<Predicate<T>> {
    let op = RELATIONAL_OPERATORS
        .get(&node.operator())
        .copied()
        .ok_or_else(|| CompileError::UnsupportedOperator {
            operator: node.operator(),
            context: "as a predicate".to_string(),
        })?;

    let field = compiler.scalar_field::<T>(node)?;
    let value = compiler.operand(node, &field)?;
    let lexical = field.data_type().is_textual() && op.is_ordering();
    debug!(field = field.path(), op = op.symbol(), %value, lexical, "Compiled comparison");

    let lambda = Lambda::new(
        T::schema().name(),
        Expr::Compare {
            field: field.field_ref(),
            op,
            value: value.clone(),
            lexical,
        },
    );
    let eval = eval_fn(move |record: &T| {
        field
            .get(record)
            .is_some_and(|actual| op.evaluate(&actual, &value))
    });

    Ok(Predicate::from_parts(lambda, Some(eval)))
}
