use super::{add::evaluate_add, sigil::resolve_sigil};
use crate::{
    compile::Compiler,
    error::{CompileError, Result},
};
use criteria_syntax::Node;
use model::core::value::Value;

/// Resolve the value a criteria compares against.
///
/// An absent right-hand side is `Null`. Only `Constant` and `Add` nodes
/// produce values.
pub(crate) fn right_hand_side(compiler: &Compiler<'_>, node: Option<&Node>) -> Result<Value> {
    match node {
        None => Ok(Value::Null),
        Some(node) if node.is_add() => evaluate_add(compiler, node),
        Some(node) => constant(compiler, node),
    }
}

/// The sigil-resolved value of a `Constant` node.
pub(super) fn constant(compiler: &Compiler<'_>, node: &Node) -> Result<Value> {
    if !node.is_constant() {
        return Err(CompileError::NonConstantOperand(node.operator()));
    }
    let literal = node.constant_value().cloned().unwrap_or(Value::Null);
    resolve_sigil(compiler, literal)
}
