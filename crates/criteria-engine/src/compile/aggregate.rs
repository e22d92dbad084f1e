use super::Compiler;
use crate::{error::Result, predicate::Predicate, schema::Record};
use criteria_syntax::Node;
use tracing::trace;

/// Fold `And`/`Or`/`Nand`/`Nor` children from the neutral element, then
/// negate for the negating forms.
pub(super) fn compile_aggregate<T: Record>(compiler: &Compiler<'_>, node: &Node) -> Result<Predicate<T>> {
    let conjunctive = node.is_and();
    let mut folded = if conjunctive {
        Predicate::always_true()
    } else {
        Predicate::always_false()
    };

    for child in node.aggregate_list() {
        let child = compiler.compile::<T>(child)?;
        folded = if conjunctive {
            folded.and(child)
        } else {
            folded.or(child)
        };
    }

    if node.is_negate() {
        folded = folded.negate()?;
    }
    trace!(operator = %node.operator(), children = node.aggregate_list().len(), "Folded aggregate");
    Ok(folded)
}
