use super::Compiler;
use crate::{
    error::{CompileError, Result},
    lambda::{Expr, Lambda},
    predicate::Predicate,
    schema::{FieldKind, Record, ResolvedField},
};
use criteria_syntax::Node;
use tracing::debug;

pub(super) fn compile_any<T: Record>(compiler: &Compiler<'_>, node: &Node) -> Result<Predicate<T>> {
    let name = compiler.field_name(node)?;
    let inner = node
        .inner_criteria()
        .ok_or_else(|| CompileError::MissingInnerCriteria {
            field: name.to_string(),
        })?;

    let collection = match T::schema().resolve(name)? {
        ResolvedField::Collection(collection) => collection,
        ResolvedField::Scalar(_) => {
            return Err(CompileError::FieldKindMismatch {
                field: name.to_string(),
                expected: FieldKind::Collection,
                actual: FieldKind::Scalar,
            });
        }
    };
    debug!(
        field = name,
        element = collection.element(),
        linked = collection.link().is_some(),
        "Compiling Any criteria"
    );

    let compiled = collection.compile_any(inner, compiler)?;
    let lambda = Lambda::new(
        T::schema().name(),
        Expr::Any {
            field: collection.path().to_string(),
            element: collection.element(),
            link: collection.link(),
            predicate: Box::new(compiled.lambda),
        },
    );

    Ok(Predicate::from_parts(lambda, compiled.eval))
}
