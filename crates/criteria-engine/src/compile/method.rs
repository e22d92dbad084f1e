use super::Compiler;
use crate::{
    error::{CompileError, Result},
    lambda::{Expr, Lambda, TextMethod},
    like::like_to_regex,
    options::LikeEvaluation,
    predicate::{Predicate, eval_fn},
    schema::{Record, ScalarPath},
};
use criteria_syntax::{Node, Operator};
use lazy_static::lazy_static;
use model::core::value::Value;
use std::collections::HashMap;
use tracing::{debug, warn};

lazy_static! {
    static ref TEXT_METHODS: HashMap<Operator, TextMethod> = {
        let mut m = HashMap::new();
        m.insert(Operator::Contains, TextMethod::Contains);
        m.insert(Operator::StartsWith, TextMethod::StartsWith);
        m.insert(Operator::EndsWith, TextMethod::EndsWith);
        m
    };
}

fn text_field<T: Record>(compiler: &Compiler<'_>, node: &Node) -> Result<ScalarPath<T>> {
    let field = compiler.scalar_field::<T>(node)?;
    if !field.data_type().is_textual() {
        return Err(CompileError::UnsupportedOperator {
            operator: node.operator(),
            context: format!("on field \"{}\" of type {}", field.path(), field.data_type()),
        });
    }
    Ok(field)
}

pub(super) fn compile_method<T: Record>(compiler: &Compiler<'_>, node: &Node) -> Result<Predicate<T>> {
    let method = TEXT_METHODS.get(&node.operator()).copied().ok_or_else(|| {
        CompileError::UnsupportedOperator {
            operator: node.operator(),
            context: "as a text method".to_string(),
        }
    })?;

    let field = text_field::<T>(compiler, node)?;
    let value = compiler.operand(node, &field)?;
    debug!(field = field.path(), method = method.name(), %value, "Compiled text method");

    let lambda = Lambda::new(
        T::schema().name(),
        Expr::Text {
            field: field.field_ref(),
            method,
            value: value.clone(),
        },
    );
    let eval = eval_fn(move |record: &T| match (field.get(record), &value) {
        (Some(Value::String(actual)), Value::String(needle)) => method.apply(&actual, needle),
        _ => false,
    });

    Ok(Predicate::from_parts(lambda, Some(eval)))
}

/// `Like` lowers to the query engine's pattern primitive. Whether it can
/// also be evaluated in memory depends on [`LikeEvaluation`].
pub(super) fn compile_like<T: Record>(compiler: &Compiler<'_>, node: &Node) -> Result<Predicate<T>> {
    let field = text_field::<T>(compiler, node)?;
    let pattern = compiler.operand(node, &field)?;

    let lambda = Lambda::new(
        T::schema().name(),
        Expr::PatternMatch {
            field: field.field_ref(),
            pattern: pattern.clone(),
        },
    );

    let case_sensitive = match compiler.options().like() {
        LikeEvaluation::EngineOnly => {
            warn!(
                field = field.path(),
                %pattern,
                "Like criteria has no in-memory evaluation; it must run in the query engine"
            );
            return Ok(Predicate::from_parts(lambda, None));
        }
        LikeEvaluation::Emulate => false,
        LikeEvaluation::EmulateCaseSensitive => true,
    };

    let eval = match &pattern {
        Value::String(pattern) => {
            let regex = like_to_regex(pattern, case_sensitive)?;
            debug!(field = field.path(), regex = regex.as_str(), "Emulating LIKE pattern");
            eval_fn(move |record: &T| match field.get(record) {
                Some(Value::String(actual)) => regex.is_match(&actual),
                _ => false,
            })
        }
        _ => eval_fn(|_: &T| false),
    };

    Ok(Predicate::from_parts(lambda, Some(eval)))
}
