use crate::{
    error::{EvalError, Result},
    lambda::{Expr, Lambda},
    schema::Record,
};
use std::sync::Arc;

/// In-memory test of one record.
pub type EvalFn<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

pub(crate) fn eval_fn<T, F>(f: F) -> EvalFn<T>
where
    F: Fn(&T) -> bool + Send + Sync + 'static,
{
    Arc::new(f)
}

/// A compiled criteria tree for record type `T`.
///
/// The predicate carries both an introspectable [`Lambda`] and, unless the
/// criteria is delegated to the query engine, a closure that tests records
/// in memory.
pub struct Predicate<T> {
    lambda: Lambda,
    eval: Option<EvalFn<T>>,
}

impl<T> Clone for Predicate<T> {
    fn clone(&self) -> Self {
        Predicate {
            lambda: self.lambda.clone(),
            eval: self.eval.clone(),
        }
    }
}

impl<T> std::fmt::Debug for Predicate<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Predicate")
            .field("lambda", &self.lambda.to_string())
            .field("in_memory", &self.eval.is_some())
            .finish()
    }
}

impl<T: Record> Predicate<T> {
    pub fn always_true() -> Self {
        Predicate {
            lambda: Lambda::new(T::schema().name(), Expr::Constant(true)),
            eval: Some(eval_fn(|_: &T| true)),
        }
    }

    pub fn always_false() -> Self {
        Predicate {
            lambda: Lambda::new(T::schema().name(), Expr::Constant(false)),
            eval: Some(eval_fn(|_: &T| false)),
        }
    }
}

impl<T: 'static> Predicate<T> {
    /// Assemble a predicate from its parts, e.g. when a query engine
    /// rebuilds one from a lowered form.
    pub fn from_parts(lambda: Lambda, eval: Option<EvalFn<T>>) -> Self {
        Predicate { lambda, eval }
    }

    pub(crate) fn into_parts(self) -> (Lambda, Option<EvalFn<T>>) {
        (self.lambda, self.eval)
    }

    pub fn and(self, other: Predicate<T>) -> Predicate<T> {
        let eval = match (self.eval, other.eval) {
            (Some(lhs), Some(rhs)) => Some(eval_fn(move |record: &T| lhs(record) && rhs(record))),
            _ => None,
        };
        Predicate::folded(self.lambda.and(other.lambda), eval)
    }

    pub fn or(self, other: Predicate<T>) -> Predicate<T> {
        let eval = match (self.eval, other.eval) {
            (Some(lhs), Some(rhs)) => Some(eval_fn(move |record: &T| lhs(record) || rhs(record))),
            _ => None,
        };
        Predicate::folded(self.lambda.or(other.lambda), eval)
    }

    /// Logical NOT. Only single-parameter predicates can be negated.
    pub fn negate(self) -> Result<Predicate<T>> {
        let lambda = self.lambda.negate()?;
        let eval = self
            .eval
            .map(|inner| eval_fn(move |record: &T| !inner(record)));
        Ok(Predicate::folded(lambda, eval))
    }

    /// A lambda that folded to a constant evaluates in memory even when an
    /// operand was delegated.
    fn folded(lambda: Lambda, eval: Option<EvalFn<T>>) -> Predicate<T> {
        let eval = match lambda.body {
            Expr::Constant(value) => Some(eval_fn(move |_: &T| value)),
            _ => eval,
        };
        Predicate { lambda, eval }
    }

    pub fn evaluate(&self, record: &T) -> std::result::Result<bool, EvalError> {
        match &self.eval {
            Some(eval) => Ok(eval(record)),
            None => Err(EvalError::EngineDelegated(self.lambda.to_string())),
        }
    }

    /// Records that satisfy the predicate, in input order.
    pub fn filter<'r, I>(&self, records: I) -> std::result::Result<Vec<&'r T>, EvalError>
    where
        I: IntoIterator<Item = &'r T>,
    {
        let mut matched = Vec::new();
        for record in records {
            if self.evaluate(record)? {
                matched.push(record);
            }
        }
        Ok(matched)
    }

    pub fn lambda(&self) -> &Lambda {
        &self.lambda
    }

    /// Whether in-memory evaluation is available and agrees with the engine.
    pub fn is_portable(&self) -> bool {
        self.eval.is_some() && self.lambda.is_portable()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lambda::FieldRef;
    use model::core::{data_type::DataType, value::Value};

    fn constant(value: bool) -> Predicate<i64> {
        Predicate::from_parts(
            Lambda::new("Number", Expr::Constant(value)),
            Some(eval_fn(move |_: &i64| value)),
        )
    }

    fn delegated() -> Predicate<i64> {
        let pattern = Expr::PatternMatch {
            field: FieldRef {
                path: "digits".into(),
                data_type: DataType::String,
            },
            pattern: Value::from("1%"),
        };
        Predicate::from_parts(Lambda::new("Number", pattern), None)
    }

    #[test]
    fn test_delegated_operand_stays_delegated() {
        let predicate = constant(true).and(delegated());
        assert!(matches!(predicate.evaluate(&1), Err(EvalError::EngineDelegated(_))));
        assert!(!predicate.is_portable());
    }

    #[test]
    fn test_absorbing_constant_evaluates_in_memory() {
        let never = constant(false).and(delegated());
        assert_eq!(never.lambda().body, Expr::Constant(false));
        assert_eq!(never.evaluate(&1), Ok(false));
        assert!(never.is_portable());

        let always = delegated().or(constant(true));
        assert_eq!(always.evaluate(&1), Ok(true));

        let negated = delegated().or(constant(true)).negate().unwrap();
        assert_eq!(negated.evaluate(&1), Ok(false));
    }
}
