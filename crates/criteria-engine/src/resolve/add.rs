use super::{coercion::parse_temporal, value::constant};
use crate::{
    compile::Compiler,
    error::{CompileError, Result},
};
use bigdecimal::{BigDecimal, FromPrimitive};
use chrono::{NaiveDate, NaiveTime, TimeDelta};
use criteria_syntax::Node;
use model::core::{duration::parse_duration, value::Value};
use std::str::FromStr;
use tracing::trace;

const TIME_OF_DAY: &str = "%H:%M:%S%.f";

/// Fold the operands of an `Add` node left to right.
pub(super) fn evaluate_add(compiler: &Compiler<'_>, node: &Node) -> Result<Value> {
    let mut total: Option<Value> = None;
    for operand in node.aggregate_list() {
        let value = read_operand(constant(compiler, operand)?, total.as_ref());
        total = Some(match total {
            None => value,
            Some(left) => AddEvaluator::new(&left, &value).evaluate()?,
        });
    }
    let total = total.unwrap_or(Value::Null);
    trace!(operands = node.aggregate_list().len(), %total, "Evaluated Add");
    Ok(total)
}

/// Strings carry the decimals, temporal values and durations that JSON
/// cannot represent natively. What a string holds depends on what it is
/// added to.
fn read_operand(value: Value, total: Option<&Value>) -> Value {
    let text = match value {
        Value::String(text) => text,
        other => return other,
    };
    let read = match total {
        Some(Value::Int(_) | Value::Uint(_) | Value::Float(_) | Value::Decimal(_)) => {
            read_decimal(&text)
        }
        Some(
            Value::Date(_)
            | Value::Timestamp(_)
            | Value::TimestampNaive(_)
            | Value::Time(_)
            | Value::Duration(_),
        ) => parse_duration(&text).map(Value::Duration),
        _ => None,
    };
    read.or_else(|| read_first_operand(&text))
        .unwrap_or(Value::String(text))
}

/// A leading operand has nothing to be read against, so unambiguous forms
/// win: ISO and day-prefixed durations, then dates, times of day and
/// numbers, and finally any other duration literal.
fn read_first_operand(text: &str) -> Option<Value> {
    let text = text.trim();
    if is_unambiguous_duration(text) {
        return parse_duration(text).map(Value::Duration);
    }
    parse_temporal(text)
        .or_else(|| {
            NaiveTime::parse_from_str(text, TIME_OF_DAY)
                .ok()
                .map(Value::Time)
        })
        .or_else(|| read_decimal(text))
        .or_else(|| parse_duration(text).map(Value::Duration))
}

fn is_unambiguous_duration(text: &str) -> bool {
    let body = text.strip_prefix('-').unwrap_or(text);
    if body.starts_with(['P', 'p']) {
        return true;
    }
    match (body.find('.'), body.find(':')) {
        (Some(dot), Some(colon)) => dot < colon,
        _ => false,
    }
}

fn read_decimal(text: &str) -> Option<Value> {
    BigDecimal::from_str(text.trim()).ok().map(Value::Decimal)
}

/// Addition between two resolved operands.
pub(crate) struct AddEvaluator<'a> {
    left: &'a Value,
    right: &'a Value,
}

impl<'a> AddEvaluator<'a> {
    pub fn new(left: &'a Value, right: &'a Value) -> Self {
        Self { left, right }
    }

    pub fn evaluate(&self) -> Result<Value> {
        use Value::*;

        match (self.left, self.right) {
            (Null, _) | (_, Null) => Ok(Null),
            (Int(l), Int(r)) => l.checked_add(*r).map(Int).ok_or_else(|| self.overflow()),
            (Uint(l), Uint(r)) => l.checked_add(*r).map(Uint).ok_or_else(|| self.overflow()),
            (Int(_), Uint(_)) | (Uint(_), Int(_)) => self.eval_mixed_int(),
            (Float(l), Float(r)) => Ok(Float(l + r)),
            (Int(_) | Uint(_), Float(_)) | (Float(_), Int(_) | Uint(_)) => self.eval_float(),
            (Decimal(_), Int(_) | Uint(_) | Float(_) | Decimal(_))
            | (Int(_) | Uint(_) | Float(_), Decimal(_)) => self.eval_decimal(),
            (TimestampNaive(l), Duration(r)) => l
                .checked_add_signed(*r)
                .map(TimestampNaive)
                .ok_or_else(|| self.overflow()),
            (Timestamp(l), Duration(r)) => l
                .checked_add_signed(*r)
                .map(Timestamp)
                .ok_or_else(|| self.overflow()),
            (Date(l), Duration(r)) => self.eval_date(*l, *r),
            (Time(l), Duration(r)) => Ok(Time(l.overflowing_add_signed(*r).0)),
            (Duration(l), Duration(r)) => l.checked_add(r).map(Duration).ok_or_else(|| self.overflow()),
            _ => Err(CompileError::UndefinedAddOperation {
                left: self.left.data_type(),
                right: self.right.data_type(),
            }),
        }
    }

    fn eval_mixed_int(&self) -> Result<Value> {
        let as_i128 = |v: &Value| match v {
            Value::Int(i) => i128::from(*i),
            Value::Uint(u) => i128::from(*u),
            _ => 0,
        };
        let sum = as_i128(self.left) + as_i128(self.right);
        if let Ok(value) = i64::try_from(sum) {
            Ok(Value::Int(value))
        } else if let Ok(value) = u64::try_from(sum) {
            Ok(Value::Uint(value))
        } else {
            Err(self.overflow())
        }
    }

    fn eval_float(&self) -> Result<Value> {
        match (self.left.as_f64(), self.right.as_f64()) {
            (Some(l), Some(r)) => Ok(Value::Float(l + r)),
            _ => Err(self.undefined()),
        }
    }

    fn eval_decimal(&self) -> Result<Value> {
        match (self.as_decimal(self.left), self.as_decimal(self.right)) {
            (Some(l), Some(r)) => Ok(Value::Decimal(l + r)),
            _ => Err(self.undefined()),
        }
    }

    /// Whole days keep the result a date; anything finer becomes a timestamp.
    fn eval_date(&self, date: NaiveDate, duration: TimeDelta) -> Result<Value> {
        let ts = date
            .and_time(NaiveTime::MIN)
            .checked_add_signed(duration)
            .ok_or_else(|| self.overflow())?;
        if ts.time() == NaiveTime::MIN {
            Ok(Value::Date(ts.date()))
        } else {
            Ok(Value::TimestampNaive(ts))
        }
    }

    fn as_decimal(&self, v: &Value) -> Option<BigDecimal> {
        match v {
            Value::Int(i) => Some(BigDecimal::from(*i)),
            Value::Uint(u) => Some(BigDecimal::from(*u)),
            Value::Float(f) => BigDecimal::from_f64(*f),
            Value::Decimal(d) => Some(d.clone()),
            _ => None,
        }
    }

    fn overflow(&self) -> CompileError {
        CompileError::AddOverflow {
            left: self.left.to_string(),
            right: self.right.to_string(),
        }
    }

    fn undefined(&self) -> CompileError {
        CompileError::UndefinedAddOperation {
            left: self.left.data_type(),
            right: self.right.data_type(),
        }
    }
}
