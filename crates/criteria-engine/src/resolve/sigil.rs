//! `{TOKEN}` and `{path}:suffix` substitution in string literals.
//!
//! Tokens: `NOW`, `NOW:DATE`, `NOW:TIME`, or a dotted path into the
//! compile context. Suffixes: `:date` truncates to midnight, `:time` formats
//! the time of day as `HH:MM:SS.fff`, and `:null` does the same but yields
//! null for midnight. Zoned timestamps are read in the local zone by all
//! three.

use super::coercion::{parse_temporal, plain_text};
use crate::{
    compile::Compiler,
    error::{CompileError, Result},
};
use chrono::{Local, NaiveTime, TimeZone, Utc};
use lazy_static::lazy_static;
use model::core::{data_type::DataType, value::Value};
use regex::Regex;
use tracing::trace;

const TIME_OF_DAY_FORMAT: &str = "%H:%M:%S%.3f";
const ZERO_TIME_OF_DAY: &str = "00:00:00.000";

lazy_static! {
    static ref SIGIL: Regex = Regex::new(r"^\{(.*)\}(:.*)?$").expect("sigil pattern is valid");
}

pub(super) fn resolve_sigil(compiler: &Compiler<'_>, literal: Value) -> Result<Value> {
    let Value::String(text) = &literal else {
        return Ok(literal);
    };
    let Some(captures) = SIGIL.captures(text) else {
        return Ok(literal);
    };

    let token = captures.get(1).map_or("", |m| m.as_str());
    let resolved = resolve_token(compiler, token)?;
    let resolved = match captures.get(2) {
        Some(suffix) => apply_suffix(text, &suffix.as_str()[1..], resolved)?,
        None => resolved,
    };

    trace!(literal = %text, value = %resolved, "Resolved sigil");
    Ok(resolved)
}

fn resolve_token(compiler: &Compiler<'_>, token: &str) -> Result<Value> {
    let now = || compiler.options().clock().now();
    match token {
        "NOW" => Ok(Value::TimestampNaive(now())),
        "NOW:DATE" => Ok(Value::TimestampNaive(now().date().and_time(NaiveTime::MIN))),
        "NOW:TIME" => Ok(Value::Time(now().time())),
        path => match compiler.context() {
            Some(context) => context.resolve_path(path),
            None => Err(CompileError::ContextLookupFailure {
                path: path.to_string(),
                segment: path.split('.').next().unwrap_or(path).to_string(),
            }),
        },
    }
}

fn apply_suffix(literal: &str, suffix: &str, value: Value) -> Result<Value> {
    let suffix_lower = suffix.to_ascii_lowercase();
    if !matches!(suffix_lower.as_str(), "date" | "time" | "null") {
        return Err(CompileError::InvalidSigil {
            literal: literal.to_string(),
            suffix: suffix.to_string(),
        });
    }
    if value.is_null() {
        return Ok(Value::Null);
    }

    let value = match value {
        Value::String(text) => parse_temporal(&text).unwrap_or(Value::String(text)),
        other => other,
    };

    let mismatch = |value: &Value| CompileError::TypeCoercionFailure {
        value: plain_text(value),
        value_type: value.data_type(),
        field: literal.to_string(),
        field_type: DataType::TimestampNaive,
    };

    match suffix_lower.as_str() {
        "date" => match value {
            Value::TimestampNaive(ts) => Ok(Value::TimestampNaive(ts.date().and_time(NaiveTime::MIN))),
            Value::Timestamp(ts) => {
                let midnight = ts.with_timezone(&Local).date_naive().and_time(NaiveTime::MIN);
                match Local.from_local_datetime(&midnight).earliest() {
                    Some(local) => Ok(Value::Timestamp(local.with_timezone(&Utc))),
                    None => Err(mismatch(&Value::Timestamp(ts))),
                }
            }
            Value::Date(date) => Ok(Value::Date(date)),
            other => Err(mismatch(&other)),
        },
        _ => {
            let time = match &value {
                Value::TimestampNaive(ts) => ts.time(),
                Value::Timestamp(ts) => ts.with_timezone(&Local).time(),
                Value::Date(_) => NaiveTime::MIN,
                Value::Time(time) => *time,
                other => return Err(mismatch(other)),
            };
            let formatted = time.format(TIME_OF_DAY_FORMAT).to_string();
            if suffix_lower == "null" && formatted == ZERO_TIME_OF_DAY {
                Ok(Value::Null)
            } else {
                Ok(Value::String(formatted))
            }
        }
    }
}
