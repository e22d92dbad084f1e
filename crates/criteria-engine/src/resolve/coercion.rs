use crate::error::{CompileError, Result};
use bigdecimal::{BigDecimal, FromPrimitive, ToPrimitive};
use chrono::{
    DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc,
};
use model::core::{data_type::DataType, duration::format_duration, value::Value};
use std::str::FromStr;
use uuid::Uuid;

const NAIVE_DATE_TIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];
const TIME_FORMATS: [&str; 2] = ["%H:%M:%S%.f", "%H:%M"];

// 2^63 and 2^64. `i64::MAX as f64` rounds up to 2^63, so the upper bounds
// are exclusive.
const I64_LIMIT: f64 = 9_223_372_036_854_775_808.0;
const U64_LIMIT: f64 = 18_446_744_073_709_551_616.0;

/// Read an ISO-8601 date or date-time string.
pub(crate) fn parse_temporal(text: &str) -> Option<Value> {
    let text = text.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Some(Value::Timestamp(ts.with_timezone(&Utc)));
    }
    if let Some(ts) = NAIVE_DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
    {
        return Some(Value::TimestampNaive(ts));
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .map(Value::Date)
}

/// Unquoted text form of a value, as used in messages and string coercion.
pub(crate) fn plain_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Duration(duration) => format_duration(duration),
        other => match other.to_json() {
            serde_json::Value::String(text) => text,
            json => json.to_string(),
        },
    }
}

/// Convert `value` to the declared type of `field`. Null converts to any type.
pub(crate) fn coerce(value: Value, target: DataType, field: &str) -> Result<Value> {
    if value.is_null() || value.data_type() == target {
        return Ok(value);
    }

    convert(&value, target).ok_or_else(|| CompileError::TypeCoercionFailure {
        value: plain_text(&value),
        value_type: value.data_type(),
        field: field.to_string(),
        field_type: target,
    })
}

fn convert(value: &Value, target: DataType) -> Option<Value> {
    match target {
        DataType::String => Some(Value::String(plain_text(value))),
        DataType::Int => to_i64(value).map(Value::Int),
        DataType::IntUnsigned => to_u64(value).map(Value::Uint),
        DataType::Float => to_f64(value).map(Value::Float),
        DataType::Decimal => to_decimal(value).map(Value::Decimal),
        DataType::Boolean => match value {
            Value::String(text) => parse_bool(text).map(Value::Boolean),
            _ => None,
        },
        DataType::Uuid => match value {
            Value::String(text) => Uuid::parse_str(text.trim()).ok().map(Value::Uuid),
            _ => None,
        },
        DataType::Duration => value.parse_duration_literal(),
        DataType::Time => match value {
            Value::String(text) => TIME_FORMATS
                .iter()
                .find_map(|format| NaiveTime::parse_from_str(text.trim(), format).ok())
                .map(Value::Time),
            _ => None,
        },
        DataType::Date | DataType::Timestamp | DataType::TimestampNaive => {
            let temporal = match value {
                Value::String(text) => parse_temporal(text)?,
                other => other.clone(),
            };
            convert_temporal(temporal, target)
        }
        DataType::Null => None,
    }
}

fn convert_temporal(value: Value, target: DataType) -> Option<Value> {
    match (value, target) {
        (value, target) if value.data_type() == target => Some(value),
        (Value::TimestampNaive(ts), DataType::Date) if ts.time() == NaiveTime::MIN => {
            Some(Value::Date(ts.date()))
        }
        (Value::TimestampNaive(ts), DataType::Timestamp) => Local
            .from_local_datetime(&ts)
            .single()
            .map(|local| Value::Timestamp(local.with_timezone(&Utc))),
        (Value::Timestamp(ts), DataType::TimestampNaive) => {
            Some(Value::TimestampNaive(ts.with_timezone(&Local).naive_local()))
        }
        (Value::Timestamp(ts), DataType::Date) => {
            let local = ts.with_timezone(&Local).naive_local();
            (local.time() == NaiveTime::MIN).then(|| Value::Date(local.date()))
        }
        (Value::Date(date), DataType::TimestampNaive) => {
            Some(Value::TimestampNaive(date.and_time(NaiveTime::MIN)))
        }
        (Value::Date(date), DataType::Timestamp) => {
            convert_temporal(Value::TimestampNaive(date.and_time(NaiveTime::MIN)), DataType::Timestamp)
        }
        _ => None,
    }
}

fn parse_bool(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

fn to_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Uint(v) => i64::try_from(*v).ok(),
        Value::Float(v) if v.fract() == 0.0 && (-I64_LIMIT..I64_LIMIT).contains(v) => Some(*v as i64),
        Value::Decimal(v) if v.is_integer() => v.to_i64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

fn to_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Int(v) => u64::try_from(*v).ok(),
        Value::Float(v) if v.fract() == 0.0 && (0.0..U64_LIMIT).contains(v) => Some(*v as u64),
        Value::Decimal(v) if v.is_integer() => v.to_u64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

fn to_f64(value: &Value) -> Option<f64> {
    match value {
        Value::String(text) => text.trim().parse().ok(),
        other => other.as_f64(),
    }
}

fn to_decimal(value: &Value) -> Option<BigDecimal> {
    match value {
        Value::Int(v) => Some(BigDecimal::from(*v)),
        Value::Uint(v) => Some(BigDecimal::from(*v)),
        Value::Float(v) if v.is_finite() => {
            BigDecimal::from_str(&v.to_string()).ok().or_else(|| BigDecimal::from_f64(*v))
        }
        Value::String(text) => BigDecimal::from_str(text.trim()).ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_null_and_same_type_pass_through() {
        assert_eq!(coerce(Value::Null, DataType::Date, "born").unwrap(), Value::Null);
        assert_eq!(coerce(Value::Int(1), DataType::Int, "n").unwrap(), Value::Int(1));
    }

    #[test]
    fn test_numeric_conversions() {
        assert_eq!(coerce(Value::Int(5), DataType::Float, "n").unwrap(), Value::Float(5.0));
        assert_eq!(coerce(Value::Float(4.0), DataType::Int, "n").unwrap(), Value::Int(4));
        assert_eq!(
            coerce(Value::Float(0.1), DataType::Decimal, "n").unwrap(),
            Value::Decimal(BigDecimal::from_str("0.1").unwrap())
        );
        assert_eq!(coerce(Value::Int(7), DataType::IntUnsigned, "n").unwrap(), Value::Uint(7));
        assert!(coerce(Value::Float(2.5), DataType::Int, "n").is_err());
        assert!(coerce(Value::Int(-1), DataType::IntUnsigned, "n").is_err());
    }

    #[test]
    fn test_float_outside_integer_range() {
        assert!(coerce(Value::Float(9.223372036854775808e18), DataType::Int, "n").is_err());
        assert!(coerce(Value::Float(-1e19), DataType::Int, "n").is_err());
        assert_eq!(
            coerce(Value::Float(-9.223372036854775808e18), DataType::Int, "n").unwrap(),
            Value::Int(i64::MIN)
        );
        assert!(coerce(Value::Float(1.8446744073709551616e19), DataType::IntUnsigned, "n").is_err());
        assert_eq!(
            coerce(Value::Float(9.223372036854775808e18), DataType::IntUnsigned, "n").unwrap(),
            Value::Uint(1 << 63)
        );
    }

    #[test]
    fn test_string_parsing() {
        assert_eq!(
            coerce(Value::from("2024-02-03"), DataType::Date, "d").unwrap(),
            Value::Date(date(2024, 2, 3))
        );
        assert_eq!(
            coerce(Value::from("2024-02-03T10:15:00"), DataType::TimestampNaive, "d").unwrap(),
            Value::TimestampNaive(date(2024, 2, 3).and_hms_opt(10, 15, 0).unwrap())
        );
        assert_eq!(
            coerce(Value::from("2024-02-03T10:15:00Z"), DataType::Timestamp, "d").unwrap(),
            Value::Timestamp(Utc.from_utc_datetime(&date(2024, 2, 3).and_hms_opt(10, 15, 0).unwrap()))
        );
        assert_eq!(
            coerce(Value::from("01:30:00"), DataType::Duration, "d").unwrap(),
            Value::Duration(TimeDelta::new(5400, 0).unwrap())
        );
        assert_eq!(
            coerce(Value::from("08:45"), DataType::Time, "t").unwrap(),
            Value::Time(NaiveTime::from_hms_opt(8, 45, 0).unwrap())
        );
        assert_eq!(coerce(Value::from("TRUE"), DataType::Boolean, "b").unwrap(), Value::Boolean(true));
        assert_eq!(coerce(Value::from("42"), DataType::Int, "n").unwrap(), Value::Int(42));
    }

    #[test]
    fn test_midnight_timestamp_to_date() {
        let midnight = Value::TimestampNaive(date(2024, 1, 1).and_time(NaiveTime::MIN));
        assert_eq!(
            coerce(midnight, DataType::Date, "d").unwrap(),
            Value::Date(date(2024, 1, 1))
        );

        let noon = Value::TimestampNaive(date(2024, 1, 1).and_hms_opt(12, 0, 0).unwrap());
        assert!(coerce(noon, DataType::Date, "d").is_err());
    }

    #[test]
    fn test_anything_to_string() {
        assert_eq!(coerce(Value::Int(5), DataType::String, "s").unwrap(), Value::from("5"));
        assert_eq!(
            coerce(Value::Date(date(2024, 1, 1)), DataType::String, "s").unwrap(),
            Value::from("2024-01-01")
        );
    }

    #[test]
    fn test_failure_message() {
        let err = coerce(Value::from("abc"), DataType::Int, "age").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Cannot convert value \"abc\" of type \"String\" to field \"age\" of type \"Int\""
        );
    }
}
