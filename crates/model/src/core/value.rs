use crate::core::{
    data_type::DataType,
    duration::{format_duration, format_iso_duration, parse_duration},
};
use bigdecimal::{BigDecimal, ToPrimitive};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Utc};
use std::{cmp::Ordering, fmt};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Uint(u64),
    Float(f64),
    Decimal(BigDecimal),
    String(String),
    Boolean(bool),
    Uuid(Uuid),
    Date(NaiveDate),
    Timestamp(DateTime<Utc>),
    TimestampNaive(NaiveDateTime),
    Time(NaiveTime),
    Duration(TimeDelta),
    Null,
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::Uint(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            Value::Decimal(v) => v.to_f64(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(v) => Some(v),
            _ => None,
        }
    }

    /// Three-way comparison between values of the same family.
    /// Numeric values compare across their representations.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (Value::Uint(a), Value::Uint(b)) => Some(a.cmp(b)),
            (Value::Int(a), Value::Uint(b)) => Some(i128::from(*a).cmp(&i128::from(*b))),
            (Value::Uint(a), Value::Int(b)) => Some(i128::from(*a).cmp(&i128::from(*b))),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
            (Value::Decimal(a), Value::Decimal(b)) => Some(a.cmp(b)),
            (Value::Decimal(a), Value::Int(b)) => Some(a.cmp(&BigDecimal::from(*b))),
            (Value::Int(a), Value::Decimal(b)) => Some(BigDecimal::from(*a).cmp(b)),
            (Value::Decimal(a), Value::Uint(b)) => Some(a.cmp(&BigDecimal::from(*b))),
            (Value::Uint(a), Value::Decimal(b)) => Some(BigDecimal::from(*a).cmp(b)),
            (Value::Int(_) | Value::Uint(_) | Value::Decimal(_), Value::Float(_))
            | (Value::Float(_), Value::Int(_) | Value::Uint(_) | Value::Decimal(_)) => {
                self.as_f64()?.partial_cmp(&other.as_f64()?)
            }
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            (Value::Boolean(a), Value::Boolean(b)) => Some(a.cmp(b)),
            (Value::Uuid(a), Value::Uuid(b)) => Some(a.cmp(b)),
            (Value::Date(a), Value::Date(b)) => Some(a.cmp(b)),
            (Value::Timestamp(a), Value::Timestamp(b)) => Some(a.cmp(b)),
            (Value::TimestampNaive(a), Value::TimestampNaive(b)) => Some(a.cmp(b)),
            (Value::Time(a), Value::Time(b)) => Some(a.cmp(b)),
            (Value::Duration(a), Value::Duration(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    pub fn equal(&self, other: &Value) -> bool {
        self.compare(other) == Some(Ordering::Equal)
    }

    pub fn data_type(&self) -> DataType {
        match self {
            Value::Int(_) => DataType::Int,
            Value::Uint(_) => DataType::IntUnsigned,
            Value::Float(_) => DataType::Float,
            Value::Decimal(_) => DataType::Decimal,
            Value::String(_) => DataType::String,
            Value::Boolean(_) => DataType::Boolean,
            Value::Uuid(_) => DataType::Uuid,
            Value::Date(_) => DataType::Date,
            Value::Timestamp(_) => DataType::Timestamp,
            Value::TimestampNaive(_) => DataType::TimestampNaive,
            Value::Time(_) => DataType::Time,
            Value::Duration(_) => DataType::Duration,
            Value::Null => DataType::Null,
        }
    }

    /// Convert a JSON literal into a value. Arrays and objects are not literals.
    pub fn from_json(json: &serde_json::Value) -> Option<Value> {
        match json {
            serde_json::Value::Null => Some(Value::Null),
            serde_json::Value::Bool(b) => Some(Value::Boolean(*b)),
            serde_json::Value::Number(n) => n
                .as_i64()
                .map(Value::Int)
                .or_else(|| n.as_u64().map(Value::Uint))
                .or_else(|| n.as_f64().map(Value::Float)),
            serde_json::Value::String(s) => Some(Value::String(s.clone())),
            serde_json::Value::Array(_) | serde_json::Value::Object(_) => None,
        }
    }

    /// Convert a value into its JSON literal form.
    ///
    /// Types without a native JSON representation are written as strings:
    /// temporal values and durations as ISO-8601, decimals and uuids in
    /// their canonical text form.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Int(v) => serde_json::Value::from(*v),
            Value::Uint(v) => serde_json::Value::from(*v),
            Value::Float(v) => serde_json::Number::from_f64(*v)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Decimal(v) => serde_json::Value::String(v.to_string()),
            Value::String(v) => serde_json::Value::String(v.clone()),
            Value::Boolean(v) => serde_json::Value::Bool(*v),
            Value::Uuid(v) => serde_json::Value::String(v.to_string()),
            Value::Date(v) => serde_json::Value::String(v.format("%Y-%m-%d").to_string()),
            Value::Timestamp(v) => serde_json::Value::String(v.to_rfc3339()),
            Value::TimestampNaive(v) => {
                serde_json::Value::String(v.format("%Y-%m-%dT%H:%M:%S%.f").to_string())
            }
            Value::Time(v) => serde_json::Value::String(v.format("%H:%M:%S%.f").to_string()),
            Value::Duration(v) => serde_json::Value::String(format_iso_duration(v)),
            Value::Null => serde_json::Value::Null,
        }
    }

    /// Read a string as a duration literal, if it is one.
    pub fn parse_duration_literal(&self) -> Option<Value> {
        self.as_str().and_then(parse_duration).map(Value::Duration)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{v}"),
            Value::Uint(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Decimal(v) => write!(f, "{v}"),
            Value::String(v) => write!(f, "'{}'", v.replace('\'', "''")),
            Value::Boolean(v) => write!(f, "{v}"),
            Value::Uuid(v) => write!(f, "'{v}'"),
            Value::Date(v) => write!(f, "'{}'", v.format("%Y-%m-%d")),
            Value::Timestamp(v) => write!(f, "'{}'", v.to_rfc3339()),
            Value::TimestampNaive(v) => write!(f, "'{}'", v.format("%Y-%m-%dT%H:%M:%S%.f")),
            Value::Time(v) => write!(f, "'{}'", v.format("%H:%M:%S%.f")),
            Value::Duration(v) => write!(f, "'{}'", format_duration(v)),
            Value::Null => write!(f, "NULL"),
        }
    }
}

macro_rules! impl_from_for_value {
    ($($source:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$source> for Value {
                fn from(v: $source) -> Self {
                    Value::$variant(v.into())
                }
            }
        )*
    };
}

impl_from_for_value! {
    i64 => Int,
    i32 => Int,
    i16 => Int,
    u64 => Uint,
    u32 => Uint,
    f64 => Float,
    f32 => Float,
    BigDecimal => Decimal,
    String => String,
    &str => String,
    bool => Boolean,
    Uuid => Uuid,
    NaiveDate => Date,
    DateTime<Utc> => Timestamp,
    NaiveDateTime => TimestampNaive,
    NaiveTime => Time,
    TimeDelta => Duration,
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}
