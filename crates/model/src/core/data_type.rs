use serde::{Deserialize, Serialize};
use std::fmt;

/// Declared type of a record field.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum DataType {
    Int,
    IntUnsigned,
    Float,
    Decimal,
    String,
    Boolean,
    Uuid,
    Date,
    Timestamp,
    TimestampNaive,
    Time,
    Duration,
    Null,
}

impl DataType {
    pub fn name(&self) -> &'static str {
        match self {
            DataType::Int => "Int",
            DataType::IntUnsigned => "IntUnsigned",
            DataType::Float => "Float",
            DataType::Decimal => "Decimal",
            DataType::String => "String",
            DataType::Boolean => "Boolean",
            DataType::Uuid => "Uuid",
            DataType::Date => "Date",
            DataType::Timestamp => "Timestamp",
            DataType::TimestampNaive => "TimestampNaive",
            DataType::Time => "Time",
            DataType::Duration => "Duration",
            DataType::Null => "Null",
        }
    }

    pub fn is_textual(&self) -> bool {
        matches!(self, DataType::String)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            DataType::Int | DataType::IntUnsigned | DataType::Float | DataType::Decimal
        )
    }

    pub fn is_temporal(&self) -> bool {
        matches!(
            self,
            DataType::Date
                | DataType::Timestamp
                | DataType::TimestampNaive
                | DataType::Time
                | DataType::Duration
        )
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
