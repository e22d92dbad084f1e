use crate::schema::FieldKind;
use criteria_syntax::Operator;
use model::core::data_type::DataType;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("Field \"{field}\" does not exist on {record}")]
    UnknownField { record: &'static str, field: String },

    #[error("{operator} criteria requires a field name")]
    MissingFieldName { operator: Operator },

    #[error("Field \"{field}\" is a {actual}, expected a {expected}")]
    FieldKindMismatch {
        field: String,
        expected: FieldKind,
        actual: FieldKind,
    },

    #[error("Operator {operator} is not supported {context}")]
    UnsupportedOperator { operator: Operator, context: String },

    #[error(
        "Cannot convert value \"{value}\" of type \"{value_type}\" to field \"{field}\" of type \"{field_type}\""
    )]
    TypeCoercionFailure {
        value: String,
        value_type: DataType,
        field: String,
        field_type: DataType,
    },

    #[error("Any criteria on \"{field}\" has no inner criteria")]
    MissingInnerCriteria { field: String },

    #[error("Cannot \"not\" a compound expression with {parameters} parameters")]
    InvalidNegation { parameters: usize },

    #[error("Expected a constant operand, found {0}")]
    NonConstantOperand(Operator),

    #[error("No addition is defined between {left} and {right}")]
    UndefinedAddOperation { left: DataType, right: DataType },

    #[error("Addition of {left} and {right} overflows")]
    AddOverflow { left: String, right: String },

    #[error("Context path \"{path}\" cannot be resolved at \"{segment}\"")]
    ContextLookupFailure { path: String, segment: String },

    #[error("Unknown suffix \"{suffix}\" in \"{literal}\"")]
    InvalidSigil { literal: String, suffix: String },

    #[error("Invalid LIKE pattern \"{pattern}\": {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("Predicate `{0}` can only be evaluated by the query engine")]
    EngineDelegated(String),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LowerError {
    #[error("Cannot lower a predicate with {parameters} parameters")]
    MultiParameter { parameters: usize },

    #[error("Collection \"{field}\" has no key linking it to its owner")]
    UnlinkedCollection { field: String },
}

pub type Result<T> = std::result::Result<T, CompileError>;
