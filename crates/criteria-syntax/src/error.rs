use crate::ast::operator::Operator;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyntaxError {
    #[error("Malformed criteria document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Value {0} is not a literal")]
    InvalidLiteral(String),

    #[error("Criteria on field {field:?} carries both \"rightHandSide\" and legacy \"fieldValue\"")]
    ConflictingRightHandSide { field: Option<String> },

    #[error("\"{attribute}\" is not valid on a {operator} criteria")]
    InvalidShape {
        operator: Operator,
        attribute: &'static str,
    },
}

pub type Result<T> = std::result::Result<T, SyntaxError>;
