use serde::{Deserialize, Serialize};
use std::fmt;

/// Criteria operators. The serialized form is the variant name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Operator {
    #[default]
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    IsTrue,
    IsFalse,
    Contains,
    StartsWith,
    EndsWith,
    Like,
    Any,
    And,
    Or,
    Nand,
    Nor,
    Constant,
    Add,
}

impl Operator {
    pub fn is_aggregate(&self) -> bool {
        matches!(
            self,
            Operator::And | Operator::Or | Operator::Nand | Operator::Nor
        )
    }

    /// Aggregates whose folded result is negated.
    pub fn is_negate(&self) -> bool {
        matches!(self, Operator::Nand | Operator::Nor)
    }

    /// Aggregates folded with AND.
    pub fn is_and(&self) -> bool {
        matches!(self, Operator::And | Operator::Nand)
    }

    pub fn is_method_call(&self) -> bool {
        matches!(
            self,
            Operator::Contains | Operator::StartsWith | Operator::EndsWith
        )
    }

    pub fn is_static_call(&self) -> bool {
        matches!(self, Operator::Like)
    }

    pub fn is_any(&self) -> bool {
        matches!(self, Operator::Any)
    }

    pub fn is_unary(&self) -> bool {
        matches!(self, Operator::IsTrue | Operator::IsFalse)
    }

    pub fn is_constant(&self) -> bool {
        matches!(self, Operator::Constant)
    }

    pub fn is_add(&self) -> bool {
        matches!(self, Operator::Add)
    }

    pub fn is_relational(&self) -> bool {
        matches!(
            self,
            Operator::Equal
                | Operator::NotEqual
                | Operator::LessThan
                | Operator::LessThanOrEqual
                | Operator::GreaterThan
                | Operator::GreaterThanOrEqual
        )
    }

    /// Whether the operator compares a field against a right-hand value.
    pub fn takes_field(&self) -> bool {
        self.is_relational() || self.is_method_call() || self.is_static_call() || self.is_any()
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operator::Equal => "Equal",
            Operator::NotEqual => "NotEqual",
            Operator::LessThan => "LessThan",
            Operator::LessThanOrEqual => "LessThanOrEqual",
            Operator::GreaterThan => "GreaterThan",
            Operator::GreaterThanOrEqual => "GreaterThanOrEqual",
            Operator::IsTrue => "IsTrue",
            Operator::IsFalse => "IsFalse",
            Operator::Contains => "Contains",
            Operator::StartsWith => "StartsWith",
            Operator::EndsWith => "EndsWith",
            Operator::Like => "Like",
            Operator::Any => "Any",
            Operator::And => "And",
            Operator::Or => "Or",
            Operator::Nand => "Nand",
            Operator::Nor => "Nor",
            Operator::Constant => "Constant",
            Operator::Add => "Add",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregate_classification() {
        assert!(Operator::Nand.is_aggregate());
        assert!(Operator::Nand.is_negate());
        assert!(Operator::Nand.is_and());
        assert!(Operator::Nor.is_negate());
        assert!(!Operator::Nor.is_and());
        assert!(!Operator::Add.is_aggregate());
    }

    #[test]
    fn test_call_classification() {
        assert!(Operator::StartsWith.is_method_call());
        assert!(!Operator::Like.is_method_call());
        assert!(Operator::Like.is_static_call());
        assert!(Operator::IsFalse.is_unary());
        assert!(Operator::GreaterThanOrEqual.is_relational());
        assert!(!Operator::Constant.takes_field());
    }

    #[test]
    fn test_display_matches_wire_name() {
        assert_eq!(Operator::GreaterThanOrEqual.to_string(), "GreaterThanOrEqual");
        assert_eq!(
            serde_json::to_string(&Operator::LessThanOrEqual).unwrap(),
            "\"LessThanOrEqual\""
        );
        assert_eq!(Operator::default(), Operator::Equal);
    }
}
