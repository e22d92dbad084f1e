use std::fmt;

/// A single column comparison, e.g. `address.city = 'Oslo'`.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    /// Empty for columns of the root record.
    pub table: String,
    pub column: String,
    pub comparator: String,
    pub value: String,
}

impl Condition {
    pub fn column_ref(&self) -> String {
        if self.table.is_empty() {
            self.column.clone()
        } else {
            format!("{}.{}", self.table, self.column)
        }
    }

    pub fn to_sql_fragment(&self) -> String {
        format!("{} {} {}", self.column_ref(), self.comparator, self.value)
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_sql_fragment())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fragment_qualifies_nested_columns() {
        let root = Condition {
            table: String::new(),
            column: "age".into(),
            comparator: ">".into(),
            value: "30".into(),
        };
        let nested = Condition {
            table: "address".into(),
            ..root.clone()
        };

        assert_eq!(root.to_sql_fragment(), "age > 30");
        assert_eq!(nested.to_string(), "address.age > 30");
    }
}
