//! Filter clause structures
//!
//! `RawFilter` is what a client submits; `FilterClause` is the validated,
//! typed form a plan carries.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::fields::FieldType;

/// Relational operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum OperatorKind {
    /// Equality: field = value
    Eq,
    /// Greater than: field > value
    Gt,
    /// Greater than or equal: field >= value
    Gteq,
    /// Less than: field < value
    Lt,
    /// Less than or equal: field <= value
    Lteq,
    /// Not equal: field != value
    Ne,
}

impl OperatorKind {
    /// Parses a client operator token (exact match)
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "EQ" => Some(OperatorKind::Eq),
            "GT" => Some(OperatorKind::Gt),
            "GTEQ" => Some(OperatorKind::Gteq),
            "LT" => Some(OperatorKind::Lt),
            "LTEQ" => Some(OperatorKind::Lteq),
            "NE" => Some(OperatorKind::Ne),
            _ => None,
        }
    }

    /// Relational symbol handed to the store
    pub fn symbol(&self) -> &'static str {
        match self {
            OperatorKind::Eq => "=",
            OperatorKind::Gt => ">",
            OperatorKind::Gteq => ">=",
            OperatorKind::Lt => "<",
            OperatorKind::Lteq => "<=",
            OperatorKind::Ne => "!=",
        }
    }

    /// Every operator except `EQ` is an inequality
    pub fn is_equality(&self) -> bool {
        matches!(self, OperatorKind::Eq)
    }
}

/// Typed filter value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    Text(String),
    Integer(i64),
}

impl Scalar {
    /// JSON form, comparable with stored attributes
    pub fn to_json(&self) -> Value {
        match self {
            Scalar::Text(s) => Value::String(s.clone()),
            Scalar::Integer(n) => Value::from(*n),
        }
    }
}

/// A filter as submitted by a client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawFilter {
    pub field: String,
    pub operator: String,
    pub value: Value,
}

impl RawFilter {
    pub fn new(field: impl Into<String>, operator: impl Into<String>, value: Value) -> Self {
        Self {
            field: field.into(),
            operator: operator.into(),
            value,
        }
    }
}

/// A validated filter clause
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterClause {
    /// Stored attribute name
    pub attribute: String,
    pub field_type: FieldType,
    pub operator: OperatorKind,
    pub value: Scalar,
}

impl FilterClause {
    pub fn new(
        attribute: impl Into<String>,
        field_type: FieldType,
        operator: OperatorKind,
        value: Scalar,
    ) -> Self {
        Self {
            attribute: attribute.into(),
            field_type,
            operator,
            value,
        }
    }

    /// Text equality clause
    pub fn text_eq(attribute: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(
            attribute,
            FieldType::Text,
            OperatorKind::Eq,
            Scalar::Text(value.into()),
        )
    }

    /// List membership clause (equality on a repeated attribute)
    pub fn contains(attribute: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(
            attribute,
            FieldType::TextList,
            OperatorKind::Eq,
            Scalar::Text(value.into()),
        )
    }

    /// Integer comparison clause
    pub fn integer(attribute: impl Into<String>, operator: OperatorKind, value: i64) -> Self {
        Self::new(
            attribute,
            FieldType::Integer,
            operator,
            Scalar::Integer(value),
        )
    }

    /// Returns true if this clause uses a non-equality operator
    pub fn is_inequality(&self) -> bool {
        !self.operator.is_equality()
    }

    /// Explain rendering: `attribute >= 18`
    pub fn describe(&self) -> String {
        format!(
            "{} {} {}",
            self.attribute,
            self.operator.symbol(),
            self.value.to_json()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_tokens() {
        assert_eq!(OperatorKind::from_token("GTEQ"), Some(OperatorKind::Gteq));
        assert_eq!(OperatorKind::from_token("NE"), Some(OperatorKind::Ne));
        assert_eq!(OperatorKind::from_token("eq"), None);
        assert_eq!(OperatorKind::from_token("LIKE"), None);
    }

    #[test]
    fn test_only_eq_is_equality() {
        assert!(OperatorKind::Eq.is_equality());
        for op in [
            OperatorKind::Gt,
            OperatorKind::Gteq,
            OperatorKind::Lt,
            OperatorKind::Lteq,
            OperatorKind::Ne,
        ] {
            assert!(!op.is_equality());
        }
    }

    #[test]
    fn test_describe() {
        let clause = FilterClause::integer("start_time", OperatorKind::Gteq, 18);
        assert_eq!(clause.describe(), "start_time >= 18");

        let clause = FilterClause::text_eq("city", "Paris");
        assert_eq!(clause.describe(), "city = \"Paris\"");
    }
}
