//! Query error types
//!
//! Error codes (all REJECT, never retried):
//! - CONF_QUERY_INVALID_FILTER: unknown field or operator token
//! - CONF_QUERY_MULTIPLE_INEQUALITY: inequality filters on two different fields
//! - CONF_QUERY_COERCION: value does not fit the field type

use std::fmt;

/// Severity levels for query errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Client request rejected
    Reject,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
        }
    }
}

/// Query error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryErrorCode {
    /// Unknown field or operator token
    InvalidFilter,
    /// Second distinct inequality field
    MultipleInequalityFields,
    /// Value cannot be coerced to the field type
    Coercion,
}

impl QueryErrorCode {
    /// Returns the stable string code
    pub fn code(&self) -> &'static str {
        match self {
            QueryErrorCode::InvalidFilter => "CONF_QUERY_INVALID_FILTER",
            QueryErrorCode::MultipleInequalityFields => "CONF_QUERY_MULTIPLE_INEQUALITY",
            QueryErrorCode::Coercion => "CONF_QUERY_COERCION",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        Severity::Reject
    }
}

impl fmt::Display for QueryErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Query error with the offending token
#[derive(Debug, Clone, PartialEq)]
pub struct QueryError {
    code: QueryErrorCode,
    message: String,
    token: Option<String>,
}

impl QueryError {
    /// Unknown field token for the target entity
    pub fn unknown_field(token: impl Into<String>, entity: &str) -> Self {
        let token = token.into();
        Self {
            code: QueryErrorCode::InvalidFilter,
            message: format!("Filter field '{}' is not valid for {}", token, entity),
            token: Some(token),
        }
    }

    /// Unknown operator token
    pub fn unknown_operator(token: impl Into<String>) -> Self {
        let token = token.into();
        Self {
            code: QueryErrorCode::InvalidFilter,
            message: format!("Filter operator '{}' is not valid", token),
            token: Some(token),
        }
    }

    /// Inequality on a second, different field
    pub fn multiple_inequality(first: &str, second: impl Into<String>) -> Self {
        let second = second.into();
        Self {
            code: QueryErrorCode::MultipleInequalityFields,
            message: format!(
                "Inequality filter is allowed on only one field: '{}' already used, got '{}'",
                first, second
            ),
            token: Some(second),
        }
    }

    /// Value does not fit the field type
    pub fn coercion(field: &str, value: &serde_json::Value, expected: &str) -> Self {
        Self {
            code: QueryErrorCode::Coercion,
            message: format!(
                "Filter value {} for '{}' is not {}",
                value, field, expected
            ),
            token: Some(field.to_string()),
        }
    }

    /// Returns the error code
    pub fn code(&self) -> QueryErrorCode {
        self.code
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the offending token, if any
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code.severity(),
            self.code.code(),
            self.message
        )
    }
}

impl std::error::Error for QueryError {}

/// Result type for query operations
pub type QueryResult<T> = Result<T, QueryError>;
