//! Filter clause validation.
//!
//! Checks, in order: field token against the entity whitelist, operator
//! token, then value coercion to the field type. The first failure wins.

use chrono::NaiveDate;
use serde_json::Value;

use super::clause::{FilterClause, OperatorKind, RawFilter, Scalar};
use super::errors::{QueryError, QueryResult};
use super::fields::{EntityKind, FieldSpec, FieldType};

/// Validates raw filters for one entity kind
#[derive(Debug, Clone, Copy)]
pub struct FilterSpecValidator {
    entity: EntityKind,
}

impl FilterSpecValidator {
    pub fn new(entity: EntityKind) -> Self {
        Self { entity }
    }

    pub fn entity(&self) -> EntityKind {
        self.entity
    }

    /// Validates and normalizes one raw filter
    pub fn validate(&self, raw: &RawFilter) -> QueryResult<FilterClause> {
        let spec = self
            .entity
            .field(&raw.field)
            .ok_or_else(|| QueryError::unknown_field(&raw.field, self.entity.kind_name()))?;

        let operator = OperatorKind::from_token(&raw.operator)
            .ok_or_else(|| QueryError::unknown_operator(&raw.operator))?;

        let value = coerce(spec, &raw.value)?;

        Ok(FilterClause::new(
            spec.attribute,
            spec.field_type,
            operator,
            value,
        ))
    }
}

fn coerce(spec: &FieldSpec, value: &Value) -> QueryResult<Scalar> {
    match spec.field_type {
        FieldType::Integer => match value {
            Value::Number(n) => n.as_i64().map(Scalar::Integer),
            Value::String(s) => s.parse::<i64>().ok().map(Scalar::Integer),
            _ => None,
        }
        .ok_or_else(|| QueryError::coercion(spec.attribute, value, "an integer")),

        FieldType::Text | FieldType::TextList => match value {
            Value::String(s) => Ok(Scalar::Text(s.clone())),
            _ => Err(QueryError::coercion(spec.attribute, value, "text")),
        },

        FieldType::Date => value
            .as_str()
            .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
            .map(|date| Scalar::Text(date.format("%Y-%m-%d").to_string()))
            .ok_or_else(|| QueryError::coercion(spec.attribute, value, "a YYYY-MM-DD date")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::QueryErrorCode;
    use serde_json::json;

    fn conference() -> FilterSpecValidator {
        FilterSpecValidator::new(EntityKind::Conference)
    }

    fn session() -> FilterSpecValidator {
        FilterSpecValidator::new(EntityKind::Session)
    }

    #[test]
    fn test_valid_clause_maps_attribute() {
        let clause = conference()
            .validate(&RawFilter::new("CITY", "EQ", json!("London")))
            .unwrap();
        assert_eq!(clause.attribute, "city");
        assert_eq!(clause.operator, OperatorKind::Eq);
        assert_eq!(clause.value, Scalar::Text("London".into()));
    }

    #[test]
    fn test_unknown_field_names_token() {
        let err = session()
            .validate(&RawFilter::new("ROOM", "EQ", json!("A")))
            .unwrap_err();
        assert_eq!(err.code(), QueryErrorCode::InvalidFilter);
        assert_eq!(err.token(), Some("ROOM"));
    }

    #[test]
    fn test_unknown_operator_names_token() {
        let err = conference()
            .validate(&RawFilter::new("CITY", "CONTAINS", json!("L")))
            .unwrap_err();
        assert_eq!(err.code(), QueryErrorCode::InvalidFilter);
        assert_eq!(err.token(), Some("CONTAINS"));
    }

    #[test]
    fn test_field_checked_before_operator() {
        let err = conference()
            .validate(&RawFilter::new("VENUE", "LIKE", json!("x")))
            .unwrap_err();
        assert_eq!(err.token(), Some("VENUE"));
    }

    #[test]
    fn test_integer_coercion_from_string() {
        let clause = conference()
            .validate(&RawFilter::new("MONTH", "GT", json!("6")))
            .unwrap();
        assert_eq!(clause.value, Scalar::Integer(6));

        let clause = session()
            .validate(&RawFilter::new("START_TIME", "LT", json!(12)))
            .unwrap();
        assert_eq!(clause.value, Scalar::Integer(12));
    }

    #[test]
    fn test_integer_coercion_failure() {
        let err = conference()
            .validate(&RawFilter::new("MAX_ATTENDEES", "GT", json!("lots")))
            .unwrap_err();
        assert_eq!(err.code(), QueryErrorCode::Coercion);

        let err = conference()
            .validate(&RawFilter::new("MONTH", "EQ", json!(6.5)))
            .unwrap_err();
        assert_eq!(err.code(), QueryErrorCode::Coercion);
    }

    #[test]
    fn test_text_field_rejects_number() {
        let err = session()
            .validate(&RawFilter::new("DURATION", "EQ", json!(30)))
            .unwrap_err();
        assert_eq!(err.code(), QueryErrorCode::Coercion);
    }

    #[test]
    fn test_date_coercion() {
        let clause = session()
            .validate(&RawFilter::new("DATE", "GTEQ", json!("2026-05-01")))
            .unwrap();
        assert_eq!(clause.value, Scalar::Text("2026-05-01".into()));

        let err = session()
            .validate(&RawFilter::new("DATE", "EQ", json!("May 1st")))
            .unwrap_err();
        assert_eq!(err.code(), QueryErrorCode::Coercion);
    }
}
