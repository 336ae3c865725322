//! Clause filtering for query execution
//!
//! Filters entities strictly according to validated clauses.
//! Integers compare with integers and text with text; nothing else matches.

use std::cmp::Ordering;

use serde_json::Value;

use crate::query::{FilterClause, OperatorKind, Scalar};
use crate::store::Entity;

/// Evaluates clauses against entities
pub struct ClauseFilter;

impl ClauseFilter {
    /// Checks if an entity matches all clauses
    pub fn matches(entity: &Entity, clauses: &[FilterClause]) -> bool {
        // All clauses must match (AND semantics)
        clauses
            .iter()
            .all(|clause| Self::matches_clause(entity, clause))
    }

    /// Checks if an entity matches a single clause
    fn matches_clause(entity: &Entity, clause: &FilterClause) -> bool {
        let value = match entity.get(&clause.attribute) {
            Some(v) => v,
            None => return false, // Missing attribute = no match
        };

        match value {
            Value::Null => false,
            // Repeated attributes match if any element does
            Value::Array(items) => items
                .iter()
                .any(|item| Self::matches_value(item, clause.operator, &clause.value)),
            other => Self::matches_value(other, clause.operator, &clause.value),
        }
    }

    fn matches_value(actual: &Value, operator: OperatorKind, expected: &Scalar) -> bool {
        let ordering = match Self::compare(actual, expected) {
            Some(o) => o,
            None => return false,
        };

        match operator {
            OperatorKind::Eq => ordering == Ordering::Equal,
            OperatorKind::Ne => ordering != Ordering::Equal,
            OperatorKind::Gt => ordering == Ordering::Greater,
            OperatorKind::Gteq => ordering != Ordering::Less,
            OperatorKind::Lt => ordering == Ordering::Less,
            OperatorKind::Lteq => ordering != Ordering::Greater,
        }
    }

    /// Orders a stored value against a clause value; `None` when the types
    /// are not comparable
    fn compare(actual: &Value, expected: &Scalar) -> Option<Ordering> {
        match (actual, expected) {
            (Value::Number(n), Scalar::Integer(b)) => n.as_i64().map(|a| a.cmp(b)),
            (Value::String(a), Scalar::Text(b)) => Some(a.as_str().cmp(b.as_str())),
            _ => None,
        }
    }
}
