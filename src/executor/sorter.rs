//! Result sorting for query execution
//!
//! Multi-key ascending sort, deterministic and stable.

use std::cmp::Ordering;

use serde_json::Value;

use crate::store::Entity;

/// Sorts entities by the plan's order fields
pub struct EntitySorter;

impl EntitySorter {
    /// Sorts entities by `order_fields`, most significant first.
    ///
    /// Sort is stable: ties keep their store order.
    pub fn sort(entities: &mut [Entity], order_fields: &[String]) {
        entities.sort_by(|a, b| {
            order_fields
                .iter()
                .map(|field| Self::compare_values(Self::sort_key(a, field), Self::sort_key(b, field)))
                .find(|ordering| *ordering != Ordering::Equal)
                .unwrap_or(Ordering::Equal)
        });
    }

    /// Returns true if the entity has a sortable value for every field
    pub fn has_order_fields(entity: &Entity, order_fields: &[String]) -> bool {
        order_fields
            .iter()
            .all(|field| Self::sort_key(entity, field).is_some())
    }

    /// Value an entity sorts by; a list sorts by its smallest element
    fn sort_key<'a>(entity: &'a Entity, field: &str) -> Option<&'a Value> {
        match entity.get(field)? {
            Value::Null => None,
            Value::Array(items) => items
                .iter()
                .filter(|v| !v.is_null())
                .min_by(|a, b| Self::compare_values(Some(*a), Some(*b))),
            other => Some(other),
        }
    }

    /// Compares two sort keys.
    ///
    /// Orderable attributes hold integers or text (dates are stored as
    /// `YYYY-MM-DD`). A missing key sorts first and integers sort before text.
    fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
        match (a, b) {
            (Some(Value::Number(x)), Some(Value::Number(y))) => x.as_i64().cmp(&y.as_i64()),
            (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
            (Some(Value::Number(_)), Some(_)) => Ordering::Less,
            (Some(_), Some(Value::Number(_))) => Ordering::Greater,
            (a, b) => a.is_some().cmp(&b.is_some()),
        }
    }
}
