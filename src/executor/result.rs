//! Result types for query execution

use crate::store::Entity;

/// Result of plan execution
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    /// Entities in plan order
    pub entities: Vec<Entity>,
    /// Number of entities read from the store
    pub scanned_count: usize,
}

impl ExecutionResult {
    /// Creates an empty result
    pub fn empty() -> Self {
        Self {
            entities: Vec::new(),
            scanned_count: 0,
        }
    }

    /// Returns true if nothing matched
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Returns the number of results
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Returns an iterator over the entities
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    /// Consumes the result, returning the entities
    pub fn into_entities(self) -> Vec<Entity> {
        self.entities
    }
}
