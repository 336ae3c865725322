//! Entity store contract and the in-memory engine.
//!
//! The store supports keyed reads and writes, ancestor-scoped iteration,
//! projection reads and an atomic read-modify-write (`update`). Filtering and
//! ordering live in the executor.

use std::collections::BTreeMap;
use std::sync::RwLock;

use uuid::Uuid;

use super::entity::{Entity, EntityKey};
use super::errors::{StoreError, StoreResult};

/// Persistent entity store with key/ancestor semantics
pub trait EntityStore: Send + Sync {
    /// Reads one entity
    fn get(&self, key: &EntityKey) -> StoreResult<Option<Entity>>;

    /// Inserts or replaces an entity
    fn put(&self, entity: Entity) -> StoreResult<()>;

    /// Inserts an entity only if its key is free; returns whether it was
    /// stored
    fn insert_if_absent(&self, entity: Entity) -> StoreResult<bool>;

    /// Iterates every entity of `kind`, optionally restricted to descendants
    /// of `ancestor`. Order is stable across calls.
    fn scan(&self, kind: &str, ancestor: Option<&EntityKey>) -> StoreResult<Vec<Entity>>;

    /// Applies `mutate` to the stored entity atomically.
    ///
    /// Returns `StoreError::NotFound` if the entity does not exist.
    fn update(&self, key: &EntityKey, mutate: &mut dyn FnMut(&mut Entity)) -> StoreResult<()>;

    /// Allocates a fresh key of `kind` under `parent`
    fn allocate_key(&self, kind: &str, parent: Option<&EntityKey>) -> EntityKey {
        let id = Uuid::new_v4().simple().to_string();
        match parent {
            Some(parent) => EntityKey::child(parent, kind, id),
            None => EntityKey::root(kind, id),
        }
    }

    /// Scan returning only the listed attributes
    fn scan_projection(
        &self,
        kind: &str,
        ancestor: Option<&EntityKey>,
        attributes: &[&str],
    ) -> StoreResult<Vec<Entity>> {
        Ok(self
            .scan(kind, ancestor)?
            .iter()
            .map(|entity| entity.project(attributes))
            .collect())
    }
}

/// In-memory entity store.
///
/// Entities are kept in a map ordered by key path, so scans iterate in a
/// deterministic order. All writes take the write lock.
#[derive(Debug, Default)]
pub struct MemoryEntityStore {
    entities: RwLock<BTreeMap<String, Entity>>,
}

impl MemoryEntityStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entities
    pub fn len(&self) -> usize {
        self.entities.read().map(|e| e.len()).unwrap_or(0)
    }

    /// Returns true if nothing is stored
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EntityStore for MemoryEntityStore {
    fn get(&self, key: &EntityKey) -> StoreResult<Option<Entity>> {
        let entities = self.entities.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(entities.get(&key.path()).cloned())
    }

    fn put(&self, entity: Entity) -> StoreResult<()> {
        let mut entities = self.entities.write().map_err(|_| StoreError::LockPoisoned)?;
        entities.insert(entity.key.path(), entity);
        Ok(())
    }

    fn insert_if_absent(&self, entity: Entity) -> StoreResult<bool> {
        let mut entities = self.entities.write().map_err(|_| StoreError::LockPoisoned)?;
        let path = entity.key.path();
        if entities.contains_key(&path) {
            return Ok(false);
        }
        entities.insert(path, entity);
        Ok(true)
    }

    fn scan(&self, kind: &str, ancestor: Option<&EntityKey>) -> StoreResult<Vec<Entity>> {
        let entities = self.entities.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(entities
            .values()
            .filter(|entity| entity.key.kind == kind)
            .filter(|entity| ancestor.map_or(true, |a| entity.key.has_ancestor(a)))
            .cloned()
            .collect())
    }

    fn update(&self, key: &EntityKey, mutate: &mut dyn FnMut(&mut Entity)) -> StoreResult<()> {
        let mut entities = self.entities.write().map_err(|_| StoreError::LockPoisoned)?;
        let entity = entities
            .get_mut(&key.path())
            .ok_or_else(|| StoreError::NotFound(key.path()))?;
        mutate(entity);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn session(conf: &EntityKey, id: &str, name: &str) -> Entity {
        let mut entity = Entity::new(EntityKey::child(conf, "Session", id));
        entity.set("name", json!(name));
        entity
    }

    #[test]
    fn test_insert_if_absent_keeps_existing() {
        let store = MemoryEntityStore::new();
        let key = EntityKey::root("Profile", "u1");
        let mut first = Entity::new(key.clone());
        first.set("display_name", json!("Ada"));

        assert!(store.insert_if_absent(first).unwrap());
        assert!(!store.insert_if_absent(Entity::new(key.clone())).unwrap());
        assert_eq!(
            store.get(&key).unwrap().unwrap().get("display_name"),
            Some(&json!("Ada"))
        );
    }

    #[test]
    fn test_put_get() {
        let store = MemoryEntityStore::new();
        let key = EntityKey::root("Conference", "c1");
        store.put(Entity::new(key.clone())).unwrap();

        assert!(store.get(&key).unwrap().is_some());
        assert!(store
            .get(&EntityKey::root("Conference", "c2"))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_ancestor_scoped_scan() {
        let store = MemoryEntityStore::new();
        let c1 = EntityKey::root("Conference", "c1");
        let c2 = EntityKey::root("Conference", "c2");
        store.put(Entity::new(c1.clone())).unwrap();
        store.put(session(&c1, "s1", "a")).unwrap();
        store.put(session(&c1, "s2", "b")).unwrap();
        store.put(session(&c2, "s3", "c")).unwrap();

        assert_eq!(store.scan("Session", None).unwrap().len(), 3);
        assert_eq!(store.scan("Session", Some(&c1)).unwrap().len(), 2);
        assert_eq!(store.scan("Conference", None).unwrap().len(), 1);
    }

    #[test]
    fn test_update_missing_is_not_found() {
        let store = MemoryEntityStore::new();
        let key = EntityKey::root("Conference", "nope");
        let result = store.update(&key, &mut |_| {});
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[test]
    fn test_update_applies_mutation() {
        let store = MemoryEntityStore::new();
        let key = EntityKey::root("Conference", "c1");
        store.put(Entity::new(key.clone())).unwrap();

        store
            .update(&key, &mut |e| e.set("featured_speakers", json!(["Ada"])))
            .unwrap();

        let stored = store.get(&key).unwrap().unwrap();
        assert_eq!(stored.get("featured_speakers"), Some(&json!(["Ada"])));
    }

    #[test]
    fn test_allocated_keys_are_unique() {
        let store = MemoryEntityStore::new();
        let conf = store.allocate_key("Conference", None);
        let a = store.allocate_key("Session", Some(&conf));
        let b = store.allocate_key("Session", Some(&conf));
        assert_ne!(a, b);
        assert_eq!(a.parent(), Some(&conf));
    }
}
