//! Entity and key types shared by the store and the executor.
//!
//! Keys form a parent chain (`Conference` → `Session`). The web-safe form is
//! the URL-safe base64 (no padding) of `Kind:id[/Kind:id]`, root first.

use std::fmt;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::errors::{StoreError, StoreResult};

/// Hierarchical entity key
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityKey {
    /// Entity kind (e.g. "Conference")
    pub kind: String,
    /// Identifier, unique within (kind, parent)
    pub id: String,
    /// Parent key, if any
    pub parent: Option<Box<EntityKey>>,
}

impl EntityKey {
    /// Creates a root key
    pub fn root(kind: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            id: id.into(),
            parent: None,
        }
    }

    /// Creates a key under the given parent
    pub fn child(parent: &EntityKey, kind: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            id: id.into(),
            parent: Some(Box::new(parent.clone())),
        }
    }

    /// Returns the parent key
    pub fn parent(&self) -> Option<&EntityKey> {
        self.parent.as_deref()
    }

    /// Returns true if `ancestor` is this key or one of its ancestors
    pub fn has_ancestor(&self, ancestor: &EntityKey) -> bool {
        let mut current = Some(self);
        while let Some(key) = current {
            if key == ancestor {
                return true;
            }
            current = key.parent();
        }
        false
    }

    /// Human-readable path, root first (`Conference:abc/Session:def`)
    pub fn path(&self) -> String {
        match self.parent() {
            Some(parent) => format!("{}/{}:{}", parent.path(), self.kind, self.id),
            None => format!("{}:{}", self.kind, self.id),
        }
    }

    /// Encodes the key for use in URLs
    pub fn to_websafe(&self) -> String {
        URL_SAFE_NO_PAD.encode(self.path().as_bytes())
    }

    /// Decodes a web-safe key
    pub fn from_websafe(websafe: &str) -> StoreResult<Self> {
        let bytes = URL_SAFE_NO_PAD
            .decode(websafe)
            .map_err(|_| StoreError::InvalidKey(websafe.to_string()))?;
        let path =
            String::from_utf8(bytes).map_err(|_| StoreError::InvalidKey(websafe.to_string()))?;

        let mut key: Option<EntityKey> = None;
        for segment in path.split('/') {
            let (kind, id) = segment
                .split_once(':')
                .filter(|(kind, id)| !kind.is_empty() && !id.is_empty())
                .ok_or_else(|| StoreError::InvalidKey(websafe.to_string()))?;

            key = Some(match key {
                Some(parent) => EntityKey::child(&parent, kind, id),
                None => EntityKey::root(kind, id),
            });
        }

        key.ok_or_else(|| StoreError::InvalidKey(websafe.to_string()))
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path())
    }
}

/// A stored entity: key plus named attributes
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub key: EntityKey,
    pub attributes: Map<String, Value>,
}

impl Entity {
    /// Creates an entity with no attributes
    pub fn new(key: EntityKey) -> Self {
        Self {
            key,
            attributes: Map::new(),
        }
    }

    /// Builds an entity from a serializable record; the record must serialize
    /// to a JSON object
    pub fn from_record<T: Serialize>(key: EntityKey, record: &T) -> StoreResult<Self> {
        match serde_json::to_value(record) {
            Ok(Value::Object(attributes)) => Ok(Self { key, attributes }),
            Ok(_) => Err(StoreError::Malformed {
                key: key.path(),
                reason: "record is not an object".into(),
            }),
            Err(e) => Err(StoreError::Malformed {
                key: key.path(),
                reason: e.to_string(),
            }),
        }
    }

    /// Decodes the attributes into a typed record
    pub fn to_record<T: for<'de> Deserialize<'de>>(&self) -> StoreResult<T> {
        serde_json::from_value(Value::Object(self.attributes.clone())).map_err(|e| {
            StoreError::Malformed {
                key: self.key.path(),
                reason: e.to_string(),
            }
        })
    }

    /// Returns an attribute value
    pub fn get(&self, attribute: &str) -> Option<&Value> {
        self.attributes.get(attribute)
    }

    /// Sets an attribute value
    pub fn set(&mut self, attribute: impl Into<String>, value: Value) {
        self.attributes.insert(attribute.into(), value);
    }

    /// Copy of this entity restricted to the given attributes
    pub fn project(&self, attributes: &[&str]) -> Self {
        let projected = attributes
            .iter()
            .filter_map(|name| {
                self.attributes
                    .get(*name)
                    .map(|value| (name.to_string(), value.clone()))
            })
            .collect();

        Self {
            key: self.key.clone(),
            attributes: projected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_websafe_round_trip_with_parent() {
        let conf = EntityKey::root("Conference", "c1");
        let session = EntityKey::child(&conf, "Session", "s1");

        let websafe = session.to_websafe();
        assert!(!websafe.contains('/'));
        assert!(!websafe.contains(':'));

        let decoded = EntityKey::from_websafe(&websafe).unwrap();
        assert_eq!(decoded, session);
        assert_eq!(decoded.parent(), Some(&conf));
    }

    #[test]
    fn test_invalid_websafe_rejected() {
        assert!(EntityKey::from_websafe("!!!").is_err());

        let no_id = URL_SAFE_NO_PAD.encode("Conference:");
        assert!(EntityKey::from_websafe(&no_id).is_err());
    }

    #[test]
    fn test_has_ancestor() {
        let conf = EntityKey::root("Conference", "c1");
        let other = EntityKey::root("Conference", "c2");
        let session = EntityKey::child(&conf, "Session", "s1");

        assert!(session.has_ancestor(&conf));
        assert!(session.has_ancestor(&session));
        assert!(!session.has_ancestor(&other));
    }

    #[test]
    fn test_projection_keeps_only_requested() {
        let mut entity = Entity::new(EntityKey::root("Session", "s1"));
        entity.set("name", json!("Intro"));
        entity.set("speakers", json!(["Ada"]));

        let projected = entity.project(&["speakers", "missing"]);
        assert_eq!(projected.attributes.len(), 1);
        assert_eq!(projected.get("speakers"), Some(&json!(["Ada"])));
    }
}
