//! Per-entity filter field whitelists.
//!
//! Clients name fields by token (`CITY`, `START_TIME`); each token maps to a
//! stored attribute and a value type. Lookups are exact and case-sensitive.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Value type of a filterable attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Text,
    Integer,
    /// Repeated text attribute; equality matches any element
    TextList,
    /// ISO `YYYY-MM-DD` date stored as text
    Date,
}

/// One whitelisted field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Token accepted from clients
    pub token: &'static str,
    /// Stored attribute name
    pub attribute: &'static str,
    pub field_type: FieldType,
}

const fn field(token: &'static str, attribute: &'static str, field_type: FieldType) -> FieldSpec {
    FieldSpec {
        token,
        attribute,
        field_type,
    }
}

const CONFERENCE_FIELDS: &[FieldSpec] = &[
    field("CITY", "city", FieldType::Text),
    field("TOPIC", "topics", FieldType::TextList),
    field("MONTH", "month", FieldType::Integer),
    field("MAX_ATTENDEES", "max_attendees", FieldType::Integer),
    field("FEATURED_SPEAKERS", "featured_speakers", FieldType::TextList),
];

const SESSION_FIELDS: &[FieldSpec] = &[
    field("NAME", "name", FieldType::Text),
    field("HIGHLIGHTS", "highlights", FieldType::Text),
    field("SPEAKERS", "speakers", FieldType::TextList),
    field("DURATION", "duration", FieldType::Text),
    field("TYPEOFSESSION", "type_of_session", FieldType::Text),
    field("DATE", "date", FieldType::Date),
    field("START_TIME", "start_time", FieldType::Integer),
];

/// Queryable entity collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Conference,
    Session,
}

impl EntityKind {
    /// Kind name used in entity keys
    pub fn kind_name(&self) -> &'static str {
        match self {
            EntityKind::Conference => "Conference",
            EntityKind::Session => "Session",
        }
    }

    /// Attribute every plan sorts by last
    pub fn default_sort_field(&self) -> &'static str {
        "name"
    }

    /// Client-visible filter whitelist
    pub fn fields(&self) -> &'static [FieldSpec] {
        match self {
            EntityKind::Conference => CONFERENCE_FIELDS,
            EntityKind::Session => SESSION_FIELDS,
        }
    }

    /// Looks up a field token
    pub fn field(&self, token: &str) -> Option<&'static FieldSpec> {
        self.fields().iter().find(|f| f.token == token)
    }

    /// Parses a kind from CLI/user input
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "conference" | "Conference" => Some(EntityKind::Conference),
            "session" | "Session" => Some(EntityKind::Session),
            _ => None,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_sensitive() {
        assert!(EntityKind::Conference.field("CITY").is_some());
        assert!(EntityKind::Conference.field("city").is_none());
        assert!(EntityKind::Conference.field("City").is_none());
    }

    #[test]
    fn test_whitelists_are_disjoint_per_kind() {
        assert!(EntityKind::Conference.field("START_TIME").is_none());
        assert!(EntityKind::Session.field("CITY").is_none());
    }

    #[test]
    fn test_attribute_mapping() {
        let topic = EntityKind::Conference.field("TOPIC").unwrap();
        assert_eq!(topic.attribute, "topics");
        assert_eq!(topic.field_type, FieldType::TextList);

        let start = EntityKind::Session.field("START_TIME").unwrap();
        assert_eq!(start.attribute, "start_time");
        assert_eq!(start.field_type, FieldType::Integer);
    }
}
