//! Conference and session records, request forms and response shapes.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::query::RawFilter;

use super::errors::{ServiceError, ServiceResult};

pub const DEFAULT_CITY: &str = "Default City";
pub const DEFAULT_TOPICS: [&str; 2] = ["Default", "Topic"];
pub const DEFAULT_HIGHLIGHTS: &str = "None set";
pub const DEFAULT_SESSION_TYPE: &str = "None set";
/// Shown when a conference has no featured speaker yet
pub const NO_FEATURED_SPEAKER: &str = "TBA";
/// Entity kind of attendee profiles, keyed by the caller's user id
pub const PROFILE_KIND: &str = "Profile";

/// Stored conference attributes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conference {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub organizer_email: Option<String>,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    /// Month of `start_date`, 0 when unknown
    #[serde(default)]
    pub month: i64,
    #[serde(default)]
    pub max_attendees: i64,
    #[serde(default)]
    pub seats_available: i64,
    /// Last resolved featured set, written by the resolver only
    #[serde(default)]
    pub featured_speakers: Vec<String>,
}

/// Stored session attributes; sessions are children of their conference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub name: String,
    #[serde(default)]
    pub highlights: String,
    #[serde(default)]
    pub speakers: Vec<String>,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub type_of_session: String,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    /// Hour of day, 0..=23
    #[serde(default)]
    pub start_time: i64,
}

/// Tee-shirt size recorded on a profile
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TeeShirtSize {
    #[default]
    NotSpecified,
    XsM,
    XsW,
    SM,
    SW,
    MM,
    MW,
    LM,
    LW,
    XlM,
    XlW,
    XxlM,
    XxlW,
    XxxlM,
    XxxlW,
}

/// Stored profile attributes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub display_name: String,
    #[serde(default)]
    pub main_email: Option<String>,
    #[serde(default)]
    pub tee_shirt_size: TeeShirtSize,
    /// Websafe keys of wished-for sessions, in the order they were added
    #[serde(default)]
    pub session_keys_wishlist: Vec<String>,
}

impl Profile {
    /// First-visit profile for `user_id`
    pub fn new(user_id: &str, main_email: Option<String>) -> Self {
        Self {
            display_name: user_id.to_string(),
            main_email: non_empty(main_email),
            tee_shirt_size: TeeShirtSize::NotSpecified,
            session_keys_wishlist: Vec::new(),
        }
    }

    /// Attributes changed by a save request
    pub fn update_attributes(form: ProfileForm) -> Map<String, Value> {
        let mut changes = Map::new();
        if let Some(name) = non_empty(form.display_name) {
            changes.insert("display_name".into(), Value::from(name));
        }
        if let Some(size) = form.tee_shirt_size {
            if let Ok(value) = serde_json::to_value(size) {
                changes.insert("tee_shirt_size".into(), value);
            }
        }
        changes
    }
}

/// Profile save request; only the display name and shirt size are editable
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileForm {
    pub display_name: Option<String>,
    pub tee_shirt_size: Option<TeeShirtSize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileResponse {
    pub user_id: String,
    #[serde(flatten)]
    pub profile: Profile,
}

/// Conference create/update request. Absent or empty fields take defaults on
/// create and are left untouched on update.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConferenceForm {
    pub name: Option<String>,
    pub description: Option<String>,
    pub organizer_email: Option<String>,
    pub topics: Option<Vec<String>>,
    pub city: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub max_attendees: Option<i64>,
}

/// Session create request
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionForm {
    pub name: Option<String>,
    pub highlights: Option<String>,
    pub speakers: Option<Vec<String>>,
    pub duration: Option<String>,
    pub type_of_session: Option<String>,
    pub date: Option<String>,
    pub start_time: Option<i64>,
}

/// Filter list submitted to the query endpoints
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryForm {
    #[serde(default)]
    pub filters: Vec<RawFilter>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConferenceResponse {
    pub websafe_key: String,
    #[serde(flatten)]
    pub conference: Conference,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionResponse {
    pub websafe_key: String,
    pub websafe_conference_key: String,
    #[serde(flatten)]
    pub session: Session,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeaturedSpeakerResponse {
    pub name: String,
    pub featured_speakers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnnouncementResponse {
    pub data: String,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

fn non_empty_list(value: Option<Vec<String>>) -> Option<Vec<String>> {
    value.filter(|list| !list.is_empty())
}

/// Parses `YYYY-MM-DD`, ignoring anything after the first ten characters
fn parse_date(field: &str, raw: &str) -> ServiceResult<NaiveDate> {
    let date_part = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").map_err(|_| {
        ServiceError::BadRequest(format!("'{}' must be a YYYY-MM-DD date, got '{}'", field, raw))
    })
}

fn parse_optional_date(field: &str, raw: Option<String>) -> ServiceResult<Option<NaiveDate>> {
    non_empty(raw).map(|s| parse_date(field, &s)).transpose()
}

fn month_of(date: Option<NaiveDate>) -> i64 {
    use chrono::Datelike;
    date.map(|d| i64::from(d.month())).unwrap_or(0)
}

impl Conference {
    /// Builds a new conference from a create request
    pub fn from_form(form: ConferenceForm) -> ServiceResult<Self> {
        let name = non_empty(form.name)
            .ok_or_else(|| ServiceError::BadRequest("Conference 'name' field required".into()))?;

        let max_attendees = form.max_attendees.unwrap_or(0);
        if max_attendees < 0 {
            return Err(ServiceError::BadRequest(
                "'max_attendees' must not be negative".into(),
            ));
        }

        let start_date = parse_optional_date("start_date", form.start_date)?;
        let end_date = parse_optional_date("end_date", form.end_date)?;

        Ok(Self {
            name,
            description: non_empty(form.description),
            organizer_email: non_empty(form.organizer_email),
            topics: non_empty_list(form.topics)
                .unwrap_or_else(|| DEFAULT_TOPICS.iter().map(|t| t.to_string()).collect()),
            city: non_empty(form.city).unwrap_or_else(|| DEFAULT_CITY.to_string()),
            start_date,
            end_date,
            month: month_of(start_date),
            max_attendees,
            seats_available: max_attendees,
            featured_speakers: Vec::new(),
        })
    }

    /// Attributes changed by an update request; `month` follows `start_date`
    pub fn update_attributes(form: ConferenceForm) -> ServiceResult<Map<String, Value>> {
        let mut changes = Map::new();

        if let Some(name) = non_empty(form.name) {
            changes.insert("name".into(), Value::from(name));
        }
        if let Some(description) = non_empty(form.description) {
            changes.insert("description".into(), Value::from(description));
        }
        if let Some(email) = non_empty(form.organizer_email) {
            changes.insert("organizer_email".into(), Value::from(email));
        }
        if let Some(topics) = non_empty_list(form.topics) {
            changes.insert("topics".into(), Value::from(topics));
        }
        if let Some(city) = non_empty(form.city) {
            changes.insert("city".into(), Value::from(city));
        }
        if let Some(start) = parse_optional_date("start_date", form.start_date)? {
            changes.insert("start_date".into(), Value::from(start.to_string()));
            changes.insert("month".into(), Value::from(month_of(Some(start))));
        }
        if let Some(end) = parse_optional_date("end_date", form.end_date)? {
            changes.insert("end_date".into(), Value::from(end.to_string()));
        }
        if let Some(max) = form.max_attendees {
            if max < 0 {
                return Err(ServiceError::BadRequest(
                    "'max_attendees' must not be negative".into(),
                ));
            }
            changes.insert("max_attendees".into(), Value::from(max));
        }

        Ok(changes)
    }
}

impl Session {
    /// Builds a new session from a create request
    pub fn from_form(form: SessionForm) -> ServiceResult<Self> {
        let name = non_empty(form.name)
            .ok_or_else(|| ServiceError::BadRequest("Session 'name' field required".into()))?;

        let start_time = form.start_time.unwrap_or(0);
        if !(0..=23).contains(&start_time) {
            return Err(ServiceError::BadRequest(
                "Session 'start_time' must be an integer from 0 to 23".into(),
            ));
        }

        let speakers = form
            .speakers
            .unwrap_or_default()
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Self {
            name,
            highlights: non_empty(form.highlights).unwrap_or_else(|| DEFAULT_HIGHLIGHTS.into()),
            speakers,
            duration: form.duration.unwrap_or_default(),
            type_of_session: non_empty(form.type_of_session)
                .unwrap_or_else(|| DEFAULT_SESSION_TYPE.into()),
            date: parse_optional_date("date", form.date)?,
            start_time,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conference_defaults() {
        let conf = Conference::from_form(ConferenceForm {
            name: Some("RustConf".into()),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(conf.city, DEFAULT_CITY);
        assert_eq!(conf.topics, vec!["Default", "Topic"]);
        assert_eq!(conf.month, 0);
        assert_eq!(conf.seats_available, 0);
        assert!(conf.featured_speakers.is_empty());
    }

    #[test]
    fn test_conference_month_and_seats() {
        let conf = Conference::from_form(ConferenceForm {
            name: Some("RustConf".into()),
            start_date: Some("2024-09-10T00:00:00".into()),
            max_attendees: Some(300),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(conf.month, 9);
        assert_eq!(conf.seats_available, 300);
    }

    #[test]
    fn test_conference_requires_name() {
        let err = Conference::from_form(ConferenceForm {
            name: Some("  ".into()),
            ..Default::default()
        })
        .unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn test_bad_date_rejected() {
        let err = Conference::from_form(ConferenceForm {
            name: Some("x".into()),
            start_date: Some("10/09/2024".into()),
            ..Default::default()
        })
        .unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn test_update_attributes_only_changed() {
        let changes = Conference::update_attributes(ConferenceForm {
            city: Some("Paris".into()),
            start_date: Some("2024-06-01".into()),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(changes.len(), 3);
        assert_eq!(changes.get("month"), Some(&Value::from(6)));
        assert_eq!(changes.get("start_date"), Some(&Value::from("2024-06-01")));
    }

    #[test]
    fn test_session_defaults() {
        let session = Session::from_form(SessionForm {
            name: Some("Intro".into()),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(session.highlights, DEFAULT_HIGHLIGHTS);
        assert_eq!(session.type_of_session, DEFAULT_SESSION_TYPE);
        assert!(session.speakers.is_empty());
        assert_eq!(session.start_time, 0);
    }

    #[test]
    fn test_session_start_time_range() {
        for bad in [-1, 24] {
            let err = Session::from_form(SessionForm {
                name: Some("Late".into()),
                start_time: Some(bad),
                ..Default::default()
            })
            .unwrap_err();
            assert_eq!(err.status_code(), 400);
        }
    }

    #[test]
    fn test_session_blank_speakers_dropped() {
        let session = Session::from_form(SessionForm {
            name: Some("Panel".into()),
            speakers: Some(vec!["Ada".into(), " ".into(), " Grace ".into()]),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(session.speakers, vec!["Ada", "Grace"]);
    }

    #[test]
    fn test_new_profile_defaults() {
        let profile = Profile::new("u-17", Some(" ".into()));
        assert_eq!(profile.display_name, "u-17");
        assert_eq!(profile.main_email, None);
        assert_eq!(profile.tee_shirt_size, TeeShirtSize::NotSpecified);

        let value = serde_json::to_value(&profile).unwrap();
        assert_eq!(value["tee_shirt_size"], "NOT_SPECIFIED");
    }

    #[test]
    fn test_profile_update_skips_blank_name() {
        let form: ProfileForm =
            serde_json::from_value(serde_json::json!({"display_name": "", "tee_shirt_size": "XL_W"}))
                .unwrap();
        let changes = Profile::update_attributes(form);

        assert_eq!(changes.len(), 1);
        assert_eq!(changes.get("tee_shirt_size"), Some(&Value::from("XL_W")));
    }

    #[test]
    fn test_session_date_serializes_as_text() {
        let session = Session::from_form(SessionForm {
            name: Some("Day one".into()),
            date: Some("2024-09-10".into()),
            ..Default::default()
        })
        .unwrap();
        let value = serde_json::to_value(&session).unwrap();
        assert_eq!(value["date"], "2024-09-10");
    }
}
