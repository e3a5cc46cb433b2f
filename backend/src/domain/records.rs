//! Conversion between stored attribute maps and typed records.
//!
//! Record stores hold loosely shaped JSON objects. Everything crossing into
//! the domain goes through this module, which checks the attribute shape and
//! returns a [`SchemaError`] naming the offending record instead of letting a
//! missing key surface deep inside a use-case.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use super::Error;
use super::candidate::{Candidate, CandidateDetails, CandidateId, CandidateValidationError};
use super::event::{Day, Event, EventIdentifier, EventValidationError};
use super::links::LinkMap;
use super::weekend::{WeekendId, WeekendScope, WeekendValidationError};

/// Loosely shaped record as held by a record store.
pub type AttributeMap = Map<String, Value>;

/// Reserved key in [`Collection::Events`] holding general settings.
pub const GENERAL_INFO_KEY: &str = "General Event Info";

/// Attribute of the general settings record naming the current weekend.
pub const CURRENT_WEEKEND_ATTRIBUTE: &str = "cw_number";

/// Attribute of a candidate record holding the password hash.
pub const PASSWORD_ATTRIBUTE: &str = "password";

/// Attribute of a candidate record holding the email address.
pub const EMAIL_ATTRIBUTE: &str = "email";

/// Record collections used by the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    /// Events plus the general settings record.
    Events,
    /// Candidate accounts.
    Users,
}

impl Collection {
    /// Stored collection name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Events => "events",
            Self::Users => "users",
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored record does not have the expected shape.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    /// Attributes are missing or have the wrong type.
    #[error("record `{key}` is malformed: {message}")]
    Malformed { key: String, message: String },
    /// The record key is not a valid event identifier.
    #[error("record `{key}` has an invalid identifier: {source}")]
    Identifier {
        key: String,
        #[source]
        source: EventValidationError,
    },
    /// The weekend tag in the key disagrees with the stored weekend.
    #[error("record `{key}` is tagged for a different weekend than `{stored}`")]
    WeekendMismatch { key: String, stored: String },
    /// The stored weekend value is invalid.
    #[error("record `{key}` has an invalid weekend: {source}")]
    Weekend {
        key: String,
        #[source]
        source: WeekendValidationError,
    },
    /// The record key is not a valid candidate identifier.
    #[error("record `{key}` has an invalid candidate id: {source}")]
    CandidateId {
        key: String,
        #[source]
        source: CandidateValidationError,
    },
}

impl From<SchemaError> for Error {
    fn from(err: SchemaError) -> Self {
        Error::internal(err.to_string())
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => String::new(),
        Value::String(text) => text,
        other => other.to_string(),
    })
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredEvent {
    name: String,
    start_time: String,
    end_time: String,
    day: String,
    #[serde(default, deserialize_with = "lenient_string")]
    location: String,
    #[serde(default, deserialize_with = "lenient_string")]
    description: String,
    #[serde(deserialize_with = "lenient_string")]
    cw_number: String,
    #[serde(default, deserialize_with = "lenient_string")]
    access: String,
    #[serde(default)]
    links: Option<LinkMap>,
    #[serde(default)]
    img_files: Option<Vec<String>>,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredCandidate {
    #[serde(default, deserialize_with = "lenient_string")]
    email: String,
    #[serde(default, deserialize_with = "lenient_string")]
    password: String,
    #[serde(default, deserialize_with = "lenient_string")]
    cw_number: String,
    #[serde(flatten)]
    details: StoredCandidateDetails,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredCandidateDetails {
    #[serde(default, deserialize_with = "lenient_string")]
    name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    group_letter: String,
    #[serde(default, deserialize_with = "lenient_string")]
    interview_time: String,
    #[serde(default, deserialize_with = "lenient_string")]
    interview_location: String,
    #[serde(default, deserialize_with = "lenient_string")]
    dinner_group: String,
    #[serde(default, deserialize_with = "lenient_string")]
    group_interview_location: String,
    #[serde(default, deserialize_with = "lenient_string")]
    model_class: String,
    #[serde(default, deserialize_with = "lenient_string")]
    model_class_location: String,
    #[serde(default, deserialize_with = "lenient_string")]
    interviewers: String,
}

impl From<CandidateDetails> for StoredCandidateDetails {
    fn from(details: CandidateDetails) -> Self {
        Self {
            name: details.name,
            group_letter: details.group_letter,
            interview_time: details.interview_time,
            interview_location: details.interview_location,
            dinner_group: details.dinner_group,
            group_interview_location: details.group_interview_location,
            model_class: details.model_class,
            model_class_location: details.model_class_location,
            interviewers: details.interviewers,
        }
    }
}

impl From<StoredCandidateDetails> for CandidateDetails {
    fn from(details: StoredCandidateDetails) -> Self {
        Self {
            name: details.name,
            group_letter: details.group_letter,
            interview_time: details.interview_time,
            interview_location: details.interview_location,
            dinner_group: details.dinner_group,
            group_interview_location: details.group_interview_location,
            model_class: details.model_class,
            model_class_location: details.model_class_location,
            interviewers: details.interviewers,
        }
    }
}

fn to_map<T: Serialize>(value: &T) -> AttributeMap {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => map,
        // Stored records are plain structs of strings, maps and lists.
        _ => AttributeMap::new(),
    }
}

fn from_map<T: DeserializeOwned>(key: &str, map: &AttributeMap) -> Result<T, SchemaError> {
    serde_json::from_value(Value::Object(map.clone())).map_err(|err| SchemaError::Malformed {
        key: key.to_owned(),
        message: err.to_string(),
    })
}

/// Attribute map stored for an event.
pub fn event_to_attributes(event: &Event) -> AttributeMap {
    to_map(&StoredEvent {
        name: event.key(),
        start_time: event.start_time.clone(),
        end_time: event.end_time.clone(),
        day: event.day.as_str().to_owned(),
        location: event.location.clone(),
        description: event.description.clone(),
        cw_number: event.identifier.weekend().as_str().to_owned(),
        access: event.access.clone(),
        links: Some(event.links.clone()),
        img_files: Some(event.attachments.clone()),
    })
}

/// Typed event from the record stored under `key`.
///
/// The weekend tag carried by the key must agree with the stored
/// `cw_number`, so the composed identifier always reproduces the key.
pub fn event_from_attributes(key: &str, map: &AttributeMap) -> Result<Event, SchemaError> {
    let stored: StoredEvent = from_map(key, map)?;
    let identifier = EventIdentifier::parse(key).map_err(|source| SchemaError::Identifier {
        key: key.to_owned(),
        source,
    })?;
    let weekend = WeekendScope::parse(&stored.cw_number).map_err(|source| SchemaError::Weekend {
        key: key.to_owned(),
        source,
    })?;
    if identifier.weekend() != &weekend {
        return Err(SchemaError::WeekendMismatch {
            key: key.to_owned(),
            stored: stored.cw_number,
        });
    }

    Ok(Event {
        identifier,
        start_time: stored.start_time,
        end_time: stored.end_time,
        day: Day::from(stored.day),
        location: stored.location,
        description: stored.description,
        access: stored.access,
        links: stored.links.unwrap_or_default(),
        attachments: stored.img_files.unwrap_or_default(),
    })
}

/// All well-formed events from a collection listing.
///
/// The general settings record is never an event. Malformed records are
/// logged and skipped so one bad entry cannot hide the whole schedule.
pub fn events_from_records(records: Vec<(String, AttributeMap)>) -> Vec<Event> {
    records
        .into_iter()
        .filter(|(key, _)| key != GENERAL_INFO_KEY)
        .filter_map(|(key, map)| match event_from_attributes(&key, &map) {
            Ok(event) => Some(event),
            Err(err) => {
                warn!(record = %key, error = %err, "skipping malformed event record");
                None
            }
        })
        .collect()
}

/// Attribute map stored for a candidate, password included.
pub fn candidate_to_attributes(candidate: &Candidate) -> AttributeMap {
    to_map(&StoredCandidate {
        email: candidate.email.clone(),
        password: candidate.password_hash.clone(),
        cw_number: candidate
            .weekend
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default(),
        details: candidate.details.clone().into(),
    })
}

/// Attribute map for an administrative edit; omits the password so a merge
/// write leaves it untouched.
pub fn candidate_edit_attributes(
    email: &str,
    weekend: Option<&WeekendId>,
    details: &CandidateDetails,
) -> AttributeMap {
    let mut map = to_map(&StoredCandidateDetails::from(details.clone()));
    map.insert(EMAIL_ATTRIBUTE.to_owned(), Value::String(email.to_owned()));
    map.insert(
        CURRENT_WEEKEND_ATTRIBUTE.to_owned(),
        Value::String(weekend.map(ToString::to_string).unwrap_or_default()),
    );
    map
}

/// Typed candidate from the record stored under `key`.
pub fn candidate_from_attributes(key: &str, map: &AttributeMap) -> Result<Candidate, SchemaError> {
    let stored: StoredCandidate = from_map(key, map)?;
    let id = CandidateId::new(key).map_err(|source| SchemaError::CandidateId {
        key: key.to_owned(),
        source,
    })?;
    let weekend = optional_weekend(&stored.cw_number).map_err(|source| SchemaError::Weekend {
        key: key.to_owned(),
        source,
    })?;
    Ok(Candidate {
        id,
        email: stored.email,
        password_hash: stored.password,
        weekend,
        details: stored.details.into(),
    })
}

/// Parse a weekend value where blank means "not assigned".
pub fn optional_weekend(raw: &str) -> Result<Option<WeekendId>, WeekendValidationError> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    WeekendId::new(raw).map(Some)
}

/// Attribute map for the general settings record.
pub fn current_weekend_attributes(weekend: &WeekendId) -> AttributeMap {
    let mut map = AttributeMap::new();
    map.insert(
        CURRENT_WEEKEND_ATTRIBUTE.to_owned(),
        Value::String(weekend.to_string()),
    );
    map
}

/// Current weekend from the general settings record.
pub fn current_weekend_from_attributes(map: &AttributeMap) -> Result<WeekendId, SchemaError> {
    let raw = match map.get(CURRENT_WEEKEND_ATTRIBUTE) {
        Some(Value::String(text)) => text.clone(),
        Some(Value::Number(number)) => number.to_string(),
        _ => {
            return Err(SchemaError::Malformed {
                key: GENERAL_INFO_KEY.to_owned(),
                message: format!("missing `{CURRENT_WEEKEND_ATTRIBUTE}`"),
            });
        }
    };
    WeekendId::new(raw).map_err(|source| SchemaError::Weekend {
        key: GENERAL_INFO_KEY.to_owned(),
        source,
    })
}
