//! Schedule events and their identifiers.
//!
//! An event is stored under a composite key `"<display-name>-<weekend>"`,
//! followed by one `"-copy"` marker per duplication. [`EventIdentifier`] keeps
//! those parts as separate fields and composes the key on demand; the free
//! functions [`raw_name`] and [`display_name`] derive names from keys that
//! have not been parsed.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use super::links::{LinkMap, parse_links};
use super::time::{TimeFormatError, parse_time_to_minutes};
use super::weekend::{IDENTIFIER_SEPARATOR, WeekendScope};

/// Suffix appended to an identifier each time the event is duplicated.
pub const COPY_MARKER: &str = "-copy";

/// Attachment extensions accepted for upload.
pub const ALLOWED_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "gif"];

/// Name before the last separator.
///
/// Keeps any copy marker except the final one, so `"Check-In-2-copy"` yields
/// `"Check-In-2"`. Returns the input unchanged when it has no separator or
/// starts with one.
///
/// # Examples
/// ```
/// use cw_backend::domain::raw_name;
///
/// assert_eq!(raw_name("Check-In-2-copy"), "Check-In-2");
/// assert_eq!(raw_name("Lunch"), "Lunch");
/// ```
#[must_use]
pub fn raw_name(identifier: &str) -> &str {
    match (
        identifier.find(IDENTIFIER_SEPARATOR),
        identifier.rfind(IDENTIFIER_SEPARATOR),
    ) {
        (Some(first), Some(last)) if first > 0 => &identifier[..last],
        _ => identifier,
    }
}

/// Human-facing name with copy markers and the weekend tag removed.
///
/// # Examples
/// ```
/// use cw_backend::domain::display_name;
///
/// assert_eq!(display_name("Check-In-2"), "Check-In");
/// assert_eq!(display_name("Dinner-All-copy-copy"), "Dinner");
/// assert_eq!(display_name("Lunch"), "Lunch");
/// ```
#[must_use]
pub fn display_name(identifier: &str) -> &str {
    let (base, _) = strip_copy_markers(identifier);
    base.rsplit_once(IDENTIFIER_SEPARATOR)
        .map_or(base, |(name, _tag)| name)
}

fn strip_copy_markers(identifier: &str) -> (&str, u8) {
    let mut base = identifier;
    let mut copies = 0_u8;
    while let Some(stripped) = base.strip_suffix(COPY_MARKER) {
        base = stripped;
        copies = copies.saturating_add(1);
    }
    (base, copies)
}

/// Split a description into display lines.
///
/// Carriage returns and surrounding whitespace are stripped from each line;
/// blank lines are kept as paragraph breaks.
///
/// # Examples
/// ```
/// use cw_backend::domain::split_description_lines;
///
/// let lines = split_description_lines("Welcome!\r\n\r\n  Bring a jacket.  ");
/// assert_eq!(lines, vec!["Welcome!", "", "Bring a jacket."]);
/// ```
#[must_use]
pub fn split_description_lines(description: &str) -> Vec<String> {
    description
        .split('\n')
        .map(|line| line.trim_matches('\r').trim().to_owned())
        .collect()
}

/// Whether an uploaded filename has an accepted attachment extension.
///
/// # Examples
/// ```
/// use cw_backend::domain::allowed_file;
///
/// assert!(allowed_file("cat.JPG"));
/// assert!(!allowed_file("cat.abc"));
/// assert!(!allowed_file("jpg"));
/// ```
#[must_use]
pub fn allowed_file(filename: &str) -> bool {
    filename
        .rsplit_once('.')
        .is_some_and(|(_, extension)| {
            ALLOWED_EXTENSIONS
                .iter()
                .any(|allowed| extension.eq_ignore_ascii_case(allowed))
        })
}

/// Errors raised when an identifier or draft is not a valid event.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EventValidationError {
    /// The event name was empty once trimmed.
    #[error("event name must not be empty")]
    EmptyName,
    /// The event name would be read back as a duplicated event.
    #[error("event name must not end with `{COPY_MARKER}`")]
    NameEndsWithCopyMarker,
    /// A stored key did not carry a weekend tag.
    #[error("event identifier `{identifier}` has no weekend tag")]
    MissingWeekendTag {
        /// Offending identifier.
        identifier: String,
    },
    /// The weekend tag could not be parsed.
    #[error("event identifier `{identifier}` has an invalid weekend tag")]
    InvalidWeekendTag {
        /// Offending identifier.
        identifier: String,
    },
    /// The day is neither Friday nor Saturday.
    #[error("day `{day}` is not a schedule day")]
    UnknownDay {
        /// Offending day.
        day: String,
    },
    /// A start or end time is malformed.
    #[error("{field}: {source}")]
    Time {
        /// `start_time` or `end_time`.
        field: &'static str,
        /// Underlying parse failure.
        #[source]
        source: TimeFormatError,
    },
    /// The event ends before it starts.
    #[error("event ends before it starts")]
    EndsBeforeStart,
}

/// Composite event identifier.
///
/// # Examples
/// ```
/// use cw_backend::domain::{EventIdentifier, WeekendScope};
///
/// let id = EventIdentifier::parse("Check-In-2-copy").expect("valid identifier");
/// assert_eq!(id.display_name(), "Check-In");
/// assert_eq!(id.weekend().as_str(), "2");
/// assert_eq!(id.copies(), 1);
/// assert_eq!(id.to_string(), "Check-In-2-copy");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EventIdentifier {
    display_name: String,
    weekend: WeekendScope,
    copies: u8,
}

impl EventIdentifier {
    /// Build an identifier for an event that has not been duplicated.
    pub fn new(
        display_name: impl Into<String>,
        weekend: WeekendScope,
    ) -> Result<Self, EventValidationError> {
        let display_name = display_name.into().trim().to_owned();
        if display_name.is_empty() {
            return Err(EventValidationError::EmptyName);
        }
        if display_name.ends_with(COPY_MARKER) {
            return Err(EventValidationError::NameEndsWithCopyMarker);
        }
        Ok(Self {
            display_name,
            weekend,
            copies: 0,
        })
    }

    /// Parse a stored record key.
    pub fn parse(identifier: &str) -> Result<Self, EventValidationError> {
        let (base, copies) = strip_copy_markers(identifier);
        let Some((name, tag)) = base.rsplit_once(IDENTIFIER_SEPARATOR) else {
            return Err(EventValidationError::MissingWeekendTag {
                identifier: identifier.to_owned(),
            });
        };
        let weekend =
            WeekendScope::parse(tag).map_err(|_| EventValidationError::InvalidWeekendTag {
                identifier: identifier.to_owned(),
            })?;
        let mut parsed = Self::new(name, weekend)?;
        parsed.copies = copies;
        Ok(parsed)
    }

    /// Identifier of a duplicate of this event.
    #[must_use]
    pub fn duplicated(&self) -> Self {
        Self {
            copies: self.copies.saturating_add(1),
            ..self.clone()
        }
    }

    /// Human-facing event name.
    pub fn display_name(&self) -> &str {
        self.display_name.as_str()
    }

    /// Weekend the event belongs to.
    pub fn weekend(&self) -> &WeekendScope {
        &self.weekend
    }

    /// Number of duplication markers.
    pub fn copies(&self) -> u8 {
        self.copies
    }
}

impl fmt::Display for EventIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{IDENTIFIER_SEPARATOR}{}", self.display_name, self.weekend)?;
        for _ in 0..self.copies {
            f.write_str(COPY_MARKER)?;
        }
        Ok(())
    }
}

/// Day an event takes place on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Day {
    /// Friday of the weekend.
    Friday,
    /// Saturday of the weekend.
    Saturday,
    /// Any other stored value; never scheduled.
    Other(String),
}

impl Day {
    /// Stored form of the day.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Friday => "Friday",
            Self::Saturday => "Saturday",
            Self::Other(raw) => raw.as_str(),
        }
    }
}

impl From<String> for Day {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Friday" => Self::Friday,
            "Saturday" => Self::Saturday,
            _ => Self::Other(value),
        }
    }
}

impl From<Day> for String {
    fn from(value: Day) -> Self {
        match value {
            Day::Other(raw) => raw,
            known => known.as_str().to_owned(),
        }
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed event record.
///
/// Times are kept in their stored `"HH:MM[:SS]"` form; only schedule assembly
/// parses them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub identifier: EventIdentifier,
    pub start_time: String,
    pub end_time: String,
    pub day: Day,
    pub location: String,
    pub description: String,
    pub access: String,
    pub links: LinkMap,
    pub attachments: Vec<String>,
}

impl Event {
    /// Record key the event is stored under.
    pub fn key(&self) -> String {
        self.identifier.to_string()
    }

    /// Copy of this event stored under a duplicated identifier.
    #[must_use]
    pub fn duplicate(&self) -> Self {
        Self {
            identifier: self.identifier.duplicated(),
            ..self.clone()
        }
    }
}

/// Administrator input for creating or replacing an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EventDraft {
    /// Display name, without weekend tag.
    #[schema(example = "Check-In")]
    pub name: String,
    #[schema(example = "14:00")]
    pub start_time: String,
    #[schema(example = "15:30")]
    pub end_time: String,
    /// `Friday` or `Saturday`.
    #[schema(value_type = String, example = "Friday")]
    pub day: Day,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub description: String,
    /// Weekend number or `All`.
    #[schema(value_type = String, example = "2")]
    pub weekend: WeekendScope,
    #[serde(default)]
    pub access: String,
    /// Link block, one `url, label,` entry per line.
    #[serde(default)]
    pub links: String,
    /// Public URLs of previously uploaded attachments.
    #[serde(default)]
    pub attachments: Vec<String>,
}

impl EventDraft {
    /// Validate the draft and build the event it describes.
    pub fn into_event(self) -> Result<Event, EventValidationError> {
        let identifier = EventIdentifier::new(self.name, self.weekend)?;
        if let Day::Other(day) = self.day {
            return Err(EventValidationError::UnknownDay { day });
        }
        let start = parse_time_to_minutes(&self.start_time).map_err(|source| {
            EventValidationError::Time {
                field: "start_time",
                source,
            }
        })?;
        let end =
            parse_time_to_minutes(&self.end_time).map_err(|source| EventValidationError::Time {
                field: "end_time",
                source,
            })?;
        if end < start {
            return Err(EventValidationError::EndsBeforeStart);
        }

        Ok(Event {
            identifier,
            start_time: self.start_time.trim().to_owned(),
            end_time: self.end_time.trim().to_owned(),
            day: self.day,
            location: self.location,
            description: self.description,
            access: self.access,
            links: parse_links(&self.links),
            attachments: self.attachments,
        })
    }
}
