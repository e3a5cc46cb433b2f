//! Candidates' Weekend identifiers and event visibility scopes.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::event::COPY_MARKER;

/// Sentinel weekend value meaning "visible in every weekend".
pub const ALL_WEEKENDS: &str = "All";

/// Separator joining event display names to their weekend tag.
pub const IDENTIFIER_SEPARATOR: char = '-';

/// Validation errors for [`WeekendId`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WeekendValidationError {
    /// The identifier was empty once trimmed.
    #[error("weekend number must not be empty")]
    Empty,
    /// The identifier contained the event identifier separator.
    #[error("weekend number must not contain `{IDENTIFIER_SEPARATOR}`")]
    ContainsSeparator,
    /// The reserved `All` value was used where a single weekend is required.
    #[error("`{ALL_WEEKENDS}` does not name a single weekend")]
    Reserved,
    /// The identifier would read back as a copy marker at the end of an
    /// event identifier.
    #[error("weekend number must not be `{}`", copy_word())]
    CopyMarker,
}

fn copy_word() -> &'static str {
    COPY_MARKER.trim_start_matches(IDENTIFIER_SEPARATOR)
}

/// Identifier of one Candidates' Weekend (the stored `cw_number`).
///
/// ## Invariants
/// - non-empty and trimmed;
/// - never contains [`IDENTIFIER_SEPARATOR`], so it can be recovered from the
///   end of an event identifier;
/// - never equals [`ALL_WEEKENDS`];
/// - never equals the copy marker word, which would be stripped when the
///   event identifier is parsed back.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WeekendId(String);

impl WeekendId {
    /// Validate and construct a weekend identifier.
    ///
    /// # Examples
    /// ```
    /// use cw_backend::domain::WeekendId;
    ///
    /// let weekend = WeekendId::new(" 2 ").expect("valid weekend");
    /// assert_eq!(weekend.as_ref(), "2");
    /// assert!(WeekendId::new("All").is_err());
    /// ```
    pub fn new(raw: impl AsRef<str>) -> Result<Self, WeekendValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(WeekendValidationError::Empty);
        }
        if trimmed.contains(IDENTIFIER_SEPARATOR) {
            return Err(WeekendValidationError::ContainsSeparator);
        }
        if trimmed == ALL_WEEKENDS {
            return Err(WeekendValidationError::Reserved);
        }
        if trimmed == copy_word() {
            return Err(WeekendValidationError::CopyMarker);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for WeekendId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for WeekendId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<WeekendId> for String {
    fn from(value: WeekendId) -> Self {
        value.0
    }
}

impl TryFrom<String> for WeekendId {
    type Error = WeekendValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Which weekends an event belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum WeekendScope {
    /// Shown in every weekend.
    All,
    /// Shown only in the given weekend.
    Weekend(WeekendId),
}

impl WeekendScope {
    /// Parse a stored `cw_number` value.
    ///
    /// # Examples
    /// ```
    /// use cw_backend::domain::{WeekendId, WeekendScope};
    ///
    /// assert_eq!(WeekendScope::parse("All"), Ok(WeekendScope::All));
    /// let two = WeekendId::new("2").expect("valid weekend");
    /// assert_eq!(WeekendScope::parse("2"), Ok(WeekendScope::Weekend(two)));
    /// ```
    pub fn parse(raw: &str) -> Result<Self, WeekendValidationError> {
        if raw.trim() == ALL_WEEKENDS {
            return Ok(Self::All);
        }
        WeekendId::new(raw).map(Self::Weekend)
    }

    /// Whether an event with this scope is visible in `weekend`.
    #[must_use]
    pub fn includes(&self, weekend: &WeekendId) -> bool {
        match self {
            Self::All => true,
            Self::Weekend(own) => own == weekend,
        }
    }

    /// Stored form of the scope.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::All => ALL_WEEKENDS,
            Self::Weekend(id) => id.as_ref(),
        }
    }
}

impl fmt::Display for WeekendScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<WeekendScope> for String {
    fn from(value: WeekendScope) -> Self {
        value.as_str().to_owned()
    }
}

impl TryFrom<String> for WeekendScope {
    type Error = WeekendValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<WeekendId> for WeekendScope {
    fn from(value: WeekendId) -> Self {
        Self::Weekend(value)
    }
}
