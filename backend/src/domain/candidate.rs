//! Candidates attending a weekend.
//!
//! Candidates are created by roster import and later claim their account by
//! registering a password. Their assigned weekend decides which events appear
//! on their schedule.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use super::weekend::WeekendId;

/// Validation errors for [`CandidateId`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CandidateValidationError {
    /// The identifier was empty once trimmed.
    #[error("candidate id must not be empty")]
    EmptyId,
    /// The identifier contained a path separator.
    #[error("candidate id must not contain `/`")]
    ContainsSlash,
}

/// Record key of a candidate (the roster `User ID`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CandidateId(String);

impl CandidateId {
    /// Validate and construct a candidate identifier.
    ///
    /// # Examples
    /// ```
    /// use cw_backend::domain::CandidateId;
    ///
    /// let id = CandidateId::new("jdoe").expect("valid id");
    /// assert_eq!(id.as_ref(), "jdoe");
    /// assert!(CandidateId::new("  ").is_err());
    /// ```
    pub fn new(raw: impl AsRef<str>) -> Result<Self, CandidateValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(CandidateValidationError::EmptyId);
        }
        if trimmed.contains('/') {
            return Err(CandidateValidationError::ContainsSlash);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for CandidateId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for CandidateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<CandidateId> for String {
    fn from(value: CandidateId) -> Self {
        value.0
    }
}

impl TryFrom<String> for CandidateId {
    type Error = CandidateValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Typed candidate record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub id: CandidateId,
    pub email: String,
    /// Stored password hash; empty until the candidate registers.
    pub password_hash: String,
    /// Assigned weekend; `None` when the roster left it blank.
    pub weekend: Option<WeekendId>,
    pub details: CandidateDetails,
}

impl Candidate {
    /// Whether the candidate has set a password.
    pub fn is_registered(&self) -> bool {
        !self.password_hash.is_empty()
    }
}

/// Roster attributes shown on the candidate's info card.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct CandidateDetails {
    #[schema(example = "Jordan Doe")]
    pub name: String,
    #[schema(example = "B")]
    pub group_letter: String,
    /// Stored `"HH:MM"` interview time.
    #[schema(example = "13:30")]
    pub interview_time: String,
    pub interview_location: String,
    pub dinner_group: String,
    pub group_interview_location: String,
    pub model_class: String,
    pub model_class_location: String,
    pub interviewers: String,
}

/// Candidate view returned to clients; never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CandidateProfile {
    #[schema(value_type = String, example = "jdoe")]
    pub id: CandidateId,
    #[schema(example = "jdoe@example.com")]
    pub email: String,
    #[schema(value_type = Option<String>, example = "2")]
    pub weekend: Option<WeekendId>,
    pub registered: bool,
    #[serde(flatten)]
    pub details: CandidateDetails,
}

impl From<Candidate> for CandidateProfile {
    fn from(candidate: Candidate) -> Self {
        let registered = candidate.is_registered();
        Self {
            id: candidate.id,
            email: candidate.email,
            weekend: candidate.weekend,
            registered,
            details: candidate.details,
        }
    }
}

/// Administrator edits to a candidate. The password is never touched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CandidateDraft {
    #[schema(example = "jdoe@example.com")]
    pub email: String,
    /// Weekend number; empty or absent leaves the candidate unassigned.
    #[serde(default)]
    #[schema(example = "2")]
    pub weekend: Option<String>,
    #[serde(flatten)]
    pub details: CandidateDetails,
}

/// Normalise an email address for lookup.
///
/// # Examples
/// ```
/// use cw_backend::domain::normalise_email;
///
/// assert_eq!(normalise_email(" JDoe@Example.com "), "jdoe@example.com");
/// ```
#[must_use]
pub fn normalise_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}
