//! Roster import parsing.
//!
//! Rosters are CSV exports of the admissions spreadsheet, one candidate per
//! row, identified by the column headers below. Every row becomes an
//! unregistered [`Candidate`].

use serde::Deserialize;
use thiserror::Error;

use super::candidate::{Candidate, CandidateDetails, CandidateId, normalise_email};
use super::records::optional_weekend;

/// Roster parsing failures. Row numbers count data rows from 1.
#[derive(Debug, Error)]
pub enum RosterError {
    /// The CSV could not be read or a row did not match the headers.
    #[error("roster row {row}: {source}")]
    Csv {
        row: usize,
        #[source]
        source: csv::Error,
    },
    /// A row had an unusable `User ID`.
    #[error("roster row {row}: invalid user id `{value}`")]
    InvalidId { row: usize, value: String },
    /// A row had an unusable weekend number.
    #[error("roster row {row}: invalid weekend `{value}`")]
    InvalidWeekend { row: usize, value: String },
    /// Two rows share a `User ID`.
    #[error("roster row {row}: duplicate user id `{value}`")]
    DuplicateId { row: usize, value: String },
}

impl RosterError {
    /// Data row the error refers to.
    pub fn row(&self) -> usize {
        match self {
            Self::Csv { row, .. }
            | Self::InvalidId { row, .. }
            | Self::InvalidWeekend { row, .. }
            | Self::DuplicateId { row, .. } => *row,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RosterRow {
    #[serde(rename = "User ID")]
    user_id: String,
    #[serde(rename = "Email Address")]
    email: String,
    #[serde(rename = "Name", default)]
    name: String,
    #[serde(rename = "Dinner Group", default)]
    dinner_group: String,
    #[serde(rename = "Group Letter", default)]
    group_letter: String,
    #[serde(rename = "Interview Location", default)]
    interview_location: String,
    #[serde(rename = "Individual Interview Time", default)]
    interview_time: String,
    #[serde(rename = "Group Interview Location", default)]
    group_interview_location: String,
    #[serde(rename = "Candidates' Weekend Number", default)]
    weekend: String,
    #[serde(rename = "Model Class", default)]
    model_class: String,
    #[serde(rename = "Model Class Location", default)]
    model_class_location: String,
    #[serde(rename = "Interviewers", default)]
    interviewers: String,
}

impl RosterRow {
    fn into_candidate(self, row: usize) -> Result<Candidate, RosterError> {
        let id = CandidateId::new(&self.user_id).map_err(|_| RosterError::InvalidId {
            row,
            value: self.user_id.clone(),
        })?;
        let weekend = optional_weekend(&self.weekend).map_err(|_| RosterError::InvalidWeekend {
            row,
            value: self.weekend.clone(),
        })?;
        Ok(Candidate {
            id,
            email: normalise_email(&self.email),
            password_hash: String::new(),
            weekend,
            details: CandidateDetails {
                name: self.name,
                group_letter: self.group_letter,
                interview_time: self.interview_time,
                interview_location: self.interview_location,
                dinner_group: self.dinner_group,
                group_interview_location: self.group_interview_location,
                model_class: self.model_class,
                model_class_location: self.model_class_location,
                interviewers: self.interviewers,
            },
        })
    }
}

/// Parse a CSV roster into candidates, in file order.
///
/// # Examples
/// ```
/// use cw_backend::domain::parse_roster;
///
/// let csv = "User ID,Email Address,Candidates' Weekend Number\njdoe,JDoe@Example.com,2\n";
/// let candidates = parse_roster(csv.as_bytes()).expect("valid roster");
/// assert_eq!(candidates[0].email, "jdoe@example.com");
/// ```
pub fn parse_roster(input: &[u8]) -> Result<Vec<Candidate>, RosterError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    let mut candidates: Vec<Candidate> = Vec::new();
    for (index, result) in reader.deserialize::<RosterRow>().enumerate() {
        let row = index + 1;
        let parsed = result.map_err(|source| RosterError::Csv { row, source })?;
        let candidate = parsed.into_candidate(row)?;
        if candidates.iter().any(|existing| existing.id == candidate.id) {
            return Err(RosterError::DuplicateId {
                row,
                value: candidate.id.to_string(),
            });
        }
        candidates.push(candidate);
    }
    Ok(candidates)
}
