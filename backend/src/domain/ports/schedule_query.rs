//! Driving port for the read side: schedules, event details and candidate
//! info cards.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{CandidateId, CandidateProfile, Error, LinkMap, Schedule, WeekendId};

/// Event information page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EventDetails {
    #[schema(example = "Check-In-2")]
    pub key: String,
    /// Name with the weekend tag and copy markers removed.
    #[schema(example = "Check-In")]
    pub name: String,
    /// Name before the final separator.
    #[schema(example = "Check-In")]
    pub raw_name: String,
    pub day: String,
    /// 12-hour start time, or the stored value when it cannot be parsed.
    #[schema(example = "2:00 PM")]
    pub start_time: String,
    #[schema(example = "3:30 PM")]
    pub end_time: String,
    pub location: String,
    pub access: String,
    pub description_lines: Vec<String>,
    #[schema(value_type = Object)]
    pub links: LinkMap,
    pub attachments: Vec<String>,
}

/// Read use-cases for candidates and visitors.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ScheduleQuery: Send + Sync {
    /// Weekend currently being run.
    async fn current_weekend(&self) -> Result<WeekendId, Error>;

    /// Schedule for the current weekend.
    async fn current_schedule(&self) -> Result<Schedule, Error>;

    /// Schedule for the candidate's own weekend.
    async fn candidate_schedule(&self, candidate: &CandidateId) -> Result<Schedule, Error>;

    /// Details for one event.
    async fn event_details(&self, key: &str) -> Result<EventDetails, Error>;

    /// Info card for one candidate.
    async fn candidate_profile(&self, candidate: &CandidateId) -> Result<CandidateProfile, Error>;
}
