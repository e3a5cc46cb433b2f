//! Schedule read service.
//!
//! Implements [`ScheduleQuery`] over an injected record store.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, warn};

use crate::domain::lookups;
use crate::domain::ports::{EventDetails, RecordStore, ScheduleQuery};
use crate::domain::time::convert_conventional;
use crate::domain::{
    CandidateId, CandidateProfile, Error, Schedule, ScheduleScope, WeekendId, build_schedule,
    display_name, raw_name, split_description_lines,
};

/// Display form of a stored time, or the stored value when malformed.
fn display_time(key: &str, field: &'static str, raw: &str) -> String {
    convert_conventional(raw).unwrap_or_else(|err| {
        warn!(record = %key, field, error = %err, "showing unparsed time");
        raw.to_owned()
    })
}

/// Schedule service backed by a record store.
#[derive(Clone)]
pub struct ScheduleService {
    records: Arc<dyn RecordStore>,
}

impl ScheduleService {
    /// Create a service reading from `records`.
    pub fn new(records: Arc<dyn RecordStore>) -> Self {
        Self { records }
    }

    async fn schedule_for(&self, scope: ScheduleScope) -> Result<Schedule, Error> {
        let events = lookups::all_events(self.records.as_ref()).await?;
        let schedule = build_schedule(events, &scope);
        debug!(
            weekend = %scope.weekend(),
            friday = schedule.friday.len(),
            saturday = schedule.saturday.len(),
            warnings = schedule.warnings.len(),
            "schedule assembled"
        );
        Ok(schedule)
    }
}

#[async_trait]
impl ScheduleQuery for ScheduleService {
    async fn current_weekend(&self) -> Result<WeekendId, Error> {
        lookups::current_weekend(self.records.as_ref()).await
    }

    async fn current_schedule(&self) -> Result<Schedule, Error> {
        let current = self.current_weekend().await?;
        self.schedule_for(ScheduleScope::Current(current)).await
    }

    async fn candidate_schedule(&self, candidate: &CandidateId) -> Result<Schedule, Error> {
        let candidate = lookups::candidate(self.records.as_ref(), candidate).await?;
        let Some(weekend) = candidate.weekend else {
            return Err(Error::not_found(format!(
                "candidate `{}` has no assigned weekend",
                candidate.id
            ))
            .with_details(json!({ "code": "unassigned_weekend" })));
        };
        self.schedule_for(ScheduleScope::Candidate(weekend)).await
    }

    async fn event_details(&self, key: &str) -> Result<EventDetails, Error> {
        let event = lookups::event(self.records.as_ref(), key).await?;
        Ok(EventDetails {
            key: key.to_owned(),
            name: display_name(key).to_owned(),
            raw_name: raw_name(key).to_owned(),
            day: event.day.to_string(),
            start_time: display_time(key, "start_time", &event.start_time),
            end_time: display_time(key, "end_time", &event.end_time),
            location: event.location,
            access: event.access,
            description_lines: split_description_lines(&event.description),
            links: event.links,
            attachments: event.attachments,
        })
    }

    async fn candidate_profile(&self, candidate: &CandidateId) -> Result<CandidateProfile, Error> {
        let candidate = lookups::candidate(self.records.as_ref(), candidate).await?;
        let mut profile = CandidateProfile::from(candidate);
        let key = profile.id.to_string();
        profile.details.interview_time =
            display_time(&key, "interview_time", &profile.details.interview_time);
        Ok(profile)
    }
}
