//! Schedule builder.
//!
//! Turns the stored events visible to a viewer into two display-ready lists,
//! one per weekend day, each ordered by start time then display name. Events
//! that cannot be placed (unknown day, malformed times) are dropped and
//! reported as [`ScheduleWarning`]s rather than failing the whole schedule.

use serde::{Deserialize, Serialize};
use tracing::warn;
use utoipa::ToSchema;

use super::event::{Day, Event};
use super::time::{format_minutes_to_clock, parse_time_to_minutes};
use super::weekend::WeekendId;

/// Whose schedule is being built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleScope {
    /// Anonymous or administrative view of the current weekend.
    Current(WeekendId),
    /// A candidate's own weekend; the current weekend is irrelevant.
    Candidate(WeekendId),
}

impl ScheduleScope {
    /// Scope for a viewer, preferring the candidate's weekend when known.
    #[must_use]
    pub fn for_viewer(current: &WeekendId, candidate_weekend: Option<&WeekendId>) -> Self {
        match candidate_weekend {
            Some(weekend) => Self::Candidate(weekend.clone()),
            None => Self::Current(current.clone()),
        }
    }

    /// Weekend whose events are visible.
    pub fn weekend(&self) -> &WeekendId {
        match self {
            Self::Current(weekend) | Self::Candidate(weekend) => weekend,
        }
    }
}

/// One schedule row, ready for display.
///
/// Times are already in 12-hour form and are not valid sort input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledEvent {
    /// Record key, used to fetch event details.
    #[schema(example = "Check-In-2")]
    pub key: String,
    #[schema(example = "Check-In")]
    pub name: String,
    #[schema(example = "2:00 PM")]
    pub start_time: String,
    #[schema(example = "3:30 PM")]
    pub end_time: String,
    pub location: String,
    pub access: String,
}

/// Data-quality problem found while assembling a schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScheduleWarning {
    /// The event's day is neither Friday nor Saturday.
    UnknownDay { event: String, day: String },
    /// The event's start or end time could not be parsed.
    MalformedTime { event: String, message: String },
}

/// Day-partitioned schedule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    pub friday: Vec<ScheduledEvent>,
    pub saturday: Vec<ScheduledEvent>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<ScheduleWarning>,
}

/// Events visible in a scope.
///
/// Without a candidate weekend, events for `current` and for every weekend
/// are kept. With one, `current` is ignored and the candidate's weekend
/// replaces it.
///
/// # Examples
/// ```
/// use cw_backend::domain::{select_events, Event, WeekendId};
///
/// let events: Vec<Event> = Vec::new();
/// let current = WeekendId::new("2").expect("weekend");
/// assert!(select_events(events, &current, None).is_empty());
/// ```
pub fn select_events(
    events: Vec<Event>,
    current: &WeekendId,
    candidate_weekend: Option<&WeekendId>,
) -> Vec<Event> {
    filter_scope(events, &ScheduleScope::for_viewer(current, candidate_weekend))
}

fn filter_scope(events: Vec<Event>, scope: &ScheduleScope) -> Vec<Event> {
    let weekend = scope.weekend();
    events
        .into_iter()
        .filter(|event| event.identifier.weekend().includes(weekend))
        .collect()
}

struct Timed {
    start: u16,
    end: u16,
    event: Event,
}

fn timed(event: Event, warnings: &mut Vec<ScheduleWarning>) -> Option<Timed> {
    let parsed = parse_time_to_minutes(&event.start_time)
        .and_then(|start| parse_time_to_minutes(&event.end_time).map(|end| (start, end)));
    match parsed {
        Ok((start, end)) => Some(Timed { start, end, event }),
        Err(err) => {
            let key = event.key();
            warn!(event = %key, error = %err, "dropping event with malformed time");
            warnings.push(ScheduleWarning::MalformedTime {
                event: key,
                message: err.to_string(),
            });
            None
        }
    }
}

fn order_day(mut day: Vec<Timed>) -> Vec<ScheduledEvent> {
    day.sort_by(|a, b| {
        a.start
            .cmp(&b.start)
            .then_with(|| {
                a.event
                    .identifier
                    .display_name()
                    .cmp(b.event.identifier.display_name())
            })
    });
    day.into_iter()
        .map(|Timed { start, end, event }| ScheduledEvent {
            key: event.key(),
            name: event.identifier.display_name().to_owned(),
            start_time: format_minutes_to_clock(start),
            end_time: format_minutes_to_clock(end),
            location: event.location,
            access: event.access,
        })
        .collect()
}

/// Partition events by day, order each day and format times.
pub fn assemble_schedule(events: Vec<Event>) -> Schedule {
    let mut warnings = Vec::new();
    let mut friday = Vec::new();
    let mut saturday = Vec::new();

    for event in events {
        let bucket = match &event.day {
            Day::Friday => &mut friday,
            Day::Saturday => &mut saturday,
            Day::Other(day) => {
                let key = event.key();
                warn!(event = %key, day = %day, "dropping event with unknown day");
                warnings.push(ScheduleWarning::UnknownDay {
                    event: key,
                    day: day.clone(),
                });
                continue;
            }
        };
        if let Some(entry) = timed(event, &mut warnings) {
            bucket.push(entry);
        }
    }

    Schedule {
        friday: order_day(friday),
        saturday: order_day(saturday),
        warnings,
    }
}

/// Select the events visible in `scope` and assemble them into a schedule.
pub fn build_schedule(events: Vec<Event>, scope: &ScheduleScope) -> Schedule {
    assemble_schedule(filter_scope(events, scope))
}
