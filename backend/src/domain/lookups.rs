//! Store reads shared by the domain services.

use serde_json::json;

use crate::domain::ports::RecordStore;
use crate::domain::records::{
    Collection, GENERAL_INFO_KEY, candidate_from_attributes, current_weekend_from_attributes,
    event_from_attributes, events_from_records,
};
use crate::domain::{Candidate, CandidateId, Error, Event, WeekendId};

pub(crate) async fn current_weekend(records: &dyn RecordStore) -> Result<WeekendId, Error> {
    let Some(settings) = records.get(Collection::Events, GENERAL_INFO_KEY).await? else {
        return Err(Error::not_found("current weekend has not been set")
            .with_details(json!({ "code": "current_weekend_unset" })));
    };
    Ok(current_weekend_from_attributes(&settings)?)
}

pub(crate) async fn all_events(records: &dyn RecordStore) -> Result<Vec<Event>, Error> {
    let listing = records.list_all(Collection::Events).await?;
    Ok(events_from_records(listing))
}

pub(crate) async fn event(records: &dyn RecordStore, key: &str) -> Result<Event, Error> {
    if key == GENERAL_INFO_KEY {
        return Err(event_not_found(key));
    }
    let Some(map) = records.get(Collection::Events, key).await? else {
        return Err(event_not_found(key));
    };
    Ok(event_from_attributes(key, &map)?)
}

pub(crate) async fn candidate(
    records: &dyn RecordStore,
    id: &CandidateId,
) -> Result<Candidate, Error> {
    let Some(map) = records.get(Collection::Users, id.as_ref()).await? else {
        return Err(candidate_not_found(id));
    };
    Ok(candidate_from_attributes(id.as_ref(), &map)?)
}

pub(crate) fn event_not_found(key: &str) -> Error {
    Error::not_found(format!("event `{key}` not found"))
}

pub(crate) fn candidate_not_found(id: &CandidateId) -> Error {
    Error::not_found(format!("candidate `{id}` not found"))
}
