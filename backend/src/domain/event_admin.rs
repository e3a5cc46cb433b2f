//! Event administration service.
//!
//! Implements [`EventAdminCommand`]: event CRUD, duplication, attachment
//! upload and the current-weekend setting. Writes replace whole records and
//! are last-write-wins.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::{error, info, warn};

use crate::domain::lookups;
use crate::domain::ports::{
    EventAdminCommand, EventView, ObjectStore, RecordStore, UploadedAttachment, WriteMode,
};
use crate::domain::records::{
    Collection, GENERAL_INFO_KEY, current_weekend_attributes, event_to_attributes,
};
use crate::domain::{
    Error, Event, EventDraft, EventValidationError, WeekendId, allowed_file, format_links_block,
    raw_name,
};

/// Upper bound on `-copy` markers probed when duplicating.
const MAX_COPY_ATTEMPTS: usize = 16;

fn map_validation_error(err: EventValidationError) -> Error {
    let (code, field) = match &err {
        EventValidationError::EmptyName => ("empty_name", "name"),
        EventValidationError::NameEndsWithCopyMarker => ("reserved_suffix", "name"),
        EventValidationError::MissingWeekendTag { .. }
        | EventValidationError::InvalidWeekendTag { .. } => ("invalid_identifier", "name"),
        EventValidationError::UnknownDay { .. } => ("unknown_day", "day"),
        EventValidationError::Time { field, .. } => ("invalid_time", *field),
        EventValidationError::EndsBeforeStart => ("ends_before_start", "end_time"),
    };
    Error::invalid_request(err.to_string()).with_details(json!({ "field": field, "code": code }))
}

fn view(event: Event) -> EventView {
    let key = event.key();
    EventView {
        name: event.identifier.display_name().to_owned(),
        raw_name: raw_name(&key).to_owned(),
        weekend: event.identifier.weekend().to_string(),
        day: event.day.to_string(),
        start_time: event.start_time,
        end_time: event.end_time,
        location: event.location,
        description: event.description,
        access: event.access,
        links_text: format_links_block(&event.links),
        links: event.links,
        attachments: event.attachments,
        key,
    }
}

/// Event administration backed by record and object stores.
#[derive(Clone)]
pub struct EventAdminService {
    records: Arc<dyn RecordStore>,
    objects: Arc<dyn ObjectStore>,
}

impl EventAdminService {
    /// Create a service over the given stores.
    pub fn new(records: Arc<dyn RecordStore>, objects: Arc<dyn ObjectStore>) -> Self {
        Self { records, objects }
    }

    async fn exists(&self, key: &str) -> Result<bool, Error> {
        Ok(self.records.get(Collection::Events, key).await?.is_some())
    }

    async fn write(&self, event: &Event) -> Result<(), Error> {
        self.records
            .set(
                Collection::Events,
                &event.key(),
                event_to_attributes(event),
                WriteMode::Replace,
            )
            .await?;
        Ok(())
    }

    /// Remove the record written under `new_key` after the old one could not
    /// be deleted, so a failed rename leaves only the original visible.
    async fn undo_move(&self, new_key: &str, old_key: &str) {
        match self.records.delete(Collection::Events, new_key).await {
            Ok(()) => warn!(from = %old_key, to = %new_key, "event move rolled back"),
            Err(err) => error!(
                from = %old_key,
                to = %new_key,
                error = %err,
                "event move could not be rolled back; both records remain"
            ),
        }
    }

    async fn ensure_free(&self, key: &str) -> Result<(), Error> {
        if key == GENERAL_INFO_KEY || self.exists(key).await? {
            return Err(Error::conflict(format!("event `{key}` already exists"))
                .with_details(json!({ "code": "duplicate_event", "key": key })));
        }
        Ok(())
    }
}

#[async_trait]
impl EventAdminCommand for EventAdminService {
    async fn list_events(&self) -> Result<Vec<EventView>, Error> {
        let mut events = lookups::all_events(self.records.as_ref()).await?;
        events.sort_by_key(Event::key);
        Ok(events.into_iter().map(view).collect())
    }

    async fn edit_view(&self, key: &str) -> Result<EventView, Error> {
        lookups::event(self.records.as_ref(), key).await.map(view)
    }

    async fn create_event(&self, draft: EventDraft) -> Result<EventView, Error> {
        let event = draft.into_event().map_err(map_validation_error)?;
        self.ensure_free(&event.key()).await?;
        self.write(&event).await?;
        info!(event = %event.key(), "event created");
        Ok(view(event))
    }

    async fn update_event(&self, key: &str, draft: EventDraft) -> Result<EventView, Error> {
        let existing = lookups::event(self.records.as_ref(), key).await?;
        let mut event = draft.into_event().map_err(map_validation_error)?;
        let renamed = event.identifier.display_name() != existing.identifier.display_name()
            || event.identifier.weekend() != existing.identifier.weekend();
        if renamed {
            self.ensure_free(&event.key()).await?;
        } else {
            event.identifier = existing.identifier;
        }

        self.write(&event).await?;
        let new_key = event.key();
        if new_key != key {
            if let Err(err) = self.records.delete(Collection::Events, key).await {
                self.undo_move(&new_key, key).await;
                return Err(err.into());
            }
            info!(from = %key, to = %new_key, "event moved");
        } else {
            info!(event = %key, "event updated");
        }
        Ok(view(event))
    }

    async fn delete_event(&self, key: &str) -> Result<(), Error> {
        if key == GENERAL_INFO_KEY || !self.exists(key).await? {
            return Err(lookups::event_not_found(key));
        }
        self.records.delete(Collection::Events, key).await?;
        info!(event = %key, "event deleted");
        Ok(())
    }

    async fn duplicate_event(&self, key: &str) -> Result<EventView, Error> {
        let original = lookups::event(self.records.as_ref(), key).await?;
        let mut copy = original.duplicate();
        for _ in 0..MAX_COPY_ATTEMPTS {
            if !self.exists(&copy.key()).await? {
                self.write(&copy).await?;
                info!(event = %key, copy = %copy.key(), "event duplicated");
                return Ok(view(copy));
            }
            copy = copy.duplicate();
        }
        Err(Error::conflict(format!("event `{key}` has too many copies"))
            .with_details(json!({ "code": "too_many_copies", "key": key })))
    }

    async fn set_current_weekend(&self, weekend: WeekendId) -> Result<(), Error> {
        self.records
            .set(
                Collection::Events,
                GENERAL_INFO_KEY,
                current_weekend_attributes(&weekend),
                WriteMode::Replace,
            )
            .await?;
        info!(weekend = %weekend, "current weekend changed");
        Ok(())
    }

    async fn upload_attachment(
        &self,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadedAttachment, Error> {
        if !allowed_file(filename) {
            return Err(
                Error::invalid_request(format!("`{filename}` is not an accepted attachment"))
                    .with_details(json!({ "field": "filename", "code": "disallowed_extension" })),
            );
        }
        let reference = self.objects.store(filename, bytes).await?;
        let url = self.objects.public_url(&reference)?;
        info!(attachment = reference.name(), "attachment stored");
        Ok(UploadedAttachment {
            name: reference.name().to_owned(),
            url,
        })
    }
}
