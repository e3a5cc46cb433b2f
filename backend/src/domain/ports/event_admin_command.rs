//! Driving port for event administration.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Error, EventDraft, LinkMap, WeekendId};

/// Editable view of a stored event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EventView {
    #[schema(example = "Check-In-2")]
    pub key: String,
    #[schema(example = "Check-In")]
    pub name: String,
    /// Name before the final separator; keeps copy markers but the last.
    pub raw_name: String,
    /// Weekend number or `All`.
    #[schema(example = "2")]
    pub weekend: String,
    pub day: String,
    #[schema(example = "14:00")]
    pub start_time: String,
    #[schema(example = "15:30")]
    pub end_time: String,
    pub location: String,
    pub description: String,
    pub access: String,
    #[schema(value_type = Object)]
    pub links: LinkMap,
    /// Link block rendered for the edit form.
    pub links_text: String,
    pub attachments: Vec<String>,
}

/// Stored attachment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadedAttachment {
    pub name: String,
    #[schema(example = "http://localhost:8080/api/v1/files/map.png")]
    pub url: String,
}

/// Administrative event use-cases.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventAdminCommand: Send + Sync {
    /// Every event across all weekends, ordered by key.
    async fn list_events(&self) -> Result<Vec<EventView>, Error>;

    /// One event in editable form.
    async fn edit_view(&self, key: &str) -> Result<EventView, Error>;

    /// Store a new event; fails with conflict when the key is taken.
    async fn create_event(&self, draft: EventDraft) -> Result<EventView, Error>;

    /// Replace an event, moving it when its name or weekend changed.
    async fn update_event(&self, key: &str, draft: EventDraft) -> Result<EventView, Error>;

    /// Remove an event.
    async fn delete_event(&self, key: &str) -> Result<(), Error>;

    /// Store a copy of an event under a `-copy` key.
    async fn duplicate_event(&self, key: &str) -> Result<EventView, Error>;

    /// Change which weekend anonymous visitors see.
    async fn set_current_weekend(&self, weekend: WeekendId) -> Result<(), Error>;

    /// Store an attachment and return its public URL.
    async fn upload_attachment(
        &self,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadedAttachment, Error>;
}
