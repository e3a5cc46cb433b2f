//! Port for the key/value record store holding events, candidates and
//! general settings.

use async_trait::async_trait;

use crate::domain::Error;
use crate::domain::records::{AttributeMap, Collection};

use super::define_port_error;

define_port_error! {
    /// Errors raised by record store adapters.
    pub enum RecordStoreError {
        /// The store could not be reached.
        Connection { message: String } => "record store connection failed: {message}",
        /// A read or write failed once the store was reached.
        Query { message: String } => "record store query failed: {message}",
        /// The call did not finish within the configured deadline.
        Timeout { message: String } => "record store call timed out: {message}",
    }
}

impl RecordStoreError {
    /// Whether repeating the call may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Connection { .. } | Self::Timeout { .. })
    }
}

/// How [`RecordStore::set`] treats an existing record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Replace the record wholesale.
    Replace,
    /// Overwrite only the supplied attributes, keeping the rest.
    Merge,
}

/// Port over a store of attribute maps grouped into collections.
///
/// Writes are last-write-wins; no ordering is promised between concurrent
/// callers.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Fetch one record.
    async fn get(
        &self,
        collection: Collection,
        key: &str,
    ) -> Result<Option<AttributeMap>, RecordStoreError>;

    /// Every record in a collection with its key.
    async fn list_all(
        &self,
        collection: Collection,
    ) -> Result<Vec<(String, AttributeMap)>, RecordStoreError>;

    /// Write a record.
    async fn set(
        &self,
        collection: Collection,
        key: &str,
        attributes: AttributeMap,
        mode: WriteMode,
    ) -> Result<(), RecordStoreError>;

    /// Remove a record; deleting a missing key succeeds.
    async fn delete(&self, collection: Collection, key: &str) -> Result<(), RecordStoreError>;
}

impl From<RecordStoreError> for Error {
    fn from(err: RecordStoreError) -> Self {
        match err {
            RecordStoreError::Connection { message } | RecordStoreError::Timeout { message } => {
                Error::service_unavailable(format!("record store unavailable: {message}"))
            }
            RecordStoreError::Query { message } => {
                Error::internal(format!("record store error: {message}"))
            }
        }
    }
}
