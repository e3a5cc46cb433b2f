//! Port for uploaded attachments.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::Error;

use super::define_port_error;

define_port_error! {
    /// Errors raised by object store adapters.
    pub enum ObjectStoreError {
        /// Reading or writing the object failed.
        Io { message: String } => "object store I/O failed: {message}",
        /// The object name cannot be stored safely.
        InvalidName { name: String } => "object name `{name}` is not allowed",
        /// A public URL could not be composed.
        Url { message: String } => "object URL could not be built: {message}",
    }
}

/// Opaque reference to a stored object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectRef(String);

impl ObjectRef {
    /// Wrap a stored object name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Stored object name.
    pub fn name(&self) -> &str {
        self.0.as_str()
    }
}

/// Port over a blob store for event attachments.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store bytes under a name derived from `filename`.
    async fn store(&self, filename: &str, bytes: Vec<u8>) -> Result<ObjectRef, ObjectStoreError>;

    /// Public URL at which the object is served.
    fn public_url(&self, reference: &ObjectRef) -> Result<String, ObjectStoreError>;

    /// Read a stored object back.
    async fn load(&self, reference: &ObjectRef) -> Result<Option<Vec<u8>>, ObjectStoreError>;
}

impl From<ObjectStoreError> for Error {
    fn from(err: ObjectStoreError) -> Self {
        match err {
            ObjectStoreError::InvalidName { name } => {
                Error::invalid_request(format!("attachment name `{name}` is not allowed"))
            }
            other => Error::internal(other.to_string()),
        }
    }
}
