//! Naming and URL rules shared by the object store adapters.
//!
//! Stored objects are named `<digest>-<filename>` where `digest` is the first
//! twelve hex characters of the content's SHA-256. Identical uploads under the
//! same filename therefore collapse onto one object, while different content
//! never overwrites an existing attachment.

use sha2::{Digest, Sha256};
use url::Url;

use crate::domain::ports::{ObjectRef, ObjectStoreError};

const DIGEST_PREFIX_LEN: usize = 12;

/// Route prefix under which stored objects are served.
pub const FILES_ROUTE: &str = "api/v1/files/";

/// Reject names that could escape the storage directory or hide files.
pub fn validate_name(name: &str) -> Result<(), ObjectStoreError> {
    let trimmed = name.trim();
    let invalid = trimmed.is_empty()
        || trimmed != name
        || name.starts_with('.')
        || name.contains(['/', '\\', '\0', ':', '?', '#'])
        || name.chars().any(char::is_control);
    if invalid {
        Err(ObjectStoreError::invalid_name(name))
    } else {
        Ok(())
    }
}

/// Content-addressed object name for an upload.
pub fn object_name(filename: &str, bytes: &[u8]) -> Result<ObjectRef, ObjectStoreError> {
    validate_name(filename)?;
    let digest = hex::encode(Sha256::digest(bytes));
    let prefix = digest.get(..DIGEST_PREFIX_LEN).unwrap_or(digest.as_str());
    Ok(ObjectRef::new(format!("{prefix}-{filename}")))
}

/// Public URL for `reference` below `base`.
pub fn public_url(base: &Url, reference: &ObjectRef) -> Result<String, ObjectStoreError> {
    validate_name(reference.name())?;
    base.join(FILES_ROUTE)
        .and_then(|files| files.join(reference.name()))
        .map(String::from)
        .map_err(|err| ObjectStoreError::url(err.to_string()))
}
