//! Administrator and candidate sign-in.
//!
//! Candidates sign in with their roster email address. The first time they
//! do, they choose a password, which is stored as a salted SHA-256 digest in
//! the form `sha256$<salt>$<hex digest>`.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};
use sha2::{Digest, Sha256};
use tracing::{info, warn};
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::domain::lookups;
use crate::domain::ports::{CandidateLogin, LoginService, RecordStore, WriteMode};
use crate::domain::records::{
    AttributeMap, Collection, PASSWORD_ATTRIBUTE, candidate_from_attributes,
};
use crate::domain::{CandidateId, Error, normalise_email};

/// Minimum accepted password length, in characters.
pub const MIN_PASSWORD_LENGTH: usize = 8;

const HASH_SCHEME: &str = "sha256";

fn digest(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

/// Hash a password with a fresh random salt.
pub fn hash_password(password: &str) -> String {
    let salt = Uuid::new_v4().simple().to_string();
    format!("{HASH_SCHEME}${salt}${}", digest(&salt, password))
}

/// Check a password against a stored hash. Unknown formats never match.
///
/// # Examples
/// ```
/// use cw_backend::domain::{hash_password, verify_password_hash};
///
/// let stored = hash_password("correct horse");
/// assert!(verify_password_hash(&stored, "correct horse"));
/// assert!(!verify_password_hash(&stored, "battery staple"));
/// ```
#[must_use]
pub fn verify_password_hash(stored: &str, password: &str) -> bool {
    let mut parts = stored.splitn(3, '$');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(HASH_SCHEME), Some(salt), Some(expected)) => digest(salt, password) == expected,
        _ => false,
    }
}

/// Administrator credentials from configuration.
#[derive(Clone)]
pub struct AdminCredentials {
    username: String,
    password: Zeroizing<String>,
}

impl AdminCredentials {
    /// Wrap the configured administrator username and password.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: Zeroizing::new(password.into()),
        }
    }

    /// Whether the supplied pair is the configured one.
    #[must_use]
    pub fn matches(&self, username: &str, password: &str) -> bool {
        self.username == username && self.password.as_str() == password
    }
}

impl std::fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

fn invalid_password(code: &str, message: &str) -> Error {
    Error::invalid_request(message).with_details(json!({ "field": "password", "code": code }))
}

/// Sign-in service backed by the candidate records.
#[derive(Clone)]
pub struct PasswordLoginService {
    records: Arc<dyn RecordStore>,
    admin: AdminCredentials,
}

impl PasswordLoginService {
    /// Create a service over `records` accepting the given admin login.
    pub fn new(records: Arc<dyn RecordStore>, admin: AdminCredentials) -> Self {
        Self { records, admin }
    }
}

#[async_trait]
impl LoginService for PasswordLoginService {
    async fn authenticate_admin(&self, username: &str, password: &str) -> Result<(), Error> {
        if self.admin.matches(username, password) {
            info!("administrator signed in");
            Ok(())
        } else {
            warn!("rejected administrator sign-in");
            Err(Error::unauthorized("invalid credentials"))
        }
    }

    async fn begin_candidate_login(&self, email: &str) -> Result<CandidateLogin, Error> {
        let wanted = normalise_email(email);
        if wanted.is_empty() {
            return Err(Error::invalid_request("email must not be empty")
                .with_details(json!({ "field": "email", "code": "empty_email" })));
        }
        let listing = self.records.list_all(Collection::Users).await?;
        let candidate = listing
            .into_iter()
            .filter_map(|(key, map)| candidate_from_attributes(&key, &map).ok())
            .find(|candidate| normalise_email(&candidate.email) == wanted);

        match candidate {
            Some(candidate) if candidate.is_registered() => Ok(CandidateLogin::Password {
                candidate_id: candidate.id,
            }),
            Some(candidate) => Ok(CandidateLogin::Register {
                candidate_id: candidate.id,
            }),
            None => Err(Error::not_found("no candidate with that email address")
                .with_details(json!({ "field": "email", "code": "unknown_email" }))),
        }
    }

    async fn register_password(
        &self,
        candidate: &CandidateId,
        password: &str,
        confirmation: &str,
    ) -> Result<(), Error> {
        if password.is_empty() || confirmation.is_empty() {
            return Err(invalid_password("empty_password", "password must not be empty"));
        }
        if password != confirmation {
            return Err(invalid_password("password_mismatch", "passwords do not match"));
        }
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(invalid_password(
                "password_too_short",
                "password must be at least 8 characters",
            ));
        }

        let existing = lookups::candidate(self.records.as_ref(), candidate).await?;
        if existing.is_registered() {
            return Err(Error::conflict("candidate has already registered")
                .with_details(json!({ "code": "already_registered" })));
        }

        let mut update = AttributeMap::new();
        update.insert(
            PASSWORD_ATTRIBUTE.to_owned(),
            Value::String(hash_password(password)),
        );
        self.records
            .set(
                Collection::Users,
                candidate.as_ref(),
                update,
                WriteMode::Merge,
            )
            .await?;
        info!(candidate = %candidate, "candidate registered");
        Ok(())
    }

    async fn verify_password(&self, candidate: &CandidateId, password: &str) -> Result<(), Error> {
        let existing = lookups::candidate(self.records.as_ref(), candidate).await?;
        if !existing.is_registered() {
            return Err(Error::unauthorized("candidate has not registered")
                .with_details(json!({ "code": "not_registered" })));
        }
        if verify_password_hash(&existing.password_hash, password) {
            Ok(())
        } else {
            warn!(candidate = %candidate, "rejected candidate password");
            Err(Error::unauthorized("invalid credentials"))
        }
    }
}
