//! Session helpers to keep HTTP handlers free of framework-specific logic.
//!
//! The cookie session carries at most two facts: whether the administrator
//! has signed in, and which candidate (if any) has signed in.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;
use tracing::warn;

use crate::domain::{CandidateId, Error};

pub(crate) const ADMIN_KEY: &str = "admin";
pub(crate) const CANDIDATE_KEY: &str = "candidate_id";

fn read_failed(error: impl std::fmt::Display) -> Error {
    Error::internal(format!("failed to read session: {error}"))
}

fn write_failed(error: impl std::fmt::Display) -> Error {
    Error::internal(format!("failed to persist session: {error}"))
}

/// Newtype wrapper that exposes higher-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Construct a new wrapper from the underlying Actix session.
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Mark the session as belonging to the administrator.
    pub fn persist_admin(&self) -> Result<(), Error> {
        self.0.renew();
        self.0.insert(ADMIN_KEY, true).map_err(write_failed)
    }

    /// Remember the signed-in candidate.
    pub fn persist_candidate(&self, candidate: &CandidateId) -> Result<(), Error> {
        self.0.renew();
        self.0
            .insert(CANDIDATE_KEY, candidate.as_ref())
            .map_err(write_failed)
    }

    /// Forget everything stored in the session.
    pub fn clear(&self) {
        self.0.purge();
    }

    /// Whether the administrator has signed in.
    pub fn is_admin(&self) -> Result<bool, Error> {
        Ok(self
            .0
            .get::<bool>(ADMIN_KEY)
            .map_err(read_failed)?
            .unwrap_or(false))
    }

    /// The signed-in candidate, if any. Unparseable values are ignored.
    pub fn candidate_id(&self) -> Result<Option<CandidateId>, Error> {
        let Some(raw) = self.0.get::<String>(CANDIDATE_KEY).map_err(read_failed)? else {
            return Ok(None);
        };
        match CandidateId::new(raw) {
            Ok(id) => Ok(Some(id)),
            Err(error) => {
                warn!(%error, "invalid candidate id in session cookie");
                Ok(None)
            }
        }
    }

    /// Require the administrator session or return `401 Unauthorized`.
    pub fn require_admin(&self) -> Result<(), Error> {
        if self.is_admin()? {
            Ok(())
        } else {
            Err(Error::unauthorized("administrator login required"))
        }
    }

    /// Allow the administrator or the candidate named by `candidate`.
    ///
    /// Anonymous sessions get `401`; another candidate's session gets `403`.
    pub fn require_candidate_access(&self, candidate: &CandidateId) -> Result<(), Error> {
        if self.is_admin()? {
            return Ok(());
        }
        match self.candidate_id()? {
            Some(signed_in) if &signed_in == candidate => Ok(()),
            Some(_) => Err(Error::forbidden("candidates may only view their own records")),
            None => Err(Error::unauthorized("login required")),
        }
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}
