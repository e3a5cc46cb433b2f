//! Driving port for administrator and candidate sign-in.
//!
//! Inbound adapters call this port to check credentials without knowing how
//! candidates or password hashes are stored, so handler tests can substitute
//! a double.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{CandidateId, Error};

/// Next step after a candidate enters their email address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "next", rename_all = "snake_case")]
pub enum CandidateLogin {
    /// The candidate has a password and must enter it.
    Password {
        #[serde(rename = "candidateId")]
        #[schema(value_type = String)]
        candidate_id: CandidateId,
    },
    /// The candidate has not chosen a password yet.
    Register {
        #[serde(rename = "candidateId")]
        #[schema(value_type = String)]
        candidate_id: CandidateId,
    },
}

/// Authentication use-cases.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Check the administrator credentials.
    async fn authenticate_admin(&self, username: &str, password: &str) -> Result<(), Error>;

    /// Look a candidate up by email address.
    async fn begin_candidate_login(&self, email: &str) -> Result<CandidateLogin, Error>;

    /// Set a first password for a candidate.
    async fn register_password(
        &self,
        candidate: &CandidateId,
        password: &str,
        confirmation: &str,
    ) -> Result<(), Error>;

    /// Check a candidate's password.
    async fn verify_password(&self, candidate: &CandidateId, password: &str) -> Result<(), Error>;
}
