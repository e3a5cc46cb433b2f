//! Driving port for candidate administration.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{CandidateDraft, CandidateId, CandidateProfile, Error};

/// Outcome of a roster import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RosterImportSummary {
    pub imported: usize,
    #[schema(value_type = Vec<String>)]
    pub candidates: Vec<CandidateId>,
}

/// Administrative candidate use-cases.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CandidateAdminCommand: Send + Sync {
    /// Create or reset candidates from a CSV roster.
    async fn import_roster(&self, csv: Vec<u8>) -> Result<RosterImportSummary, Error>;

    /// Every candidate, ordered by id.
    async fn list_candidates(&self) -> Result<Vec<CandidateProfile>, Error>;

    /// One candidate with stored (24-hour) interview time.
    async fn candidate(&self, id: &CandidateId) -> Result<CandidateProfile, Error>;

    /// Merge edits into a candidate, keeping their password.
    async fn update_candidate(
        &self,
        id: &CandidateId,
        draft: CandidateDraft,
    ) -> Result<CandidateProfile, Error>;

    /// Remove a candidate.
    async fn delete_candidate(&self, id: &CandidateId) -> Result<(), Error>;
}
