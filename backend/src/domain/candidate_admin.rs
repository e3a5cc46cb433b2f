//! Candidate administration service.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::{info, warn};

use crate::domain::lookups;
use crate::domain::ports::{CandidateAdminCommand, RecordStore, RosterImportSummary, WriteMode};
use crate::domain::records::{
    Collection, candidate_edit_attributes, candidate_from_attributes, candidate_to_attributes,
    optional_weekend,
};
use crate::domain::{
    CandidateDraft, CandidateId, CandidateProfile, Error, RosterError, normalise_email,
    parse_roster,
};

fn map_roster_error(err: RosterError) -> Error {
    Error::invalid_request(err.to_string())
        .with_details(json!({ "code": "invalid_roster", "row": err.row() }))
}

/// Candidate administration backed by a record store.
#[derive(Clone)]
pub struct CandidateAdminService {
    records: Arc<dyn RecordStore>,
}

impl CandidateAdminService {
    /// Create a service over `records`.
    pub fn new(records: Arc<dyn RecordStore>) -> Self {
        Self { records }
    }
}

#[async_trait]
impl CandidateAdminCommand for CandidateAdminService {
    async fn import_roster(&self, csv: Vec<u8>) -> Result<RosterImportSummary, Error> {
        let candidates = parse_roster(&csv).map_err(map_roster_error)?;
        let mut imported = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            self.records
                .set(
                    Collection::Users,
                    candidate.id.as_ref(),
                    candidate_to_attributes(&candidate),
                    WriteMode::Replace,
                )
                .await?;
            imported.push(candidate.id);
        }
        info!(count = imported.len(), "roster imported");
        Ok(RosterImportSummary {
            imported: imported.len(),
            candidates: imported,
        })
    }

    async fn list_candidates(&self) -> Result<Vec<CandidateProfile>, Error> {
        let listing = self.records.list_all(Collection::Users).await?;
        let mut profiles: Vec<CandidateProfile> = listing
            .into_iter()
            .filter_map(|(key, map)| match candidate_from_attributes(&key, &map) {
                Ok(candidate) => Some(CandidateProfile::from(candidate)),
                Err(err) => {
                    warn!(record = %key, error = %err, "skipping malformed candidate record");
                    None
                }
            })
            .collect();
        profiles.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(profiles)
    }

    async fn candidate(&self, id: &CandidateId) -> Result<CandidateProfile, Error> {
        lookups::candidate(self.records.as_ref(), id)
            .await
            .map(CandidateProfile::from)
    }

    async fn update_candidate(
        &self,
        id: &CandidateId,
        draft: CandidateDraft,
    ) -> Result<CandidateProfile, Error> {
        let mut candidate = lookups::candidate(self.records.as_ref(), id).await?;
        let raw_weekend = draft.weekend.unwrap_or_default();
        let weekend = optional_weekend(&raw_weekend).map_err(|err| {
            Error::invalid_request(err.to_string())
                .with_details(json!({ "field": "weekend", "code": "invalid_weekend" }))
        })?;
        let email = normalise_email(&draft.email);
        if email.is_empty() {
            return Err(Error::invalid_request("email must not be empty")
                .with_details(json!({ "field": "email", "code": "empty_email" })));
        }

        self.records
            .set(
                Collection::Users,
                id.as_ref(),
                candidate_edit_attributes(&email, weekend.as_ref(), &draft.details),
                WriteMode::Merge,
            )
            .await?;
        info!(candidate = %id, "candidate updated");

        candidate.email = email;
        candidate.weekend = weekend;
        candidate.details = draft.details;
        Ok(CandidateProfile::from(candidate))
    }

    async fn delete_candidate(&self, id: &CandidateId) -> Result<(), Error> {
        if self.records.get(Collection::Users, id.as_ref()).await?.is_none() {
            return Err(lookups::candidate_not_found(id));
        }
        self.records.delete(Collection::Users, id.as_ref()).await?;
        info!(candidate = %id, "candidate deleted");
        Ok(())
    }
}
