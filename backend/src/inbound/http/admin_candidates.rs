//! Administrator handlers for the candidate roster.
//!
//! ```text
//! GET  /api/v1/admin/candidates
//! POST /api/v1/admin/candidates <CSV roster>
//! GET|PUT|DELETE /api/v1/admin/candidates/{candidate_id}
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};

use crate::domain::ports::RosterImportSummary;
use crate::domain::{CandidateDraft, CandidateProfile, Error};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::parse_candidate_id;

/// Every candidate on the roster.
#[utoipa::path(
    get,
    path = "/api/v1/admin/candidates",
    responses(
        (status = 200, description = "Candidates ordered by id", body = [CandidateProfile]),
        (status = 401, description = "Administrator login required", body = Error)
    ),
    tags = ["admin"],
    operation_id = "listCandidates"
)]
#[get("/admin/candidates")]
pub async fn list_candidates(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<CandidateProfile>>> {
    session.require_admin()?;
    Ok(web::Json(state.candidates.list_candidates().await?))
}

/// Import a CSV roster, creating or resetting each listed candidate.
///
/// The whole file is rejected when any row is invalid.
#[utoipa::path(
    post,
    path = "/api/v1/admin/candidates",
    request_body(content = String, content_type = "text/csv"),
    responses(
        (status = 200, description = "Roster imported", body = RosterImportSummary),
        (status = 400, description = "Roster rejected", body = Error),
        (status = 401, description = "Administrator login required", body = Error)
    ),
    tags = ["admin"],
    operation_id = "importRoster"
)]
#[post("/admin/candidates")]
pub async fn import_roster(
    state: web::Data<HttpState>,
    session: SessionContext,
    body: web::Bytes,
) -> ApiResult<web::Json<RosterImportSummary>> {
    session.require_admin()?;
    let summary = state.candidates.import_roster(body.to_vec()).await?;
    Ok(web::Json(summary))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/candidates/{candidate_id}",
    params(("candidate_id" = String, Path, description = "Roster user id")),
    responses(
        (status = 200, description = "Candidate with stored interview time", body = CandidateProfile),
        (status = 401, description = "Administrator login required", body = Error),
        (status = 404, description = "Unknown candidate", body = Error)
    ),
    tags = ["admin"],
    operation_id = "getCandidate"
)]
#[get("/admin/candidates/{candidate_id}")]
pub async fn get_candidate(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<CandidateProfile>> {
    session.require_admin()?;
    let id = parse_candidate_id(&path)?;
    Ok(web::Json(state.candidates.candidate(&id).await?))
}

/// Edit a candidate; the stored password is kept.
#[utoipa::path(
    put,
    path = "/api/v1/admin/candidates/{candidate_id}",
    params(("candidate_id" = String, Path, description = "Roster user id")),
    request_body = CandidateDraft,
    responses(
        (status = 200, description = "Candidate updated", body = CandidateProfile),
        (status = 400, description = "Invalid candidate", body = Error),
        (status = 401, description = "Administrator login required", body = Error),
        (status = 404, description = "Unknown candidate", body = Error)
    ),
    tags = ["admin"],
    operation_id = "updateCandidate"
)]
#[put("/admin/candidates/{candidate_id}")]
pub async fn update_candidate(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<CandidateDraft>,
) -> ApiResult<web::Json<CandidateProfile>> {
    session.require_admin()?;
    let id = parse_candidate_id(&path)?;
    let profile = state
        .candidates
        .update_candidate(&id, payload.into_inner())
        .await?;
    Ok(web::Json(profile))
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/candidates/{candidate_id}",
    params(("candidate_id" = String, Path, description = "Roster user id")),
    responses(
        (status = 204, description = "Candidate removed"),
        (status = 401, description = "Administrator login required", body = Error),
        (status = 404, description = "Unknown candidate", body = Error)
    ),
    tags = ["admin"],
    operation_id = "deleteCandidate"
)]
#[delete("/admin/candidates/{candidate_id}")]
pub async fn delete_candidate(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    session.require_admin()?;
    let id = parse_candidate_id(&path)?;
    state.candidates.delete_candidate(&id).await?;
    Ok(HttpResponse::NoContent().finish())
}
