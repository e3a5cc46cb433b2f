//! Schedule and profile HTTP handlers.
//!
//! ```text
//! GET /api/v1/schedule
//! GET /api/v1/schedule/{candidate_id}
//! GET /api/v1/events/{event_key}
//! GET /api/v1/candidates/{candidate_id}
//! ```

use actix_web::{get, web};

use crate::domain::ports::EventDetails;
use crate::domain::{CandidateProfile, Error, Schedule};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::parse_candidate_id;

/// Schedule for the current weekend.
#[utoipa::path(
    get,
    path = "/api/v1/schedule",
    responses(
        (status = 200, description = "Friday and Saturday events", body = Schedule),
        (status = 404, description = "Current weekend not configured", body = Error),
        (status = 503, description = "Record store unavailable", body = Error)
    ),
    tags = ["schedule"],
    operation_id = "currentSchedule",
    security([])
)]
#[get("/schedule")]
pub async fn current_schedule(state: web::Data<HttpState>) -> ApiResult<web::Json<Schedule>> {
    let schedule = state.schedule.current_schedule().await?;
    Ok(web::Json(schedule))
}

/// Schedule for a candidate's assigned weekend.
#[utoipa::path(
    get,
    path = "/api/v1/schedule/{candidate_id}",
    params(("candidate_id" = String, Path, description = "Roster user id")),
    responses(
        (status = 200, description = "Friday and Saturday events", body = Schedule),
        (status = 401, description = "Login required", body = Error),
        (status = 403, description = "Another candidate's schedule", body = Error),
        (status = 404, description = "Unknown candidate or no weekend assigned", body = Error)
    ),
    tags = ["schedule"],
    operation_id = "candidateSchedule"
)]
#[get("/schedule/{candidate_id}")]
pub async fn candidate_schedule(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Schedule>> {
    let candidate = parse_candidate_id(&path)?;
    session.require_candidate_access(&candidate)?;
    let schedule = state.schedule.candidate_schedule(&candidate).await?;
    Ok(web::Json(schedule))
}

/// Full details for one event.
#[utoipa::path(
    get,
    path = "/api/v1/events/{event_key}",
    params(("event_key" = String, Path, description = "Event record key")),
    responses(
        (status = 200, description = "Event details", body = EventDetails),
        (status = 404, description = "Unknown event", body = Error)
    ),
    tags = ["schedule"],
    operation_id = "eventDetails",
    security([])
)]
#[get("/events/{event_key}")]
pub async fn event_details(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<EventDetails>> {
    let details = state.schedule.event_details(&path).await?;
    Ok(web::Json(details))
}

/// A candidate's own roster details.
#[utoipa::path(
    get,
    path = "/api/v1/candidates/{candidate_id}",
    params(("candidate_id" = String, Path, description = "Roster user id")),
    responses(
        (status = 200, description = "Candidate profile", body = CandidateProfile),
        (status = 401, description = "Login required", body = Error),
        (status = 403, description = "Another candidate's profile", body = Error),
        (status = 404, description = "Unknown candidate", body = Error)
    ),
    tags = ["candidates"],
    operation_id = "candidateProfile"
)]
#[get("/candidates/{candidate_id}")]
pub async fn candidate_profile(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<CandidateProfile>> {
    let candidate = parse_candidate_id(&path)?;
    session.require_candidate_access(&candidate)?;
    let profile = state.schedule.candidate_profile(&candidate).await?;
    Ok(web::Json(profile))
}
