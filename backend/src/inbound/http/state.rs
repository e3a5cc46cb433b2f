//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    CandidateAdminCommand, EventAdminCommand, LoginService, ObjectStore, ScheduleQuery,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Read-side schedule and profile queries.
    pub schedule: Arc<dyn ScheduleQuery>,
    /// Event administration.
    pub events: Arc<dyn EventAdminCommand>,
    /// Candidate administration and roster import.
    pub candidates: Arc<dyn CandidateAdminCommand>,
    /// Administrator and candidate sign-in.
    pub login: Arc<dyn LoginService>,
    /// Attachment storage, used to serve uploaded files.
    pub objects: Arc<dyn ObjectStore>,
}
