//! Domain primitives, aggregates and use-case services.
//!
//! Purpose: Define the strongly typed schedule model (weekends, events,
//! candidates) and the services that drive it through the ports in
//! [`ports`]. Adapters in `inbound` and `outbound` depend on this module,
//! never the other way round.
//!
//! Public surface:
//! - Error / ErrorCode: API error payload and stable error identifiers.
//! - WeekendId / WeekendScope: weekend tags and the `All` wildcard.
//! - Event / EventIdentifier / EventDraft: schedule entries.
//! - Candidate / CandidateProfile / CandidateDraft: roster entries.
//! - Schedule: per-day ordered view returned to clients.
//! - ScheduleService / EventAdminService / CandidateAdminService /
//!   PasswordLoginService: implementations of the driving ports.

pub mod candidate;
mod candidate_admin;
pub mod error;
pub mod event;
mod event_admin;
pub mod links;
mod login;
pub(crate) mod lookups;
pub mod ports;
pub mod records;
mod roster;
pub mod schedule;
mod schedule_service;
pub mod time;
pub mod trace_id;
pub mod weekend;

pub use self::candidate::{
    Candidate, CandidateDetails, CandidateDraft, CandidateId, CandidateProfile,
    CandidateValidationError, normalise_email,
};
pub use self::candidate_admin::CandidateAdminService;
pub use self::error::{Error, ErrorCode};
pub use self::event::{
    ALLOWED_EXTENSIONS, COPY_MARKER, Day, Event, EventDraft, EventIdentifier,
    EventValidationError, allowed_file, display_name, raw_name, split_description_lines,
};
pub use self::event_admin::EventAdminService;
pub use self::links::{LinkMap, format_links_block, parse_links};
pub use self::login::{
    AdminCredentials, MIN_PASSWORD_LENGTH, PasswordLoginService, hash_password,
    verify_password_hash,
};
pub use self::roster::{RosterError, parse_roster};
pub use self::schedule::{
    Schedule, ScheduleScope, ScheduleWarning, ScheduledEvent, assemble_schedule, build_schedule,
    select_events,
};
pub use self::schedule_service::ScheduleService;
pub use self::time::TimeFormatError;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::weekend::{ALL_WEEKENDS, WeekendId, WeekendScope, WeekendValidationError};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use cw_backend::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<()> {
///     Err(Error::forbidden("nope"))
/// }
/// assert!(handler().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
