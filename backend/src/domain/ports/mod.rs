//! Domain ports for the hexagonal boundary.
//!
//! Driven ports (`RecordStore`, `ObjectStore`) are implemented by outbound
//! adapters; driving ports are implemented by the domain services and called
//! by the HTTP adapter.

mod macros;
pub(crate) use macros::define_port_error;

mod candidate_admin_command;
mod event_admin_command;
mod login_service;
mod object_store;
mod record_store;
mod schedule_query;

#[cfg(test)]
pub use candidate_admin_command::MockCandidateAdminCommand;
pub use candidate_admin_command::{CandidateAdminCommand, RosterImportSummary};
#[cfg(test)]
pub use event_admin_command::MockEventAdminCommand;
pub use event_admin_command::{EventAdminCommand, EventView, UploadedAttachment};
#[cfg(test)]
pub use login_service::MockLoginService;
pub use login_service::{CandidateLogin, LoginService};
#[cfg(test)]
pub use object_store::MockObjectStore;
pub use object_store::{ObjectRef, ObjectStore, ObjectStoreError};
#[cfg(test)]
pub use record_store::MockRecordStore;
pub use record_store::{RecordStore, RecordStoreError, WriteMode};
#[cfg(test)]
pub use schedule_query::MockScheduleQuery;
pub use schedule_query::{EventDetails, ScheduleQuery};
