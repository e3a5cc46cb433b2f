//! Outbound adapters implementing the driven ports.
//!
//! - **memory**: process-local record and object stores (development, tests)
//! - **filesystem**: JSON documents and attachment files below a data
//!   directory, accessed through `cap-std`
//! - **resilient**: timeout and retry decorator for any record store
//!
//! Adapters translate between storage representations and the domain's
//! attribute maps. They contain no schedule logic.

pub mod filesystem;
pub mod memory;
mod object_names;
pub mod resilient;

pub use filesystem::{FilesystemObjectStore, FilesystemRecordStore};
pub use memory::{InMemoryObjectStore, InMemoryRecordStore};
pub use object_names::FILES_ROUTE;
pub use resilient::{ResilienceConfig, ResilientRecordStore};
