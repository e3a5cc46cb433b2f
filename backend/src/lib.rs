//! Candidates' Weekend backend library.
//!
//! Hexagonal layout: [`domain`] holds the model, ports and services;
//! [`inbound`] adapts HTTP requests onto the driving ports; [`outbound`]
//! implements the record and object stores; [`server`] wires them together.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod server;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
