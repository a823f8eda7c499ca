//! Synapse backend library: a resource-sharing service for students.
//!
//! Layout follows ports and adapters:
//! - [`domain`]: types, ports and services, free of transport concerns.
//! - [`inbound`]: HTTP handlers translating requests into port calls.
//! - [`outbound`]: PostgreSQL, in-memory, filesystem and credential adapters.
//! - [`middleware`]: request-scoped tracing.
//! - [`server`]: settings, state assembly and the Actix application.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod server;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
