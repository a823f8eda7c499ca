//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::UploadPolicy;
use crate::domain::ports::{
    AccountCommand, ProfileQuery, ResourceCommand, ResourceQuery, TokenService,
};

/// Parameter object bundling all port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub accounts: Arc<dyn AccountCommand>,
    pub profiles: Arc<dyn ProfileQuery>,
    pub resources: Arc<dyn ResourceCommand>,
    pub catalogue: Arc<dyn ResourceQuery>,
    pub tokens: Arc<dyn TokenService>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub accounts: Arc<dyn AccountCommand>,
    pub profiles: Arc<dyn ProfileQuery>,
    pub resources: Arc<dyn ResourceCommand>,
    pub catalogue: Arc<dyn ResourceQuery>,
    /// Verifies bearer tokens on protected routes.
    pub tokens: Arc<dyn TokenService>,
    /// Limits applied while the upload body is still streaming.
    pub upload_policy: UploadPolicy,
}

impl HttpState {
    /// Construct state from a ports bundle and the upload limits.
    pub fn new(ports: HttpStatePorts, upload_policy: UploadPolicy) -> Self {
        let HttpStatePorts {
            accounts,
            profiles,
            resources,
            catalogue,
            tokens,
        } = ports;
        Self {
            accounts,
            profiles,
            resources,
            catalogue,
            tokens,
            upload_policy,
        }
    }
}
