//! Builders wiring adapters and domain services into [`HttpState`].

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use mockable::Clock;
use tracing::info;

use crate::domain::ports::{ResourceRepository, UserRepository};
use crate::domain::{AccountService, ResourceService, UploadPolicy};
use crate::inbound::http::state::{HttpState, HttpStatePorts};
use crate::outbound::blob::FsBlobStore;
use crate::outbound::memory::{InMemoryResourceRepository, InMemoryUserRepository};
use crate::outbound::persistence::{DbPool, DieselResourceRepository, DieselUserRepository};
use crate::outbound::security::{BcryptPasswordHasher, JwtTokenService, SigningKey};

/// Inputs shared by every storage backend.
pub struct StateDependencies {
    /// HMAC key for bearer tokens.
    pub signing_key: SigningKey,
    pub bcrypt_cost: u32,
    /// Created if missing.
    pub upload_dir: PathBuf,
    pub upload_policy: UploadPolicy,
    pub clock: Arc<dyn Clock>,
}

/// Build state over in-process repositories. Data lives as long as the
/// process; uploaded files still go to `upload_dir`.
///
/// # Errors
/// Returns [`io::Error`] when the upload directory cannot be opened.
pub fn build_in_memory_state(deps: StateDependencies) -> io::Result<HttpState> {
    info!("using in-memory repositories");
    build_state(
        Arc::new(InMemoryUserRepository::new()),
        Arc::new(InMemoryResourceRepository::new()),
        deps,
    )
}

/// Build state over PostgreSQL repositories sharing `pool`.
///
/// # Errors
/// Returns [`io::Error`] when the upload directory cannot be opened.
pub fn build_diesel_state(pool: DbPool, deps: StateDependencies) -> io::Result<HttpState> {
    info!("using PostgreSQL repositories");
    build_state(
        Arc::new(DieselUserRepository::new(pool.clone())),
        Arc::new(DieselResourceRepository::new(pool)),
        deps,
    )
}

fn build_state<U, R>(
    users: Arc<U>,
    resources: Arc<R>,
    deps: StateDependencies,
) -> io::Result<HttpState>
where
    U: UserRepository + 'static,
    R: ResourceRepository + 'static,
{
    let StateDependencies {
        signing_key,
        bcrypt_cost,
        upload_dir,
        upload_policy,
        clock,
    } = deps;

    let blobs = Arc::new(FsBlobStore::open(&upload_dir, clock.clone())?);
    let hasher = Arc::new(BcryptPasswordHasher::new(bcrypt_cost));
    let tokens = Arc::new(JwtTokenService::new(&signing_key, clock.clone()));

    let accounts = Arc::new(AccountService::new(
        users.clone(),
        hasher,
        tokens.clone(),
        clock.clone(),
    ));
    let catalogue = Arc::new(ResourceService::new(
        resources,
        users,
        blobs,
        upload_policy,
        clock,
    ));

    Ok(HttpState::new(
        HttpStatePorts {
            accounts: accounts.clone(),
            profiles: accounts,
            resources: catalogue.clone(),
            catalogue,
            tokens,
        },
        upload_policy,
    ))
}
