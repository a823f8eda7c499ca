//! Domain ports defining the edges of the hexagon.
//!
//! Driven ports (repositories, blob storage, hashing, token signing) carry
//! their own error enums so adapters report failures in predictable
//! variants. Driving ports return the domain [`Error`](super::Error) directly
//! because inbound adapters only need to render it.

mod macros;

mod account_command;
mod blob_store;
mod password_hasher;
mod resource_command;
mod resource_query;
mod resource_repository;
mod token_service;
mod user_repository;

pub(crate) use macros::define_port_error;

#[cfg(test)]
pub use account_command::{MockAccountCommand, MockProfileQuery};
pub use account_command::{AccountCommand, ProfileQuery};
#[cfg(test)]
pub use blob_store::MockBlobStore;
pub use blob_store::{BlobContent, BlobStore, BlobStoreError, ByteStream};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHashError, PasswordHasher};
#[cfg(test)]
pub use resource_command::MockResourceCommand;
pub use resource_command::{Download, ResourceCommand};
#[cfg(test)]
pub use resource_query::MockResourceQuery;
pub use resource_query::ResourceQuery;
#[cfg(test)]
pub use resource_repository::MockResourceRepository;
pub use resource_repository::{ResourcePersistenceError, ResourceRepository};
#[cfg(test)]
pub use token_service::MockTokenService;
pub use token_service::{TokenError, TokenService};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
