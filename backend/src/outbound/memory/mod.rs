//! In-process repositories used when no database is configured.
//!
//! State lives behind a mutex per repository; every port operation takes the
//! lock once, so read-modify-write sequences such as the download counter are
//! atomic with respect to each other.

mod resource_repository;
mod user_repository;

pub use resource_repository::InMemoryResourceRepository;
pub use user_repository::InMemoryUserRepository;
