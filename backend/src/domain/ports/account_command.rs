//! Driving ports for account use-cases.
//!
//! Inbound adapters call these without knowing which repository, hasher or
//! token signer sits behind them.

use async_trait::async_trait;

use crate::domain::{AuthSession, Error, LoginCredentials, Registration, User, UserId};

/// Registration and login.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountCommand: Send + Sync {
    /// Create an account and issue a token for it.
    async fn register(&self, registration: Registration) -> Result<AuthSession, Error>;

    /// Check credentials and issue a token.
    async fn login(&self, credentials: LoginCredentials) -> Result<AuthSession, Error>;
}

/// Read access to the authenticated user's profile.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileQuery: Send + Sync {
    /// Public fields of the user, or `NotFound`.
    async fn profile(&self, user_id: &UserId) -> Result<User, Error>;
}
