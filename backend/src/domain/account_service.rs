//! Account domain service.
//!
//! Implements registration, login and profile lookup over the credential
//! store, password hasher and token signer ports.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{debug, info};

use crate::domain::ports::{
    AccountCommand, PasswordHashError, PasswordHasher, ProfileQuery, TokenError, TokenService,
    UserPersistenceError, UserRepository,
};
use crate::domain::{
    AuthSession, Error, LoginCredentials, Registration, TokenClaims, User, UserAccount, UserId,
};

/// Message for a registration whose email already has an account.
pub const DUPLICATE_EMAIL_MESSAGE: &str = "User with this email already exists";
/// Message for every failed login, whatever the cause.
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid email or password";
/// Message for a lookup of a user that does not exist.
pub const USER_NOT_FOUND_MESSAGE: &str = "User not found";

pub(crate) fn map_user_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::DuplicateEmail => Error::duplicate_email(DUPLICATE_EMAIL_MESSAGE),
        UserPersistenceError::Connection { message } => {
            Error::internal(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
    }
}

fn map_hash_error(error: PasswordHashError) -> Error {
    Error::internal(error.to_string())
}

fn map_token_error(error: TokenError) -> Error {
    Error::internal(format!("failed to issue token: {error}"))
}

/// Account service implementing [`AccountCommand`] and [`ProfileQuery`].
#[derive(Clone)]
pub struct AccountService<U, H, T> {
    users: Arc<U>,
    hasher: Arc<H>,
    tokens: Arc<T>,
    clock: Arc<dyn Clock>,
}

impl<U, H, T> AccountService<U, H, T> {
    /// Create a service over the given ports.
    pub fn new(users: Arc<U>, hasher: Arc<H>, tokens: Arc<T>, clock: Arc<dyn Clock>) -> Self {
        Self {
            users,
            hasher,
            tokens,
            clock,
        }
    }
}

impl<U, H, T> AccountService<U, H, T>
where
    U: UserRepository,
    H: PasswordHasher,
    T: TokenService,
{
    fn open_session(&self, user: User) -> Result<AuthSession, Error> {
        let claims = TokenClaims {
            user_id: *user.id(),
            email: user.email().clone(),
        };
        let token = self.tokens.issue(&claims).map_err(map_token_error)?;
        Ok(AuthSession { token, user })
    }
}

#[async_trait]
impl<U, H, T> AccountCommand for AccountService<U, H, T>
where
    U: UserRepository,
    H: PasswordHasher,
    T: TokenService,
{
    async fn register(&self, registration: Registration) -> Result<AuthSession, Error> {
        let existing = self
            .users
            .find_by_email(registration.email())
            .await
            .map_err(map_user_error)?;
        if existing.is_some() {
            debug!("registration rejected: email already registered");
            return Err(Error::duplicate_email(DUPLICATE_EMAIL_MESSAGE));
        }

        let password_hash = self
            .hasher
            .hash(registration.password())
            .await
            .map_err(map_hash_error)?;
        let user = User::new(
            UserId::random(),
            registration.name().clone(),
            registration.email().clone(),
            registration.college().map(str::to_owned),
            self.clock.utc(),
        );
        let account = UserAccount {
            user,
            password_hash,
        };
        // The store's unique index settles races between concurrent
        // registrations that both passed the lookup above.
        self.users.insert(&account).await.map_err(map_user_error)?;

        info!(user_id = %account.user.id(), "user registered");
        self.open_session(account.user)
    }

    async fn login(&self, credentials: LoginCredentials) -> Result<AuthSession, Error> {
        let account = self
            .users
            .find_by_email(credentials.email())
            .await
            .map_err(map_user_error)?;
        let Some(account) = account else {
            debug!("login rejected: unknown email");
            return Err(Error::invalid_credentials(INVALID_CREDENTIALS_MESSAGE));
        };

        let matches = self
            .hasher
            .verify(credentials.password(), &account.password_hash)
            .await
            .map_err(map_hash_error)?;
        if !matches {
            debug!(user_id = %account.user.id(), "login rejected: password mismatch");
            return Err(Error::invalid_credentials(INVALID_CREDENTIALS_MESSAGE));
        }

        info!(user_id = %account.user.id(), "user logged in");
        self.open_session(account.user)
    }
}

#[async_trait]
impl<U, H, T> ProfileQuery for AccountService<U, H, T>
where
    U: UserRepository,
    H: PasswordHasher,
    T: TokenService,
{
    async fn profile(&self, user_id: &UserId) -> Result<User, Error> {
        self.users
            .find_by_id(user_id)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::not_found(USER_NOT_FOUND_MESSAGE))
    }
}

#[cfg(test)]
#[path = "account_service_tests.rs"]
mod tests;
