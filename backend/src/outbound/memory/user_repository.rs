//! Mutex-guarded [`UserRepository`].

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{EmailAddress, User, UserAccount, UserId};

/// Accounts keyed by normalised email address.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    accounts: Mutex<HashMap<String, UserAccount>>,
}

impl InMemoryUserRepository {
    /// Empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, UserAccount>>, UserPersistenceError> {
        self.accounts
            .lock()
            .map_err(|_| UserPersistenceError::query("user store lock poisoned"))
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(&self, account: &UserAccount) -> Result<(), UserPersistenceError> {
        let mut accounts = self.lock()?;
        let key = account.user.email().as_str().to_owned();
        if accounts.contains_key(&key) {
            return Err(UserPersistenceError::duplicate_email());
        }
        accounts.insert(key, account.clone());
        Ok(())
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<UserAccount>, UserPersistenceError> {
        Ok(self.lock()?.get(email.as_str()).cloned())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        Ok(self
            .lock()?
            .values()
            .find(|account| account.user.id() == id)
            .map(|account| account.user.clone()))
    }

    async fn count(&self) -> Result<u64, UserPersistenceError> {
        Ok(self.lock()?.len() as u64)
    }
}
