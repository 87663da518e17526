use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::ports::CredentialStore;
use crate::user::errors::CredentialStoreError;

/// Process-local credential store keyed by normalized email.
///
/// Check-and-insert happens under one lock, so concurrent registrations for
/// the same address resolve to exactly one winner.
#[derive(Default)]
pub struct InMemoryCredentialStore {
    users: Mutex<HashMap<String, User>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark an account inactive. Returns `false` when no such user exists.
    pub fn deactivate(&self, email: &EmailAddress) -> Result<bool, CredentialStoreError> {
        let mut users = self.lock()?;
        Ok(match users.get_mut(email.as_str()) {
            Some(user) => {
                user.is_active = false;
                true
            }
            None => false,
        })
    }

    fn lock(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<String, User>>, CredentialStoreError> {
        self.users
            .lock()
            .map_err(|_| CredentialStoreError::Database("credential store lock poisoned".into()))
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn create(
        &self,
        email: &EmailAddress,
        password_hash: &str,
    ) -> Result<User, CredentialStoreError> {
        let mut users = self.lock()?;

        match users.entry(email.as_str().to_string()) {
            Entry::Occupied(_) => Err(CredentialStoreError::EmailTaken(email.as_str().to_string())),
            Entry::Vacant(slot) => {
                let user = User {
                    id: UserId::new(),
                    email: email.clone(),
                    password_hash: password_hash.to_string(),
                    is_active: true,
                    created_at: Utc::now(),
                };
                slot.insert(user.clone());
                Ok(user)
            }
        }
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, CredentialStoreError> {
        Ok(self.lock()?.get(email.as_str()).cloned())
    }
}
