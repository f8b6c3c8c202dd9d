//! In-memory user store.
//!
//! Backs the test harness and local demos. A single `Mutex` guards the
//! whole map, which makes the credential compare-and-swap atomic without
//! any further coordination.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use uuid::Uuid;

use super::{NewUser, StoreError, UserRecord, UserStore};
use crate::token::{GroupRoles, RoleGrant};

#[derive(Default)]
pub struct MemoryUserStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    /// Keyed by email.
    users: HashMap<String, UserRecord>,
    /// Group name to ordered role grants.
    group_roles: HashMap<String, Vec<RoleGrant>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define (or replace) the role grants a group confers.
    pub fn set_group_roles(&self, group_name: &str, roles: Vec<RoleGrant>) {
        if let Ok(mut inner) = self.lock() {
            inner.group_roles.insert(group_name.to_string(), roles);
        }
    }

    /// Insert a fully specified user row, replacing any existing row for
    /// the same email. Test seeding helper.
    pub fn seed_user(&self, record: UserRecord) {
        if let Ok(mut inner) = self.lock() {
            inner.users.insert(record.email.clone(), record);
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, StoreError> {
        self.inner
            .lock()
            .map_err(|_| StoreError::Database("user store mutex poisoned".to_string()))
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        Ok(self.lock()?.users.get(email).cloned())
    }

    async fn find_by_id(&self, user_id: Uuid) -> Result<Option<UserRecord>, StoreError> {
        Ok(self
            .lock()?
            .users
            .values()
            .find(|u| u.user_id == user_id)
            .cloned())
    }

    async fn find_by_refresh_token(
        &self,
        value: &str,
    ) -> Result<Option<UserRecord>, StoreError> {
        Ok(self
            .lock()?
            .users
            .values()
            .find(|u| u.refresh_token.as_deref() == Some(value))
            .cloned())
    }

    async fn create_user(&self, new_user: NewUser) -> Result<UserRecord, StoreError> {
        let mut inner = self.lock()?;

        if inner.users.contains_key(&new_user.email) {
            return Err(StoreError::DuplicateEmail);
        }

        let record = UserRecord {
            user_id: Uuid::new_v4(),
            email: new_user.email.clone(),
            username: new_user.username,
            password_hash: new_user.password_hash,
            group_name: new_user.group_name,
            refresh_token: None,
        };

        inner.users.insert(new_user.email, record.clone());
        Ok(record)
    }

    async fn set_refresh_token(&self, email: &str, value: &str) -> Result<(), StoreError> {
        // Unknown email is a no-op, matching an UPDATE that hits zero rows.
        if let Some(user) = self.lock()?.users.get_mut(email) {
            user.refresh_token = Some(value.to_string());
        }
        Ok(())
    }

    async fn swap_refresh_token(
        &self,
        email: &str,
        expected: &str,
        next: &str,
    ) -> Result<bool, StoreError> {
        let mut inner = self.lock()?;

        match inner.users.get_mut(email) {
            Some(user) if user.refresh_token.as_deref() == Some(expected) => {
                user.refresh_token = Some(next.to_string());
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn clear_refresh_token(&self, value: &str) -> Result<(), StoreError> {
        let mut inner = self.lock()?;

        for user in inner.users.values_mut() {
            if user.refresh_token.as_deref() == Some(value) {
                user.refresh_token = None;
            }
        }

        Ok(())
    }

    async fn roles_for(&self, user: &UserRecord) -> Result<GroupRoles, StoreError> {
        let roles = self
            .lock()?
            .group_roles
            .get(&user.group_name)
            .cloned()
            .unwrap_or_default();

        Ok(GroupRoles {
            name: user.group_name.clone(),
            roles,
        })
    }

    async fn list_users(&self) -> Result<Vec<UserRecord>, StoreError> {
        let mut users: Vec<UserRecord> = self.lock()?.users.values().cloned().collect();
        users.sort_by(|a, b| a.email.cmp(&b.email));
        Ok(users)
    }
}
