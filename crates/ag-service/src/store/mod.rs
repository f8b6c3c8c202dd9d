//! User store contract.
//!
//! The service talks to persistence through the [`UserStore`] trait so the
//! HTTP layer can run against Postgres in production and an in-memory map
//! in tests and demos.

pub mod memory;
pub mod postgres;

pub use memory::MemoryUserStore;
pub use postgres::PgUserStore;

use std::fmt;

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::AuthError;
use crate::token::GroupRoles;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Email already in use")]
    DuplicateEmail,
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateEmail => AuthError::DuplicateEmail,
            StoreError::Database(detail) => AuthError::Store(detail),
        }
    }
}

/// A stored user row.
#[derive(Clone, sqlx::FromRow)]
pub struct UserRecord {
    pub user_id: Uuid,
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub group_name: String,
    /// The single active refresh credential, if a session exists.
    pub refresh_token: Option<String>,
}

/// Credential material must not leak through debug output.
impl fmt::Debug for UserRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserRecord")
            .field("user_id", &self.user_id)
            .field("email", &self.email)
            .field("username", &self.username)
            .field("password_hash", &"[REDACTED]")
            .field("group_name", &self.group_name)
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

/// Input to [`UserStore::create_user`]; the password arrives already
/// bcrypt-hashed.
#[derive(Clone)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub group_name: String,
}

impl fmt::Debug for NewUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewUser")
            .field("email", &self.email)
            .field("username", &self.username)
            .field("password_hash", &"[REDACTED]")
            .field("group_name", &self.group_name)
            .finish()
    }
}

/// Persistence operations the gate needs.
///
/// Used as `Arc<dyn UserStore>` behind the router state.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError>;

    async fn find_by_id(&self, user_id: Uuid) -> Result<Option<UserRecord>, StoreError>;

    async fn find_by_refresh_token(&self, value: &str)
        -> Result<Option<UserRecord>, StoreError>;

    async fn create_user(&self, new_user: NewUser) -> Result<UserRecord, StoreError>;

    /// Unconditionally install a fresh refresh credential (login).
    async fn set_refresh_token(&self, email: &str, value: &str) -> Result<(), StoreError>;

    /// Compare-and-swap the refresh credential. Returns `false` when the
    /// stored value no longer equals `expected` (a concurrent rotation
    /// won, or the session was cleared).
    async fn swap_refresh_token(
        &self,
        email: &str,
        expected: &str,
        next: &str,
    ) -> Result<bool, StoreError>;

    /// Drop the stored credential matching `value` (logout).
    async fn clear_refresh_token(&self, value: &str) -> Result<(), StoreError>;

    /// Resolve the group and role grants for a user. Users in a group
    /// with no grants get an empty role set, not an error.
    async fn roles_for(&self, user: &UserRecord) -> Result<GroupRoles, StoreError>;

    async fn list_users(&self) -> Result<Vec<UserRecord>, StoreError>;
}
