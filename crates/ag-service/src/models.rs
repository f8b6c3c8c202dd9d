//! Request and response models for the HTTP surface.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::store::UserRecord;
use crate::token::{GroupRoles, SessionClaims};

/// Wire envelope carried by every JSON response.
///
/// `error_code` is `0` on success and `-1` on failure; failures also use
/// a matching HTTP status (see `errors.rs`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub error_code: i32,
    pub data: T,
    pub message: String,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            error_code: 0,
            data,
            message: "ok".to_string(),
        }
    }
}

#[derive(Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

#[derive(Clone, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub password: String,
}

impl fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("email", &self.email)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Payload returned by a successful login.
#[derive(Clone, Serialize, Deserialize)]
pub struct SessionData {
    pub access_token: String,
    pub email: String,
    pub username: String,
    pub group_with_roles: GroupRoles,
}

impl fmt::Debug for SessionData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionData")
            .field("access_token", &"[REDACTED]")
            .field("email", &self.email)
            .field("username", &self.username)
            .field("group_with_roles", &self.group_with_roles)
            .finish()
    }
}

/// User view safe to return to clients (no credential material).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicUser {
    pub user_id: Uuid,
    pub email: String,
    pub username: String,
    pub group_name: String,
}

impl From<&UserRecord> for PublicUser {
    fn from(record: &UserRecord) -> Self {
        Self {
            user_id: record.user_id,
            email: record.email.clone(),
            username: record.username.clone(),
            group_name: record.group_name.clone(),
        }
    }
}

/// Identity attached as a request extension once an access token
/// verifies. Carries the verified claims plus the raw token values the
/// request presented, so self-service handlers can echo them.
#[derive(Clone, Serialize)]
pub struct AuthenticatedUser {
    pub claims: SessionClaims,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

impl fmt::Debug for AuthenticatedUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthenticatedUser")
            .field("claims", &self.claims)
            .field(
                "access_token",
                &self.access_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}
