//! Access-token codec: HS256-signed session claims.
//!
//! Pure functions of payload, secret and clock. The codec never touches the
//! user store; refresh-credential handling lives in the services layer.

use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::errors::AuthError;

/// Tokens larger than this are rejected before any parsing (DoS guard).
pub const MAX_TOKEN_SIZE_BYTES: usize = 4096;

/// Payload carried inside the access token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionClaims {
    pub email: String,
    pub username: String,
    pub group_with_roles: GroupRoles,
    /// Issued-at (UTC seconds)
    pub iat: i64,
    /// Expiry (UTC seconds)
    pub exp: i64,
}

/// A user's group together with the role grants it confers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GroupRoles {
    pub name: String,
    pub roles: Vec<RoleGrant>,
}

/// A single path pattern a group is allowed to reach.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoleGrant {
    pub url: String,
    pub description: String,
}

/// Three-way outcome of token verification.
///
/// `Expired` is only reported when the signature checked out; any
/// signature, shape or size problem is `Invalid`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenVerdict {
    Valid(SessionClaims),
    Expired,
    Invalid,
}

impl SessionClaims {
    /// Stamp a fresh claim set: `iat = now`, `exp = now + ttl`.
    pub fn new(
        email: impl Into<String>,
        username: impl Into<String>,
        group_with_roles: GroupRoles,
        ttl_seconds: i64,
    ) -> Self {
        let now = Utc::now().timestamp();
        Self {
            email: email.into(),
            username: username.into(),
            group_with_roles,
            iat: now,
            exp: now + ttl_seconds,
        }
    }
}

/// Sign `claims` into a compact HS256 token.
///
/// On failure the cause is logged and the caller gets a generic
/// `AuthError::Crypto`; no partial token ever escapes.
#[instrument(skip_all)]
pub fn issue(claims: &SessionClaims, secret: &SecretString) -> Result<String, AuthError> {
    let key = EncodingKey::from_secret(secret.expose_secret().as_bytes());

    encode(&Header::new(Algorithm::HS256), claims, &key).map_err(|e| {
        tracing::error!(error = %e, "Failed to sign access token");
        AuthError::Crypto("token signing failed".to_string())
    })
}

/// Check a presented token against the signing secret and the clock.
#[instrument(skip_all)]
pub fn verify(token: &str, secret: &SecretString) -> TokenVerdict {
    if token.len() > MAX_TOKEN_SIZE_BYTES {
        tracing::warn!(size = token.len(), "Rejecting oversized token");
        return TokenVerdict::Invalid;
    }

    let key = DecodingKey::from_secret(secret.expose_secret().as_bytes());
    let mut validation = Validation::new(Algorithm::HS256);
    // No leeway: a token is expired the second `exp` passes.
    validation.leeway = 0;

    match decode::<SessionClaims>(token, &key, &validation) {
        Ok(data) => TokenVerdict::Valid(data.claims),
        // jsonwebtoken checks the signature before the expiry claim, so
        // ExpiredSignature implies an authentic token.
        Err(e) if matches!(e.kind(), ErrorKind::ExpiredSignature) => TokenVerdict::Expired,
        Err(e) => {
            tracing::debug!(error = %e, "Token failed verification");
            TokenVerdict::Invalid
        }
    }
}
