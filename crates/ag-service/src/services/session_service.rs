//! Session establishment: login, registration and logout.

use std::fmt;
use std::time::Instant;

use tracing::instrument;
use uuid::Uuid;

use crate::config::Config;
use crate::errors::AuthError;
use crate::models::{LoginRequest, PublicUser, RegisterRequest, SessionData};
use crate::observability::hash_for_correlation;
use crate::observability::metrics::{record_bcrypt_duration, record_login};
use crate::store::{NewUser, UserStore};
use crate::token::{self, SessionClaims};

const MIN_PASSWORD_LENGTH: usize = 8;

/// Group assigned to self-registered users.
pub const DEFAULT_GROUP: &str = "member";

/// Well-formed bcrypt hash verified when the email has no account, so a
/// miss costs the same as a wrong password (prevents account enumeration
/// by timing).
const DUMMY_BCRYPT_HASH: &str = "$2b$12$LQv3c1yqBWVHxkd0LHAkCOYz6TtxMQJqhN8/LewY5GyYqExt7YD3a";

/// A successful login: the response payload plus the refresh credential
/// destined for the session cookie.
#[derive(Clone)]
pub struct EstablishedSession {
    pub data: SessionData,
    pub refresh_token: String,
}

impl fmt::Debug for EstablishedSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EstablishedSession")
            .field("data", &self.data)
            .field("refresh_token", &"[REDACTED]")
            .finish()
    }
}

/// Verify a password and start a session.
///
/// Installs a fresh refresh credential unconditionally, so logging in
/// revokes any session the user already had.
#[instrument(skip_all)]
pub async fn login(
    store: &dyn UserStore,
    config: &Config,
    request: LoginRequest,
) -> Result<EstablishedSession, AuthError> {
    let result = login_once(store, config, request).await;

    match &result {
        Ok(_) => record_login("success"),
        Err(AuthError::InvalidCredentials) => record_login("invalid_credentials"),
        Err(_) => record_login("error"),
    }

    result
}

async fn login_once(
    store: &dyn UserStore,
    config: &Config,
    request: LoginRequest,
) -> Result<EstablishedSession, AuthError> {
    let user = store.find_by_email(&request.email).await?;

    // Always run bcrypt, against a dummy hash when the account is missing.
    let hash_to_verify = match &user {
        Some(u) => u.password_hash.as_str(),
        None => DUMMY_BCRYPT_HASH,
    };

    let started = Instant::now();
    let verify_result = bcrypt::verify(&request.password, hash_to_verify);
    record_bcrypt_duration("verify", started.elapsed());

    let password_ok = verify_result.map_err(|e| {
        tracing::error!(error = %e, "Password verification failed");
        AuthError::Crypto("password verification failed".to_string())
    })?;

    let user = user.ok_or(AuthError::InvalidCredentials)?;
    if !password_ok {
        tracing::debug!(
            user = %hash_for_correlation(&user.email),
            "Password mismatch"
        );
        return Err(AuthError::InvalidCredentials);
    }

    let group_with_roles = store.roles_for(&user).await?;

    let claims = SessionClaims::new(
        &user.email,
        &user.username,
        group_with_roles.clone(),
        config.token_ttl_seconds,
    );
    let access_token = token::issue(&claims, &config.jwt_secret)?;

    let refresh_token = Uuid::new_v4().to_string();
    store.set_refresh_token(&user.email, &refresh_token).await?;

    tracing::info!(
        user = %hash_for_correlation(&user.email),
        "Session established"
    );

    Ok(EstablishedSession {
        data: SessionData {
            access_token,
            email: user.email,
            username: user.username,
            group_with_roles,
        },
        refresh_token,
    })
}

/// Create an account in the default group.
///
/// The email must look like an address, the password must meet the
/// minimum length and the username must be non-blank. Registration does
/// not log the user in; clients follow up with a login call.
#[instrument(skip_all)]
pub async fn register(
    store: &dyn UserStore,
    config: &Config,
    request: RegisterRequest,
) -> Result<PublicUser, AuthError> {
    if !is_valid_email(&request.email) {
        return Err(AuthError::Validation("Invalid email format".to_string()));
    }

    if request.password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    let username = request.username.trim();
    if username.is_empty() {
        return Err(AuthError::Validation(
            "Username cannot be empty".to_string(),
        ));
    }

    if store.find_by_email(&request.email).await?.is_some() {
        return Err(AuthError::DuplicateEmail);
    }

    let started = Instant::now();
    let hash_result = bcrypt::hash(&request.password, config.bcrypt_cost);
    record_bcrypt_duration("hash", started.elapsed());

    let password_hash = hash_result.map_err(|e| {
        tracing::error!(error = %e, "Password hashing failed");
        AuthError::Crypto("password hashing failed".to_string())
    })?;

    // The unique constraint still catches a concurrent registration that
    // slipped past the lookup above.
    let record = store
        .create_user(NewUser {
            email: request.email.clone(),
            username: username.to_string(),
            password_hash,
            group_name: DEFAULT_GROUP.to_string(),
        })
        .await?;

    tracing::info!(
        user = %hash_for_correlation(&record.email),
        "Registered new user"
    );

    Ok(PublicUser::from(&record))
}

/// Drop the presented refresh credential, ending the session.
///
/// Unknown credentials are a no-op; logout never tells the caller
/// whether the session existed.
#[instrument(skip_all)]
pub async fn logout(store: &dyn UserStore, refresh_token: Option<&str>) -> Result<(), AuthError> {
    let Some(value) = refresh_token else {
        return Ok(());
    };

    store.clear_refresh_token(value).await?;

    tracing::debug!(
        credential = %hash_for_correlation(value),
        "Cleared refresh credential"
    );

    Ok(())
}

/// Basic shape check: `local@domain` with a dotted, non-empty domain.
fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    if local.is_empty() || domain.contains('@') {
        return false;
    }

    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2 && labels.iter().all(|l| !l.is_empty())
}
