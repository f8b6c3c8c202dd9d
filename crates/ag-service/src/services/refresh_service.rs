//! Refresh-credential rotation.
//!
//! A user holds at most one active refresh credential. Rotation exchanges
//! the presented credential for a fresh access token plus a fresh
//! credential through a compare-and-swap on the stored value, so two
//! clients racing with the same credential produce exactly one winner.

use std::fmt;

use tracing::instrument;
use uuid::Uuid;

use crate::config::Config;
use crate::errors::AuthError;
use crate::observability::hash_for_correlation;
use crate::observability::metrics::record_refresh_rotation;
use crate::store::UserStore;
use crate::token::{self, SessionClaims};

/// Both halves of a freshly rotated session.
#[derive(Clone)]
pub struct RotatedSession {
    pub access_token: String,
    pub refresh_token: String,
}

impl fmt::Debug for RotatedSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RotatedSession")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .finish()
    }
}

/// Exchange `presented` for a fresh access token and refresh credential.
///
/// Returns [`AuthError::RefreshNotFound`] when the credential is not on
/// record or a concurrent rotation replaced it first. A failed swap
/// discards the access token issued earlier in the attempt, so a loser
/// never walks away with usable credentials.
#[instrument(skip_all)]
pub async fn rotate(
    store: &dyn UserStore,
    config: &Config,
    presented: &str,
) -> Result<RotatedSession, AuthError> {
    let result = rotate_once(store, config, presented).await;

    match &result {
        Ok(_) => record_refresh_rotation("success"),
        Err(AuthError::RefreshNotFound) => record_refresh_rotation("not_found"),
        Err(_) => record_refresh_rotation("error"),
    }

    result
}

async fn rotate_once(
    store: &dyn UserStore,
    config: &Config,
    presented: &str,
) -> Result<RotatedSession, AuthError> {
    let Some(user) = store.find_by_refresh_token(presented).await? else {
        tracing::debug!(
            credential = %hash_for_correlation(presented),
            "Refresh credential not on record"
        );
        return Err(AuthError::RefreshNotFound);
    };

    let group_with_roles = store.roles_for(&user).await?;

    let claims = SessionClaims::new(
        &user.email,
        &user.username,
        group_with_roles,
        config.token_ttl_seconds,
    );
    let access_token = token::issue(&claims, &config.jwt_secret)?;

    let next = Uuid::new_v4().to_string();
    let swapped = store
        .swap_refresh_token(&user.email, presented, &next)
        .await?;

    if !swapped {
        tracing::info!(
            user = %hash_for_correlation(&user.email),
            "Refresh credential already rotated by a concurrent request"
        );
        return Err(AuthError::RefreshNotFound);
    }

    tracing::debug!(
        user = %hash_for_correlation(&user.email),
        "Rotated refresh credential"
    );

    Ok(RotatedSession {
        access_token,
        refresh_token: next,
    })
}
