//! Authorization middleware: role grants against the request path.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use std::sync::Arc;
use tracing::instrument;

use crate::errors::AuthError;
use crate::models::AuthenticatedUser;
use crate::observability::hash_for_correlation;
use crate::observability::metrics::record_access_decision;
use crate::routes::AppState;

/// Gate each request on the identity's role grants.
///
/// Public paths bypass entirely. The self-service path bypasses role
/// matching but still demands an authenticated identity. Everything
/// else needs at least one grant whose pattern matches the path.
#[instrument(skip_all)]
pub async fn authorize(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let path = req.uri().path().to_string();

    if super::is_public_path(&state.config, &path) {
        record_access_decision("bypass");
        return Ok(next.run(req).await);
    }

    let Some(user) = req.extensions().get::<AuthenticatedUser>() else {
        // The authenticator attaches identity for every guarded path;
        // reaching this point without one means the request never went
        // through it.
        tracing::warn!(path, "Authorization reached without identity");
        record_access_decision("denied");
        return Err(AuthError::NotAuthenticated);
    };

    if path == state.config.self_service_path {
        record_access_decision("bypass");
        return Ok(next.run(req).await);
    }

    let roles = &user.claims.group_with_roles.roles;
    let granted = roles.iter().any(|role| pattern_matches(&role.url, &path));

    if !granted {
        record_access_decision("denied");
        tracing::debug!(
            user = %hash_for_correlation(&user.claims.email),
            path,
            "No role grants this path"
        );
        return Err(AuthError::Forbidden);
    }

    record_access_decision("granted");
    Ok(next.run(req).await)
}

/// The single seam for role-pattern matching.
///
/// A pattern grants a path when it equals the path or appears anywhere
/// inside it: `/users` grants `/users/5` and also `/usersX`.
pub fn pattern_matches(pattern: &str, path: &str) -> bool {
    pattern == path || path.contains(pattern)
}
