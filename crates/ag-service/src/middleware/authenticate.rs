//! Authentication middleware: token verification and session refresh.

use axum::extract::{Request, State};
use axum::http::{header, HeaderMap};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use std::sync::Arc;
use tracing::instrument;

use crate::cookies::{self, ACCESS_COOKIE_NAME, REFRESH_COOKIE_NAME};
use crate::errors::AuthError;
use crate::models::AuthenticatedUser;
use crate::observability::metrics::record_token_verification;
use crate::routes::AppState;
use crate::services::refresh_service;
use crate::token::{self, TokenVerdict};

/// Establish identity for every non-public request.
///
/// The token candidate is the `access-token` cookie when present, else
/// the `Authorization: Bearer` header. A valid token attaches
/// [`AuthenticatedUser`] as a request extension and passes through. An
/// expired token (or a missing one alongside a refresh cookie) drives
/// one rotation attempt; the current request is answered with status
/// 433 either way, carrying fresh cookies only when rotation succeeded.
/// Anything else is 401.
#[instrument(skip_all)]
pub async fn authenticate(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    if super::is_public_path(&state.config, req.uri().path()) {
        return Ok(next.run(req).await);
    }

    let access_cookie = cookies::get_cookie(req.headers(), ACCESS_COOKIE_NAME);
    let refresh_cookie = cookies::get_cookie(req.headers(), REFRESH_COOKIE_NAME);

    // Cookie wins over the Authorization header.
    let candidate = access_cookie.or_else(|| bearer_token(req.headers()));

    let Some(candidate) = candidate else {
        record_token_verification("missing");
        return match refresh_cookie {
            // No access token, but the session may still be recoverable.
            Some(refresh) => Ok(refresh_and_reject(&state, &refresh).await),
            None => {
                tracing::debug!("No access token presented");
                Err(AuthError::NotAuthenticated)
            }
        };
    };

    match token::verify(&candidate, &state.config.jwt_secret) {
        TokenVerdict::Valid(claims) => {
            record_token_verification("valid");
            req.extensions_mut().insert(AuthenticatedUser {
                claims,
                access_token: Some(candidate),
                refresh_token: refresh_cookie,
            });
            Ok(next.run(req).await)
        }
        TokenVerdict::Expired => {
            record_token_verification("expired");
            match refresh_cookie {
                Some(refresh) => Ok(refresh_and_reject(&state, &refresh).await),
                None => {
                    tracing::debug!("Expired token without a refresh credential");
                    Err(AuthError::TokenExpired)
                }
            }
        }
        TokenVerdict::Invalid => {
            record_token_verification("invalid");
            Err(AuthError::NotAuthenticated)
        }
    }
}

/// Rotate the refresh credential, then reject the current request.
///
/// The 433 response carries fresh cookies when rotation succeeded and
/// nothing otherwise; the client never gets a success response off the
/// back of an expired token, only the means to retry.
async fn refresh_and_reject(state: &AppState, refresh: &str) -> Response {
    let mut response = AuthError::TokenExpired.into_response();

    match refresh_service::rotate(state.store.as_ref(), &state.config, refresh).await {
        Ok(session) => {
            let headers = response.headers_mut();
            cookies::append_set_cookie(
                headers,
                &cookies::access_cookie(
                    &session.access_token,
                    state.config.access_cookie_max_age,
                ),
            );
            cookies::append_set_cookie(
                headers,
                &cookies::refresh_cookie(&session.refresh_token),
            );
        }
        Err(e) => {
            tracing::debug!(error = %e, "Refresh rotation failed; rejecting without cookies");
        }
    }

    response
}

/// `Authorization: Bearer <token>` header extraction.
fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::to_string)
}
