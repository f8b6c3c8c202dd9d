//! Server-to-server token verification endpoint.

use axum::extract::State;
use axum::http::{header, HeaderMap};
use axum::response::IntoResponse;
use axum::Json;
use std::sync::Arc;
use tracing::instrument;

use crate::errors::AuthError;
use crate::models::ApiResponse;
use crate::observability::metrics::record_server_verification;
use crate::routes::AppState;
use crate::token::{self, TokenVerdict};

/// `GET /verify-server-token`
///
/// Lets a peer service confirm a token it received before acting on it.
/// Only the `Authorization` header is consulted; cookies never are, so
/// the endpoint stays listed public and the authenticator leaves the
/// request alone. Expired counts as a failure here: the gate does not
/// vouch for stale peers.
#[instrument(skip_all)]
pub async fn verify_server_token(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AuthError> {
    let Some(token) = bearer_token(&headers) else {
        record_server_verification("missing");
        return Err(AuthError::MissingServerToken);
    };

    match token::verify(&token, &state.config.jwt_secret) {
        TokenVerdict::Valid(claims) => {
            record_server_verification("valid");
            Ok(Json(ApiResponse::success(claims)))
        }
        TokenVerdict::Expired => {
            record_server_verification("expired");
            Err(AuthError::ServerTokenRejected)
        }
        TokenVerdict::Invalid => {
            record_server_verification("invalid");
            Err(AuthError::ServerTokenRejected)
        }
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_string)
}
