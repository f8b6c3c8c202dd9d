//! Login, logout and registration endpoints.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::sync::Arc;
use tracing::instrument;

use crate::cookies::{self, REFRESH_COOKIE_NAME};
use crate::errors::AuthError;
use crate::models::{ApiResponse, LoginRequest, RegisterRequest};
use crate::routes::AppState;
use crate::services::session_service;

/// `POST /login`
///
/// Verifies the password and answers with the session payload, setting
/// the `access-token` and `refresh-token` cookies alongside.
#[instrument(skip_all)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> Result<Response, AuthError> {
    let session = session_service::login(state.store.as_ref(), &state.config, request).await?;

    let access_cookie = cookies::access_cookie(
        &session.data.access_token,
        state.config.access_cookie_max_age,
    );
    let refresh_cookie = cookies::refresh_cookie(&session.refresh_token);

    let mut response = Json(ApiResponse::success(session.data)).into_response();
    let headers = response.headers_mut();
    cookies::append_set_cookie(headers, &access_cookie);
    cookies::append_set_cookie(headers, &refresh_cookie);

    Ok(response)
}

/// `POST /logout`
///
/// Expires both cookies. Revoking the stored credential is best-effort:
/// a store failure is logged, and the client still walks away logged
/// out.
#[instrument(skip_all)]
pub async fn logout(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let refresh = cookies::get_cookie(&headers, REFRESH_COOKIE_NAME);

    if let Err(e) = session_service::logout(state.store.as_ref(), refresh.as_deref()).await {
        tracing::warn!(error = %e, "Failed to revoke refresh credential during logout");
    }

    let mut response = Json(ApiResponse::success(serde_json::Value::Null)).into_response();
    let headers = response.headers_mut();
    cookies::append_set_cookie(headers, &cookies::clear_access_cookie());
    cookies::append_set_cookie(headers, &cookies::clear_refresh_cookie());

    response
}

/// `POST /register`
///
/// Creates an account in the default group. The new user logs in with a
/// follow-up call; no session is established here.
#[instrument(skip_all)]
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AuthError> {
    let user = session_service::register(state.store.as_ref(), &state.config, request).await?;
    Ok(Json(ApiResponse::success(user)))
}
