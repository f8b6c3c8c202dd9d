//! Account echo, user lookup endpoints and the guarded-set fallback.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::{Extension, Json};
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use crate::errors::AuthError;
use crate::models::{ApiResponse, AuthenticatedUser, PublicUser};
use crate::routes::AppState;

/// `GET /account`
///
/// Echoes the identity the authenticator attached, including the raw
/// token values the request presented. Exempt from the role check.
#[instrument(skip_all)]
pub async fn account(
    Extension(user): Extension<AuthenticatedUser>,
) -> Json<ApiResponse<AuthenticatedUser>> {
    Json(ApiResponse::success(user))
}

/// `GET /users`
#[instrument(skip_all)]
pub async fn list_users(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AuthError> {
    let users = state.store.list_users().await?;
    let users: Vec<PublicUser> = users.iter().map(PublicUser::from).collect();

    Ok(Json(ApiResponse::success(users)))
}

/// `GET /users/{id}`
///
/// Takes the id as a string so a malformed value becomes a 400 envelope
/// instead of axum's plain-text extractor rejection.
#[instrument(skip_all)]
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AuthError> {
    let user_id = Uuid::parse_str(&id)
        .map_err(|_| AuthError::Validation("Invalid user id".to_string()))?;

    let user = state
        .store
        .find_by_id(user_id)
        .await?
        .ok_or(AuthError::NotFound)?;

    Ok(Json(ApiResponse::success(PublicUser::from(&user))))
}

/// Fallback for unmatched paths inside the guarded set, so unknown
/// paths still answer with the envelope after the guards run.
pub async fn not_found() -> AuthError {
    AuthError::NotFound
}
