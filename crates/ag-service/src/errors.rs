use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Non-standard status used by the wire contract for "token expired,
/// re-send the request with refreshed credentials".
pub const EXPIRED_TOKEN_STATUS: u16 = 433;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Store error: {0}")]
    Store(String),

    #[error("Cryptographic error: {0}")]
    Crypto(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Access token expired")]
    TokenExpired,

    #[error("Refresh credential not recognized")]
    RefreshNotFound,

    #[error("Server token rejected")]
    ServerTokenRejected,

    #[error("No server token supplied")]
    MissingServerToken,

    #[error("Insufficient role")]
    Forbidden,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Email already in use")]
    DuplicateEmail,

    #[error("Resource not found")]
    NotFound,

    #[error("Internal server error")]
    Internal,
}

#[derive(Serialize)]
struct ErrorEnvelope {
    error_code: i32,
    data: serde_json::Value,
    message: String,
}

impl AuthError {
    /// HTTP status for this error. 433 is not a registered status code, so
    /// it goes through `from_u16` with a 401 fallback that cannot trigger
    /// for an in-range value.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::Store(_) | AuthError::Crypto(_) | AuthError::Internal => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AuthError::InvalidCredentials | AuthError::NotAuthenticated => {
                StatusCode::UNAUTHORIZED
            }
            AuthError::TokenExpired
            | AuthError::RefreshNotFound
            | AuthError::ServerTokenRejected => {
                StatusCode::from_u16(EXPIRED_TOKEN_STATUS).unwrap_or(StatusCode::UNAUTHORIZED)
            }
            AuthError::MissingServerToken => StatusCode::PAYMENT_REQUIRED,
            AuthError::Forbidden => StatusCode::FORBIDDEN,
            AuthError::Validation(_) | AuthError::DuplicateEmail => StatusCode::BAD_REQUEST,
            AuthError::NotFound => StatusCode::NOT_FOUND,
        }
    }

    /// Client-facing message. Internal causes stay in the logs.
    fn client_message(&self) -> String {
        match self {
            AuthError::Store(_) | AuthError::Crypto(_) | AuthError::Internal => {
                "An internal error occurred".to_string()
            }
            AuthError::InvalidCredentials => "Invalid email or password".to_string(),
            AuthError::NotAuthenticated => "Not authenticated".to_string(),
            AuthError::TokenExpired | AuthError::RefreshNotFound => {
                "The access token has expired".to_string()
            }
            AuthError::ServerTokenRejected => "The token is invalid or expired".to_string(),
            AuthError::MissingServerToken => "No token supplied".to_string(),
            AuthError::Forbidden => {
                "You do not have permission to access this resource".to_string()
            }
            AuthError::Validation(message) => message.clone(),
            AuthError::DuplicateEmail => "Email is already in use".to_string(),
            AuthError::NotFound => "Resource not found".to_string(),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let envelope = ErrorEnvelope {
            error_code: -1,
            data: serde_json::Value::Null,
            message: self.client_message(),
        };

        (self.status_code(), Json(envelope)).into_response()
    }
}
