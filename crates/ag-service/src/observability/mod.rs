//! Observability helpers.
//!
//! Instrumentation is privacy-first: spans use `#[instrument(skip_all)]`
//! with explicit safe fields, user identifiers go through
//! [`hash_for_correlation`] before they reach a log line, and token or
//! credential material never appears at all.

pub mod metrics;

use sha2::{Digest, Sha256};

/// Hash a field value for correlation in logs (SHA-256, first 8 hex chars).
///
/// One-way and truncated: enough to correlate log entries for one user,
/// not enough to recover the identifier.
pub fn hash_for_correlation(value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    let mut digest = hex::encode(hasher.finalize());
    digest.truncate(8);
    digest
}

/// Error categories for metrics labels (bounded cardinality).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Missing, expired or unrefreshable session
    Authentication,
    /// Role check failures
    Authorization,
    /// Signature and token-shape failures
    Cryptographic,
    /// Malformed client input
    Validation,
    /// Store and system errors
    Internal,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Authentication => "authentication",
            ErrorCategory::Authorization => "authorization",
            ErrorCategory::Cryptographic => "cryptographic",
            ErrorCategory::Validation => "validation",
            ErrorCategory::Internal => "internal",
        }
    }
}

impl From<&crate::errors::AuthError> for ErrorCategory {
    fn from(err: &crate::errors::AuthError) -> Self {
        use crate::errors::AuthError;
        match err {
            AuthError::InvalidCredentials
            | AuthError::NotAuthenticated
            | AuthError::TokenExpired
            | AuthError::RefreshNotFound
            | AuthError::MissingServerToken => ErrorCategory::Authentication,
            AuthError::Forbidden => ErrorCategory::Authorization,
            AuthError::Crypto(_) | AuthError::ServerTokenRejected => ErrorCategory::Cryptographic,
            AuthError::Validation(_) | AuthError::DuplicateEmail | AuthError::NotFound => {
                ErrorCategory::Validation
            }
            AuthError::Store(_) | AuthError::Internal => ErrorCategory::Internal,
        }
    }
}
