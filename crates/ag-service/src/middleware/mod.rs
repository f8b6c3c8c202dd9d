//! Request guards applied to the main router.
//!
//! `authenticate` runs first and establishes identity from the access
//! token (driving the refresh path when it has expired); `authorize`
//! runs second and matches the identity's role grants against the
//! request path. Both consult the public-path allowlist themselves, so
//! public endpoints live on the same router as protected ones.

pub mod authenticate;
pub mod authorize;

pub use authenticate::authenticate;
pub use authorize::authorize;

use crate::config::Config;

/// Exact-match check against the configured public allowlist.
pub(crate) fn is_public_path(config: &Config, path: &str) -> bool {
    config.public_paths.iter().any(|p| p == path)
}
