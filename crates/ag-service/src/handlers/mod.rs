//! HTTP request handlers.

pub mod auth_handler;
pub mod health;
pub mod metrics;
pub mod user_handler;
pub mod verify_handler;

pub use auth_handler::{login, logout, register};
pub use health::health_check;
pub use metrics::metrics_handler;
pub use user_handler::{account, get_user, list_users, not_found};
pub use verify_handler::verify_server_token;
