//! Auth Gate (AG) Service Library
//!
//! This library provides the authentication and authorization gate that
//! fronts the platform's HTTP services:
//!
//! - Stateless HS256 access tokens carried in an HttpOnly cookie
//! - Rotating opaque refresh credentials (one active per user)
//! - Role-pattern access control over the guarded routes
//! - Server-to-server token verification
//!
//! # Architecture
//!
//! The gate follows the Middleware -> Handler -> Service -> Store pattern:
//!
//! ```text
//! routes/mod.rs -> middleware/*.rs -> handlers/*.rs -> services/*.rs -> store/*.rs
//! ```
//!
//! # Modules
//!
//! - `config` - Service configuration from environment
//! - `cookies` - Cookie header parsing and `Set-Cookie` construction
//! - `errors` - Error types with HTTP status code mapping
//! - `handlers` - HTTP request handlers
//! - `middleware` - Authentication and authorization guards
//! - `models` - Request and response models
//! - `observability` - Metrics and log hygiene helpers
//! - `routes` - Axum router setup
//! - `services` - Business logic layer
//! - `store` - User persistence (Postgres and in-memory)
//! - `token` - Access token issuance and verification

pub mod config;
pub mod cookies;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod observability;
pub mod routes;
pub mod services;
pub mod store;
pub mod token;
