//! # AG Test Utilities
//!
//! Shared test utilities for the Auth Gate (AG) service.
//!
//! This crate provides:
//! - Server test harness (`TestGate` for end-to-end tests over an
//!   in-memory store)
//! - Token fixtures (valid, expired and foreign-signature access tokens)
//! - Response helpers (envelope reading, `Set-Cookie` scraping)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ag_test_utils::*;
//!
//! #[tokio::test]
//! async fn test_example() -> anyhow::Result<()> {
//!     let gate = TestGate::spawn().await?;
//!     gate.seed_user("alice@example.com", "alice", "hunter2hunter2", "dev");
//!     gate.grant_roles("dev", &["/users"]);
//!
//!     let client = reqwest::Client::new();
//!     let response = client
//!         .post(format!("{}/login", gate.url()))
//!         .json(&serde_json::json!({
//!             "email": "alice@example.com",
//!             "password": "hunter2hunter2",
//!         }))
//!         .send()
//!         .await?;
//!
//!     let body = read_envelope(response, 0).await;
//!     Ok(())
//! }
//! ```

pub mod gate_harness;
pub mod responses;

// Re-export commonly used items
pub use gate_harness::*;
pub use responses::*;
