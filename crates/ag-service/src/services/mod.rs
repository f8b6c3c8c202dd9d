//! Business logic layer: session establishment and refresh rotation.

pub mod refresh_service;
pub mod session_service;
