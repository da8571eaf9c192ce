//! Middleware for the drinks service.
//!
//! # Components
//!
//! - `auth` - authorization middleware for protected routes

pub mod auth;

pub use auth::{require_auth, require_permission, ClaimsExt};
