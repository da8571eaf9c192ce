//! Drinks Service Library
//!
//! A small HTTP API over a drinks table with role-based access control
//! enforced via externally-issued RS256 bearer tokens:
//!
//! - Public drink listing; privileged detail, create, update and delete
//! - Token verification against the issuer's JWKS (cached, single-flight
//!   refresh)
//! - Per-route permission checks ahead of every protected handler
//!
//! # Architecture
//!
//! ```text
//! routes/mod.rs -> middleware/auth.rs -> handlers/*.rs -> repositories/*.rs
//!                        |
//!                  auth/gate.rs -> auth/extract.rs
//!                               -> auth/verify.rs -> auth/jwks.rs
//!                               -> auth/permissions.rs
//! ```
//!
//! # Modules
//!
//! - `auth` - token verification and permission checking
//! - `config` - service configuration from environment
//! - `errors` - error types with HTTP status code mapping
//! - `handlers` - HTTP request handlers
//! - `middleware` - auth middleware for protected routes
//! - `models` - data models and request validation
//! - `repositories` - database access
//! - `routes` - Axum router setup

pub mod auth;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
