//! Authorization core.
//!
//! Verifies externally-issued RS256 bearer tokens against the issuer's
//! published key set and enforces per-operation permission checks.
//!
//! # Components
//!
//! - `jwks` - fetches and caches the issuer's public signing keys
//! - `extract` - pulls the bearer token out of the Authorization header
//! - `verify` - validates signature and claims against the key set
//! - `claims` - the verified claim set
//! - `permissions` - checks a required capability against the claims
//! - `gate` - composes the above into the per-request guard

pub mod claims;
pub mod extract;
pub mod gate;
pub mod jwks;
pub mod permissions;
pub mod verify;

pub use claims::Claims;
pub use gate::AuthGate;
pub use jwks::JwksClient;
pub use verify::TokenVerifier;
