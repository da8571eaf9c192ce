//! JWT utilities shared by token-verifying components.
//!
//! This module provides the pieces of token validation that do not depend on
//! the key set or the claim schema:
//! - Size limits for DoS prevention
//! - Leeway bounds for expiry validation
//! - Key ID extraction from unverified JWT headers
//!
//! # Security
//!
//! - Tokens are size-checked BEFORE parsing (DoS prevention)
//! - `extract_kid` never validates a signature; the extracted key ID is only
//!   a lookup hint into a trusted key set, and the token must still be
//!   verified against the key found there

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use std::time::Duration;
use thiserror::Error;

// =============================================================================
// Constants
// =============================================================================

/// Maximum allowed JWT size in bytes (8KB).
///
/// Typical RS256 tokens are 600-900 bytes; the limit leaves room for large
/// permission sets while rejecting oversized tokens before any base64 decode
/// or cryptographic work happens.
pub const MAX_JWT_SIZE_BYTES: usize = 8192; // 8KB

/// Default expiry leeway. The verifier trusts the issuer's clocks; expiry is
/// enforced exactly unless deployment config opts into a tolerance.
pub const DEFAULT_LEEWAY: Duration = Duration::from_secs(0);

/// Maximum allowed expiry leeway (10 minutes).
///
/// Prevents misconfiguration that would keep expired tokens usable for an
/// excessive window.
pub const MAX_LEEWAY: Duration = Duration::from_secs(600);

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur while inspecting an unverified token.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JwtInspectError {
    /// Token size exceeds maximum allowed.
    #[error("token exceeds the maximum allowed size")]
    TokenTooLarge,

    /// Token format is invalid (not a valid JWT structure).
    #[error("token is not a valid JWT")]
    MalformedToken,

    /// Token header does not carry a usable `kid`.
    #[error("token header is missing a key identifier")]
    MissingKid,
}

// =============================================================================
// Functions
// =============================================================================

/// Extract the `kid` (key ID) from a JWT header without verifying the signature.
///
/// Used to look up the correct public key in a key set when multiple keys may
/// be valid (e.g., during key rotation).
///
/// # Errors
///
/// - `TokenTooLarge` - token exceeds [`MAX_JWT_SIZE_BYTES`]
/// - `MalformedToken` - not three dot-separated segments, bad base64, or
///   invalid header JSON
/// - `MissingKid` - header has no `kid`, or `kid` is not a non-empty string
pub fn extract_kid(token: &str) -> Result<String, JwtInspectError> {
    // Size check first, before any decoding work.
    if token.len() > MAX_JWT_SIZE_BYTES {
        tracing::debug!(
            target: "common.jwt",
            token_size = token.len(),
            max_size = MAX_JWT_SIZE_BYTES,
            "Token rejected: size exceeds maximum allowed"
        );
        return Err(JwtInspectError::TokenTooLarge);
    }

    // JWT format: header.payload.signature
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        tracing::debug!(
            target: "common.jwt",
            parts = parts.len(),
            "Token rejected: invalid JWT format"
        );
        return Err(JwtInspectError::MalformedToken);
    }

    let header_part = parts.first().ok_or(JwtInspectError::MalformedToken)?;
    let header_bytes = URL_SAFE_NO_PAD.decode(header_part).map_err(|e| {
        tracing::debug!(target: "common.jwt", error = %e, "Failed to decode JWT header base64");
        JwtInspectError::MalformedToken
    })?;

    let header: serde_json::Value = serde_json::from_slice(&header_bytes).map_err(|e| {
        tracing::debug!(target: "common.jwt", error = %e, "Failed to parse JWT header JSON");
        JwtInspectError::MalformedToken
    })?;

    // Empty kid values are rejected so a blank string can never select a key.
    let kid = header
        .get("kid")
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .ok_or(JwtInspectError::MissingKid)?;

    Ok(kid)
}

// =============================================================================
// Tests
// =============================================================================
