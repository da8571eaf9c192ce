//! Bearer token extraction from request headers.
//!
//! Pulls the token out of the `Authorization` header and validates its
//! syntax. Nothing here inspects the token itself; that is the verifier's
//! job.

use crate::errors::AuthError;
use axum::http::{header::AUTHORIZATION, HeaderMap};

/// Extract the bearer token from the `Authorization` header.
///
/// The header must be exactly two space-separated parts: a scheme equal to
/// `"Bearer"` (case-insensitive) and a non-empty token.
///
/// # Errors
///
/// - `MissingAuthHeader` - no `Authorization` header present
/// - `MalformedHeader` - wrong scheme, missing token, trailing segments, or
///   a non-ASCII header value
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let header = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingAuthHeader)?;

    let value = header.to_str().map_err(|_| AuthError::MalformedHeader)?;

    let parts: Vec<&str> = value.split(' ').collect();
    let (scheme, token) = match parts.as_slice() {
        [scheme, token] => (*scheme, *token),
        _ => return Err(AuthError::MalformedHeader),
    };

    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return Err(AuthError::MalformedHeader);
    }

    Ok(token)
}
