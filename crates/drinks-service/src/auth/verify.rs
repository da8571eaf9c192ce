//! Token verification against the issuer's key set.
//!
//! Validates incoming RS256 tokens using public keys fetched from the
//! issuer's JWKS endpoint.
//!
//! # Security
//!
//! - Tokens are size-checked BEFORE parsing (DoS prevention)
//! - The verification key is selected by the declared `kid` matched against
//!   the cached key set - never taken from the token itself
//! - Signature verification happens before any claim is trusted
//! - Only RS256 is accepted; keys with a foreign type or algorithm are
//!   rejected outright

use crate::auth::claims::Claims;
use crate::auth::jwks::{Jwk, JwksClient};
use crate::errors::AuthError;
use common::jwt::extract_kid;
use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use std::sync::Arc;
use tracing::instrument;

/// Token verifier bound to one issuer and audience.
pub struct TokenVerifier {
    /// JWKS client for fetching public keys.
    jwks_client: Arc<JwksClient>,

    /// Expected issuer claim (scheme + domain + trailing slash).
    issuer: String,

    /// Expected audience claim.
    audience: String,

    /// Expiry leeway in seconds.
    leeway_seconds: u64,
}

impl TokenVerifier {
    /// Create a new token verifier.
    pub fn new(
        jwks_client: Arc<JwksClient>,
        issuer: String,
        audience: String,
        leeway_seconds: u64,
    ) -> Self {
        Self {
            jwks_client,
            issuer,
            audience,
            leeway_seconds,
        }
    }

    /// Verify a token and return its claims.
    ///
    /// Steps, in order:
    /// 1. extract the declared `kid` from the unverified header
    ///    (size-checked first)
    /// 2. look the key up in the cached key set
    /// 3. verify the RS256 signature and decode the payload
    /// 4. validate issuer, audience and expiry
    ///
    /// # Errors
    ///
    /// - `MalformedToken` - no usable `kid`, or any decode/signature failure
    /// - `KeyNotFound` - `kid` has no match in the key set
    /// - `KeySetUnavailable` - key set fetch failed, or the matched key
    ///   carries unusable material
    /// - `TokenExpired` - expiry has passed
    /// - `ClaimsInvalid` - issuer or audience mismatch
    #[instrument(skip_all)]
    pub async fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let kid = extract_kid(token).map_err(|e| {
            tracing::debug!(target: "ds.auth.verify", error = ?e, "Token kid extraction failed");
            AuthError::MalformedToken
        })?;

        let jwk = self.jwks_client.get_key(&kid).await?;

        let claims = verify_token(token, &jwk, &self.issuer, &self.audience, self.leeway_seconds)?;

        tracing::debug!(target: "ds.auth.verify", "Token validated successfully");
        Ok(claims)
    }
}

/// Verify a token's signature against one JWK and validate its claims.
fn verify_token(
    token: &str,
    jwk: &Jwk,
    issuer: &str,
    audience: &str,
    leeway_seconds: u64,
) -> Result<Claims, AuthError> {
    // The key must actually be an RS256 signing key.
    if jwk.kty != "RSA" {
        tracing::warn!(target: "ds.auth.verify", kty = %jwk.kty, "Unexpected JWK key type");
        return Err(AuthError::MalformedToken);
    }
    if let Some(alg) = &jwk.alg {
        if alg != "RS256" {
            tracing::warn!(target: "ds.auth.verify", alg = %alg, "Unexpected JWK algorithm");
            return Err(AuthError::MalformedToken);
        }
    }

    // A listed key without usable material is a key set fault, not a token
    // fault.
    let n = jwk.n.as_ref().ok_or_else(|| {
        tracing::error!(target: "ds.auth.verify", kid = %jwk.kid, "JWK missing modulus");
        AuthError::KeySetUnavailable
    })?;
    let e = jwk.e.as_ref().ok_or_else(|| {
        tracing::error!(target: "ds.auth.verify", kid = %jwk.kid, "JWK missing exponent");
        AuthError::KeySetUnavailable
    })?;

    let decoding_key = DecodingKey::from_rsa_components(n, e).map_err(|err| {
        tracing::error!(target: "ds.auth.verify", kid = %jwk.kid, error = %err, "Invalid RSA key material in JWKS");
        AuthError::KeySetUnavailable
    })?;

    let mut validation = Validation::new(Algorithm::RS256);
    validation.set_issuer(&[issuer]);
    validation.set_audience(&[audience]);
    validation.validate_exp = true;
    validation.leeway = leeway_seconds;

    let token_data = decode::<Claims>(token, &decoding_key, &validation).map_err(|err| {
        let mapped = match err.kind() {
            ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            ErrorKind::InvalidIssuer
            | ErrorKind::InvalidAudience
            | ErrorKind::MissingRequiredClaim(_) => AuthError::ClaimsInvalid,
            _ => AuthError::MalformedToken,
        };
        tracing::debug!(target: "ds.auth.verify", error = %err, "Token verification failed");
        mapped
    })?;

    Ok(token_data.claims)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};

    const ISSUER: &str = "https://tenant.eu.auth0.com/";
    const AUDIENCE: &str = "https://drinks.example.com";

    /// Real 2048-bit modulus; the paired private key signs nothing in these
    /// tests, so signature checks against it must fail.
    const TEST_MODULUS: &str = "tnP68EVvQmVUlD0wYpZAnZ_qtcSOPywOUj1M1U2ZhW98g6CYFUTxwxKPZZ7jsW5rTtbhCP2fxK0iXi-YGo2I8G1ux8uimojZANndr_MLgnohsmKfbD_kHbwlBrnIACOUeYj8_kfHo8SZAKqhSgCGrk5c9hq11ZIAy5_RgPnBYjT_EroVxsgH2VQjQ8yvBd2TcLbVS41wms4S4YjZ54XKVRI7NL7etM0AkiiGqRLyumEA6ClX-FtzIm7n4UihKkImuRKu_ZpOvlCdJqGzH-8I_o-Hur75naBUL3WbIg04vGbRwd4fitc7X4a5BdMx0ZzOi3YAbrJZ4y3u-GAu9Wr_WQ";

    fn rsa_jwk(kid: &str) -> Jwk {
        Jwk {
            kty: "RSA".to_string(),
            kid: kid.to_string(),
            n: Some(TEST_MODULUS.to_string()),
            e: Some("AQAB".to_string()),
            alg: Some("RS256".to_string()),
            key_use: Some("sig".to_string()),
        }
    }

    fn fake_token(kid: &str) -> String {
        let header = format!(r#"{{"alg":"RS256","typ":"JWT","kid":"{kid}"}}"#);
        let payload = format!(
            r#"{{"iss":"{ISSUER}","sub":"test","aud":"{AUDIENCE}","exp":9999999999,"permissions":["get:drinks-detail"]}}"#
        );
        format!(
            "{}.{}.{}",
            URL_SAFE_NO_PAD.encode(header.as_bytes()),
            URL_SAFE_NO_PAD.encode(payload.as_bytes()),
            URL_SAFE_NO_PAD.encode(b"fake-signature")
        )
    }

    #[test]
    fn test_verify_token_rejects_non_rsa_key_type() {
        let mut jwk = rsa_jwk("test-key");
        jwk.kty = "OKP".to_string();

        let result = verify_token(&fake_token("test-key"), &jwk, ISSUER, AUDIENCE, 0);
        assert!(matches!(result, Err(AuthError::MalformedToken)));
    }

    #[test]
    fn test_verify_token_rejects_foreign_algorithm() {
        let mut jwk = rsa_jwk("test-key");
        jwk.alg = Some("HS256".to_string());

        let result = verify_token(&fake_token("test-key"), &jwk, ISSUER, AUDIENCE, 0);
        assert!(matches!(result, Err(AuthError::MalformedToken)));
    }

    #[test]
    fn test_verify_token_missing_modulus_is_key_set_fault() {
        let mut jwk = rsa_jwk("test-key");
        jwk.n = None;

        let result = verify_token(&fake_token("test-key"), &jwk, ISSUER, AUDIENCE, 0);
        assert!(matches!(result, Err(AuthError::KeySetUnavailable)));
    }

    #[test]
    fn test_verify_token_missing_exponent_is_key_set_fault() {
        let mut jwk = rsa_jwk("test-key");
        jwk.e = None;

        let result = verify_token(&fake_token("test-key"), &jwk, ISSUER, AUDIENCE, 0);
        assert!(matches!(result, Err(AuthError::KeySetUnavailable)));
    }

    #[test]
    fn test_verify_token_invalid_key_material_is_key_set_fault() {
        let mut jwk = rsa_jwk("test-key");
        jwk.n = Some("!!!not-base64url!!!".to_string());

        let result = verify_token(&fake_token("test-key"), &jwk, ISSUER, AUDIENCE, 0);
        assert!(matches!(result, Err(AuthError::KeySetUnavailable)));
    }

    #[test]
    fn test_verify_token_rejects_forged_signature() {
        let jwk = rsa_jwk("test-key");

        let result = verify_token(&fake_token("test-key"), &jwk, ISSUER, AUDIENCE, 0);
        assert!(matches!(result, Err(AuthError::MalformedToken)));
    }

    #[test]
    fn test_verify_token_rejects_alg_none() {
        let jwk = rsa_jwk("test-key");

        let header = r#"{"alg":"none","typ":"JWT","kid":"test-key"}"#;
        let payload = format!(r#"{{"iss":"{ISSUER}","sub":"test","aud":"{AUDIENCE}","exp":9999999999}}"#);
        let token = format!(
            "{}.{}.",
            URL_SAFE_NO_PAD.encode(header.as_bytes()),
            URL_SAFE_NO_PAD.encode(payload.as_bytes())
        );

        let result = verify_token(&token, &jwk, ISSUER, AUDIENCE, 0);
        assert!(matches!(result, Err(AuthError::MalformedToken)));
    }

    #[test]
    fn test_verify_token_expired_claim_still_needs_valid_signature() {
        // Signature verification precedes claim validation: an expired
        // payload under a forged signature reports the signature failure,
        // not expiry.
        let jwk = rsa_jwk("test-key");

        let header = r#"{"alg":"RS256","typ":"JWT","kid":"test-key"}"#;
        let payload =
            format!(r#"{{"iss":"{ISSUER}","sub":"test","aud":"{AUDIENCE}","exp":1000000000}}"#);
        let token = format!(
            "{}.{}.{}",
            URL_SAFE_NO_PAD.encode(header.as_bytes()),
            URL_SAFE_NO_PAD.encode(payload.as_bytes()),
            URL_SAFE_NO_PAD.encode(b"fake-signature")
        );

        let result = verify_token(&token, &jwk, ISSUER, AUDIENCE, 0);
        assert!(matches!(result, Err(AuthError::MalformedToken)));
    }

    #[tokio::test]
    async fn test_verifier_propagates_malformed_token_before_key_fetch() {
        // No kid in the header: the verifier must fail before ever touching
        // the key set (the JWKS URL here is unreachable).
        let jwks = Arc::new(JwksClient::new(
            "http://127.0.0.1:1/.well-known/jwks.json".to_string(),
        ));
        let verifier =
            TokenVerifier::new(jwks, ISSUER.to_string(), AUDIENCE.to_string(), 0);

        let header = r#"{"alg":"RS256","typ":"JWT"}"#;
        let token = format!(
            "{}.payload.signature",
            URL_SAFE_NO_PAD.encode(header.as_bytes())
        );

        let result = verifier.verify(&token).await;
        assert!(matches!(result, Err(AuthError::MalformedToken)));
    }
}
