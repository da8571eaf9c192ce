//! JWKS client for fetching and caching the issuer's public signing keys.
//!
//! The client fetches the key set from the issuer's
//! `/.well-known/jwks.json` endpoint and caches it with a configurable TTL.
//! Refreshes are single-flight: one task fetches while concurrent callers
//! holding a stale entry keep being served from it.
//!
//! # Security
//!
//! - Keys are cached to avoid a network round-trip per request
//! - Cache entries expire on TTL to pick up key rotations
//! - The remote endpoint is never mutated; this is read-only traffic

use crate::errors::AuthError;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};
use tracing::instrument;

/// Default cache TTL in seconds (5 minutes).
const DEFAULT_CACHE_TTL_SECONDS: u64 = 300;

/// Bound on a single JWKS fetch, after which the key set counts as unavailable.
const JWKS_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// JSON Web Key from the JWKS endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct Jwk {
    /// Key type (always "RSA" for RS256 issuers).
    pub kty: String,

    /// Key ID - used to select the correct key for verification.
    pub kid: String,

    /// RSA modulus (base64url encoded).
    #[serde(default)]
    pub n: Option<String>,

    /// RSA public exponent (base64url encoded).
    #[serde(default)]
    pub e: Option<String>,

    /// Algorithm (should be "RS256").
    #[serde(default)]
    pub alg: Option<String>,

    /// Key use (should be "sig" for signing).
    #[serde(default, rename = "use")]
    pub key_use: Option<String>,
}

/// JWKS document from the issuer.
#[derive(Debug, Clone, Deserialize)]
pub struct JwksResponse {
    /// List of JSON Web Keys.
    pub keys: Vec<Jwk>,
}

/// Cached key set with expiry time.
struct CachedJwks {
    /// Map of key ID to JWK.
    keys: HashMap<String, Jwk>,

    /// When this cache entry expires.
    expires_at: Instant,
}

/// JWKS client for fetching and caching public keys.
///
/// Safe for concurrent use: reads go through an `RwLock`, and the refresh
/// path is serialized behind a separate mutex so at most one fetch is in
/// flight at a time.
pub struct JwksClient {
    /// URL to the JWKS endpoint.
    jwks_url: String,

    /// HTTP client for fetching JWKS.
    http_client: reqwest::Client,

    /// Cached key set.
    cache: RwLock<Option<CachedJwks>>,

    /// Serializes refreshes; holders of a stale cache entry do not wait on it.
    refresh_lock: Mutex<()>,

    /// Cache TTL duration.
    cache_ttl: Duration,
}

impl JwksClient {
    /// Create a new JWKS client with the default cache TTL.
    pub fn new(jwks_url: String) -> Self {
        Self::with_ttl(jwks_url, Duration::from_secs(DEFAULT_CACHE_TTL_SECONDS))
    }

    /// Create a new JWKS client with a custom cache TTL.
    pub fn with_ttl(jwks_url: String, cache_ttl: Duration) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(JWKS_FETCH_TIMEOUT)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(target: "ds.auth.jwks", error = %e, "Failed to build HTTP client with custom config, using defaults");
                reqwest::Client::new()
            });

        Self {
            jwks_url,
            http_client,
            cache: RwLock::new(None),
            refresh_lock: Mutex::new(()),
            cache_ttl,
        }
    }

    /// Get a JWK by key ID.
    ///
    /// Serves from the cache while it is fresh; otherwise refreshes the key
    /// set from the issuer first. A key ID absent from a fresh key set is
    /// `KeyNotFound` - that is an answer, not a fetch failure.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::KeySetUnavailable` if the key set cannot be
    /// fetched. Returns `AuthError::KeyNotFound` if the key ID has no match.
    #[instrument(skip(self), fields(kid = %kid))]
    pub async fn get_key(&self, kid: &str) -> Result<Jwk, AuthError> {
        // Fast path: a fresh cache answers authoritatively.
        let stale_hit = {
            let cache = self.cache.read().await;
            match cache.as_ref() {
                Some(cached) if cached.expires_at > Instant::now() => {
                    return match cached.keys.get(kid) {
                        Some(key) => {
                            tracing::debug!(target: "ds.auth.jwks", kid = %kid, "JWKS cache hit");
                            Ok(key.clone())
                        }
                        None => {
                            tracing::debug!(target: "ds.auth.jwks", kid = %kid, "Key not found in fresh JWKS cache");
                            Err(AuthError::KeyNotFound)
                        }
                    };
                }
                Some(cached) => cached.keys.get(kid).cloned(),
                None => None,
            }
        };

        // Cache is stale or empty. Exactly one task refreshes; concurrent
        // callers with a stale hit are served from it in the meantime.
        match self.refresh_lock.try_lock() {
            Ok(_guard) => {
                // Double-check: another task may have refreshed between our
                // cache read and taking the lock.
                if !self.has_fresh_cache().await {
                    self.refresh_cache().await?;
                }
            }
            Err(_) => {
                if let Some(key) = stale_hit {
                    tracing::debug!(target: "ds.auth.jwks", kid = %kid, "Serving stale JWKS entry while refresh is in flight");
                    return Ok(key);
                }

                // Nothing to serve; wait for the in-flight refresh, then
                // re-check in case it failed or the cache expired again.
                let _guard = self.refresh_lock.lock().await;
                if !self.has_fresh_cache().await {
                    self.refresh_cache().await?;
                }
            }
        }

        let cache = self.cache.read().await;
        cache
            .as_ref()
            .and_then(|cached| cached.keys.get(kid).cloned())
            .ok_or_else(|| {
                tracing::warn!(target: "ds.auth.jwks", kid = %kid, "Key not found in JWKS after refresh");
                AuthError::KeyNotFound
            })
    }

    /// Whether the cache holds an unexpired key set.
    async fn has_fresh_cache(&self) -> bool {
        let cache = self.cache.read().await;
        cache
            .as_ref()
            .is_some_and(|cached| cached.expires_at > Instant::now())
    }

    /// Refresh the cache by fetching the key set from the issuer.
    ///
    /// Callers must hold `refresh_lock`.
    #[instrument(skip(self))]
    async fn refresh_cache(&self) -> Result<(), AuthError> {
        tracing::debug!(target: "ds.auth.jwks", url = %self.jwks_url, "Fetching JWKS from issuer");

        let response = self
            .http_client
            .get(&self.jwks_url)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(target: "ds.auth.jwks", error = %e, "Failed to fetch JWKS");
                AuthError::KeySetUnavailable
            })?;

        if !response.status().is_success() {
            tracing::error!(
                target: "ds.auth.jwks",
                status = %response.status(),
                "JWKS endpoint returned error"
            );
            return Err(AuthError::KeySetUnavailable);
        }

        let jwks: JwksResponse = response.json().await.map_err(|e| {
            tracing::error!(target: "ds.auth.jwks", error = %e, "Failed to parse JWKS response");
            AuthError::KeySetUnavailable
        })?;

        let keys: HashMap<String, Jwk> = jwks
            .keys
            .into_iter()
            .map(|key| (key.kid.clone(), key))
            .collect();

        tracing::info!(
            target: "ds.auth.jwks",
            key_count = keys.len(),
            "JWKS cache refreshed"
        );

        let mut cache = self.cache.write().await;
        *cache = Some(CachedJwks {
            keys,
            expires_at: Instant::now() + self.cache_ttl,
        });

        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_jwk_deserialization() {
        let json = r#"{
            "kty": "RSA",
            "kid": "test-key-01",
            "n": "sXchaXTtcn9f2tBjvwr",
            "e": "AQAB",
            "alg": "RS256",
            "use": "sig"
        }"#;

        let jwk: Jwk = serde_json::from_str(json).unwrap();

        assert_eq!(jwk.kty, "RSA");
        assert_eq!(jwk.kid, "test-key-01");
        assert_eq!(jwk.n, Some("sXchaXTtcn9f2tBjvwr".to_string()));
        assert_eq!(jwk.e, Some("AQAB".to_string()));
        assert_eq!(jwk.alg, Some("RS256".to_string()));
        assert_eq!(jwk.key_use, Some("sig".to_string()));
    }

    #[test]
    fn test_jwk_deserialization_minimal() {
        // Only required fields
        let json = r#"{
            "kty": "RSA",
            "kid": "test-key-02"
        }"#;

        let jwk: Jwk = serde_json::from_str(json).unwrap();

        assert_eq!(jwk.kty, "RSA");
        assert_eq!(jwk.kid, "test-key-02");
        assert!(jwk.n.is_none());
        assert!(jwk.e.is_none());
        assert!(jwk.alg.is_none());
        assert!(jwk.key_use.is_none());
    }

    #[test]
    fn test_jwks_response_deserialization() {
        let json = r#"{
            "keys": [
                {"kty": "RSA", "kid": "key-1"},
                {"kty": "RSA", "kid": "key-2"}
            ]
        }"#;

        let jwks: JwksResponse = serde_json::from_str(json).unwrap();

        assert_eq!(jwks.keys.len(), 2);
        assert_eq!(jwks.keys.first().unwrap().kid, "key-1");
        assert_eq!(jwks.keys.get(1).unwrap().kid, "key-2");
    }

    #[test]
    fn test_jwks_client_creation() {
        let client = JwksClient::new("http://localhost:8082/.well-known/jwks.json".to_string());
        assert_eq!(
            client.jwks_url,
            "http://localhost:8082/.well-known/jwks.json"
        );
        assert_eq!(
            client.cache_ttl,
            Duration::from_secs(DEFAULT_CACHE_TTL_SECONDS)
        );
    }

    #[test]
    fn test_jwks_client_custom_ttl() {
        let client = JwksClient::with_ttl(
            "http://localhost:8082/.well-known/jwks.json".to_string(),
            Duration::from_secs(60),
        );
        assert_eq!(client.cache_ttl, Duration::from_secs(60));
    }

    #[tokio::test]
    async fn test_empty_cache_is_not_fresh() {
        let client = JwksClient::new("http://localhost:8082/.well-known/jwks.json".to_string());
        assert!(!client.has_fresh_cache().await);
    }

    #[tokio::test]
    async fn test_get_key_unreachable_endpoint_is_unavailable() {
        // Nothing listens on this port; the fetch fails fast with a
        // connection error rather than a timeout.
        let client = JwksClient::new("http://127.0.0.1:1/.well-known/jwks.json".to_string());

        let result = client.get_key("any-kid").await;
        assert!(matches!(result, Err(AuthError::KeySetUnavailable)));
    }
}
