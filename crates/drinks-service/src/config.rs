//! Drinks service configuration.
//!
//! Configuration is loaded from environment variables. Sensitive fields are
//! redacted in Debug output.

use common::jwt::{DEFAULT_LEEWAY, MAX_LEEWAY};
use std::collections::HashMap;
use std::env;
use std::fmt;
use thiserror::Error;

/// Default server bind address.
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";

/// Default JWKS cache TTL in seconds (5 minutes).
pub const DEFAULT_JWKS_CACHE_TTL_SECONDS: u64 = 300;

/// Drinks service configuration.
///
/// Loaded from environment variables with sensible defaults. The database
/// URL is redacted in Debug output to prevent credential leakage.
#[derive(Clone)]
pub struct Config {
    /// PostgreSQL connection URL.
    pub database_url: String,

    /// Server bind address (default: "0.0.0.0:8080").
    pub bind_address: String,

    /// Token issuer domain (e.g. "tenant.eu.auth0.com").
    pub auth_domain: String,

    /// Expected audience claim for incoming tokens.
    pub audience: String,

    /// URL of the issuer's JWKS endpoint. Defaults to the domain's
    /// well-known location; overridable for testing.
    pub jwks_url: String,

    /// Expiry leeway in seconds applied during token validation.
    pub jwt_leeway_seconds: u64,

    /// How long fetched signing keys stay fresh, in seconds.
    pub jwks_cache_ttl_seconds: u64,
}

/// Custom Debug implementation that redacts sensitive fields.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &"[REDACTED]")
            .field("bind_address", &self.bind_address)
            .field("auth_domain", &self.auth_domain)
            .field("audience", &self.audience)
            .field("jwks_url", &self.jwks_url)
            .field("jwt_leeway_seconds", &self.jwt_leeway_seconds)
            .field("jwks_cache_ttl_seconds", &self.jwks_cache_ttl_seconds)
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid JWT leeway configuration: {0}")]
    InvalidJwtLeeway(String),

    #[error("Invalid JWKS cache TTL configuration: {0}")]
    InvalidJwksCacheTtl(String),
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing).
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let database_url = vars
            .get("DATABASE_URL")
            .ok_or_else(|| ConfigError::MissingEnvVar("DATABASE_URL".to_string()))?
            .clone();

        let bind_address = vars
            .get("BIND_ADDRESS")
            .cloned()
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());

        let auth_domain = vars
            .get("AUTH_DOMAIN")
            .ok_or_else(|| ConfigError::MissingEnvVar("AUTH_DOMAIN".to_string()))?
            .clone();

        let audience = vars
            .get("AUTH_AUDIENCE")
            .ok_or_else(|| ConfigError::MissingEnvVar("AUTH_AUDIENCE".to_string()))?
            .clone();

        let jwks_url = vars
            .get("AUTH_JWKS_URL")
            .cloned()
            .unwrap_or_else(|| format!("https://{auth_domain}/.well-known/jwks.json"));

        // Parse JWT leeway with validation
        let jwt_leeway_seconds = if let Some(value_str) = vars.get("JWT_LEEWAY_SECONDS") {
            let value: u64 = value_str.parse().map_err(|e| {
                ConfigError::InvalidJwtLeeway(format!(
                    "JWT_LEEWAY_SECONDS must be a non-negative integer, got '{value_str}': {e}"
                ))
            })?;

            if value > MAX_LEEWAY.as_secs() {
                return Err(ConfigError::InvalidJwtLeeway(format!(
                    "JWT_LEEWAY_SECONDS must not exceed {} seconds, got {}",
                    MAX_LEEWAY.as_secs(),
                    value
                )));
            }

            value
        } else {
            DEFAULT_LEEWAY.as_secs()
        };

        // Parse JWKS cache TTL with validation
        let jwks_cache_ttl_seconds = if let Some(value_str) = vars.get("JWKS_CACHE_TTL_SECONDS") {
            let value: u64 = value_str.parse().map_err(|e| {
                ConfigError::InvalidJwksCacheTtl(format!(
                    "JWKS_CACHE_TTL_SECONDS must be a valid positive integer, got '{value_str}': {e}"
                ))
            })?;

            if value == 0 {
                return Err(ConfigError::InvalidJwksCacheTtl(
                    "JWKS_CACHE_TTL_SECONDS must be greater than 0".to_string(),
                ));
            }

            value
        } else {
            DEFAULT_JWKS_CACHE_TTL_SECONDS
        };

        Ok(Config {
            database_url,
            bind_address,
            auth_domain,
            audience,
            jwks_url,
            jwt_leeway_seconds,
            jwks_cache_ttl_seconds,
        })
    }

    /// Expected issuer claim: scheme, domain and trailing slash.
    pub fn issuer(&self) -> String {
        format!("https://{}/", self.auth_domain)
    }
}
