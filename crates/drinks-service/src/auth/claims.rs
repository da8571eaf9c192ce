//! Verified token claims.
//!
//! A [`Claims`] value is only ever produced by successful verification; it is
//! never built from untrusted input directly. The `sub` field is redacted in
//! Debug output to keep subject identifiers out of logs.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Audience claim: issuers emit either a single string or an array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Audience {
    /// Single audience value.
    One(String),
    /// Multiple audience values.
    Many(Vec<String>),
}

impl Audience {
    /// Whether this audience claim contains the given value.
    pub fn contains(&self, audience: &str) -> bool {
        match self {
            Audience::One(value) => value == audience,
            Audience::Many(values) => values.iter().any(|v| v == audience),
        }
    }
}

/// Claims decoded from a verified token.
#[derive(Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Token issuer (scheme + domain + trailing slash).
    pub iss: String,

    /// Subject (user or client identifier) - redacted in Debug output.
    pub sub: String,

    /// Audience(s) the token was issued for.
    pub aud: Audience,

    /// Expiration timestamp (Unix epoch seconds).
    pub exp: i64,

    /// Issued-at timestamp (Unix epoch seconds).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,

    /// Capabilities granted to this token. Absent on tokens whose issuer
    /// was not configured to embed permissions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Vec<String>>,
}

/// Custom Debug implementation that redacts the `sub` field.
impl fmt::Debug for Claims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Claims")
            .field("iss", &self.iss)
            .field("sub", &"[REDACTED]")
            .field("aud", &self.aud)
            .field("exp", &self.exp)
            .field("iat", &self.iat)
            .field("permissions", &self.permissions)
            .finish()
    }
}

impl Claims {
    /// Check if the token grants a specific permission.
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions
            .as_deref()
            .is_some_and(|perms| perms.iter().any(|p| p == permission))
    }
}
