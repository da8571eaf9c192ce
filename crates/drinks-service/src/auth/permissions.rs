//! Permission checks against verified claims.

use crate::auth::claims::Claims;
use crate::errors::AuthError;

/// Check that the claims grant a required permission.
///
/// # Errors
///
/// - `PermissionsClaimMissing` - the token carries no `permissions` claim
/// - `Forbidden` - the claim is present but does not contain `required`
pub fn check_permission(required: &str, claims: &Claims) -> Result<(), AuthError> {
    let permissions = claims
        .permissions
        .as_deref()
        .ok_or(AuthError::PermissionsClaimMissing)?;

    if !permissions.iter().any(|granted| granted == required) {
        tracing::debug!(
            target: "ds.auth.permissions",
            required = %required,
            "Permission not granted"
        );
        return Err(AuthError::Forbidden);
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::auth::claims::Audience;

    fn claims_with_permissions(permissions: Option<Vec<&str>>) -> Claims {
        Claims {
            iss: "https://tenant.eu.auth0.com/".to_string(),
            sub: "user".to_string(),
            aud: Audience::One("https://drinks.example.com".to_string()),
            exp: 9_999_999_999,
            iat: None,
            permissions: permissions
                .map(|perms| perms.into_iter().map(ToString::to_string).collect()),
        }
    }

    #[test]
    fn test_check_permission_granted() {
        let claims = claims_with_permissions(Some(vec!["get:drinks-detail"]));
        assert!(check_permission("get:drinks-detail", &claims).is_ok());
    }

    #[test]
    fn test_check_permission_not_granted() {
        let claims = claims_with_permissions(Some(vec!["get:drinks-detail"]));
        assert_eq!(
            check_permission("post:drinks", &claims),
            Err(AuthError::Forbidden)
        );
    }

    #[test]
    fn test_check_permission_missing_claim() {
        let claims = claims_with_permissions(None);
        // Any required permission fails the same way when the claim is absent.
        for required in ["get:drinks-detail", "post:drinks", "delete:drinks"] {
            assert_eq!(
                check_permission(required, &claims),
                Err(AuthError::PermissionsClaimMissing)
            );
        }
    }

    #[test]
    fn test_check_permission_empty_claim_is_forbidden() {
        let claims = claims_with_permissions(Some(vec![]));
        assert_eq!(
            check_permission("get:drinks-detail", &claims),
            Err(AuthError::Forbidden)
        );
    }

    #[test]
    fn test_check_permission_no_partial_match() {
        let claims = claims_with_permissions(Some(vec!["get:drinks-detail"]));
        assert_eq!(
            check_permission("get:drinks", &claims),
            Err(AuthError::Forbidden)
        );
    }
}
