//! # Access Policy
//!
//! Decides whether a caller may perform an operation. The storage lookup
//! happens elsewhere; this module only judges what it is handed.
//!
//! ## Decision Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      authorize(found, creds, role)                      │
//! │                                                                         │
//! │  found user? ──── no ──────────────────────► Denied(Authentication)     │
//! │       │                                                 (401)           │
//! │      yes                                                                │
//! │       │                                                                 │
//! │  password verifies? ── no ─────────────────► Denied(Authentication)     │
//! │       │                                                 (401)           │
//! │      yes                                                                │
//! │       │                                                                 │
//! │  required role given and different? ─ yes ─► Denied(WrongRole)          │
//! │       │                                                 (400)           │
//! │      no                                                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Authorized(user)                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every outcome other than `Authorized` is an error for the caller; there
//! is no fall-through path.

use crate::error::{CoreError, CoreResult};
use crate::password::verify_password;
use crate::types::{Credentials, Product, Role, User};

/// Outcome of an authorization check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Authorization {
    /// Credentials verified and role accepted.
    Authorized(User),
    /// Refused, with the error the caller should see.
    Denied(CoreError),
}

impl Authorization {
    #[inline]
    pub fn is_authorized(&self) -> bool {
        matches!(self, Authorization::Authorized(_))
    }

    /// Converts into a `Result`, turning every denial into an error.
    pub fn into_result(self) -> CoreResult<User> {
        match self {
            Authorization::Authorized(user) => Ok(user),
            Authorization::Denied(err) => Err(err),
        }
    }
}

/// Judges credentials against the user record found for their username.
///
/// ## Arguments
/// * `found` - Result of the credential store lookup by username
/// * `credentials` - What the caller supplied
/// * `required` - Role the operation needs, if any
pub fn authorize(
    found: Option<User>,
    credentials: &Credentials,
    required: Option<Role>,
) -> Authorization {
    let user = match found {
        Some(user) if user.username == credentials.username => user,
        _ => return Authorization::Denied(CoreError::Authentication),
    };

    if !verify_password(&credentials.password, &user.password_hash) {
        return Authorization::Denied(CoreError::Authentication);
    }

    if let Some(role) = required {
        if let Err(err) = require_role(&user, role) {
            return Authorization::Denied(err);
        }
    }

    Authorization::Authorized(user)
}

/// Fails with `WrongRole` unless `user` has `role`.
pub fn require_role(user: &User, role: Role) -> CoreResult<()> {
    if user.role != role {
        return Err(CoreError::WrongRole {
            required: role,
            actual: user.role,
        });
    }
    Ok(())
}

/// Fails with `Forbidden` unless `user` is the account named `username`.
pub fn require_self(user: &User, username: &str, message: &str) -> CoreResult<()> {
    if user.username != username {
        return Err(CoreError::Forbidden(message.to_string()));
    }
    Ok(())
}

/// Fails with `Forbidden` unless `user` is the seller who listed `product`.
pub fn require_product_owner(user: &User, product: &Product) -> CoreResult<()> {
    if !product.is_owned_by(user) {
        return Err(CoreError::Forbidden(
            "Sorry but you can't change another seller's product".to_string(),
        ));
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::password::hash_password;

    fn stored_user(role: Role) -> User {
        User {
            id: 7,
            username: "alice".to_string(),
            password_hash: hash_password("correct-horse").unwrap(),
            deposit: 0,
            role,
        }
    }

    #[test]
    fn test_authorized_with_matching_role() {
        let creds = Credentials::new("alice", "correct-horse");
        let outcome = authorize(Some(stored_user(Role::Buyer)), &creds, Some(Role::Buyer));

        assert!(outcome.is_authorized());
        assert_eq!(outcome.into_result().unwrap().id, 7);
    }

    #[test]
    fn test_missing_user_is_authentication_error() {
        let creds = Credentials::new("ghost", "whatever");
        let outcome = authorize(None, &creds, None);
        assert_eq!(outcome, Authorization::Denied(CoreError::Authentication));
    }

    #[test]
    fn test_wrong_password_is_authentication_error() {
        let creds = Credentials::new("alice", "wrong-horse");
        let outcome = authorize(Some(stored_user(Role::Buyer)), &creds, None);
        assert_eq!(outcome.into_result(), Err(CoreError::Authentication));
    }

    #[test]
    fn test_wrong_role_is_role_error() {
        let creds = Credentials::new("alice", "correct-horse");
        let outcome = authorize(Some(stored_user(Role::Seller)), &creds, Some(Role::Buyer));

        assert_eq!(
            outcome.into_result(),
            Err(CoreError::WrongRole {
                required: Role::Buyer,
                actual: Role::Seller
            })
        );
    }

    #[test]
    fn test_no_required_role_accepts_any_role() {
        let creds = Credentials::new("alice", "correct-horse");
        for role in [Role::Buyer, Role::Seller, Role::Admin] {
            assert!(authorize(Some(stored_user(role)), &creds, None).is_authorized());
        }
    }

    #[test]
    fn test_product_owner_guard() {
        let seller = User {
            id: 3,
            username: "sam".to_string(),
            password_hash: String::new(),
            deposit: 0,
            role: Role::Seller,
        };
        let mut product = Product {
            id: 1,
            product_name: "Cola".to_string(),
            amount_available: 4,
            cost: 55,
            seller_id: 3,
        };

        assert!(require_product_owner(&seller, &product).is_ok());

        product.seller_id = 4;
        assert!(matches!(
            require_product_owner(&seller, &product),
            Err(CoreError::Forbidden(_))
        ));
    }
}
