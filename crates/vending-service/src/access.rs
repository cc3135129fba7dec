//! # Credential Check
//!
//! Looks the caller up in the credential store and hands the record to
//! [`vending_core::access::authorize`] for the decision.
//!
//! ```text
//! Credentials ──► UserRepository::find_by_username ──► authorize(found, creds, role)
//!                                                           │
//!                                       Authorized(user) ◄──┴──► Denied(err) ─► ApiError
//! ```

use tracing::{debug, warn};
use vending_core::access::{authorize, Authorization};
use vending_core::{Credentials, Role, User};
use vending_db::{SqliteConnection, UserRepository};

use crate::error::ApiResult;

/// Authenticates `credentials` and, when `required` is given, checks the role.
///
/// Every outcome other than `Authorized` becomes an error.
pub async fn authenticate(
    conn: &mut SqliteConnection,
    credentials: &Credentials,
    required: Option<Role>,
) -> ApiResult<User> {
    let found = UserRepository::find_by_username(conn, &credentials.username).await?;

    match authorize(found, credentials, required) {
        Authorization::Authorized(user) => {
            debug!(username = %user.username, role = %user.role, "Caller authenticated");
            Ok(user)
        }
        Authorization::Denied(err) => {
            warn!(username = %credentials.username, reason = %err, "Access denied");
            Err(err.into())
        }
    }
}
