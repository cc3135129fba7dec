//! # API Error Type
//!
//! Unified error type for service commands.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Vending Service                    │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Command Function  ─►  ApiResult<T>                              │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Wrong credentials? ── CoreError::Authentication ──► 401         │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Business rule? ────── CoreError::* / Validation ──► 400         │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Storage failure? ──── DbError::* (logged) ────────► 500         │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Success ─────────────────────────────────────────────────────►  │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  The transport sends `status()` and the serialized {code, message}.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use vending_core::CoreError;
use vending_db::DbError;

/// Error returned from service commands.
///
/// ## Serialization
/// ```json
/// {
///   "code": "INSUFFICIENT_FUNDS",
///   "message": "You can buy: 1 pcs!"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Unknown user or wrong password (401)
    Unauthorized,

    /// Authenticated with the wrong role (400)
    RoleError,

    /// Acting on someone else's account or product (400)
    Forbidden,

    /// Input validation failed (400)
    ValidationError,

    /// User or product does not exist (400)
    NotFound,

    /// Username or product name already taken (400)
    Duplicate,

    /// Deposit is zero (400)
    ZeroBalance,

    /// Deposit does not cover the purchase (400)
    InsufficientFunds,

    /// Stock does not cover the purchase (400)
    OutOfStock,

    /// Database operation failed (500)
    DatabaseError,

    /// Internal server error (500)
    Internal,
}

impl ErrorCode {
    /// HTTP status the transport should send.
    pub fn status(self) -> u16 {
        match self {
            ErrorCode::Unauthorized => 401,
            ErrorCode::DatabaseError | ErrorCode::Internal => 500,
            _ => 400,
        }
    }
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }

    #[inline]
    pub fn status(&self) -> u16 {
        self.code.status()
    }
}

/// Converts core errors to API errors. Messages pass through unchanged.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let code = match &err {
            CoreError::Authentication => ErrorCode::Unauthorized,
            CoreError::WrongRole { .. } => ErrorCode::RoleError,
            CoreError::Forbidden(_) => ErrorCode::Forbidden,
            CoreError::Validation(_) => ErrorCode::ValidationError,
            CoreError::DuplicateProduct { .. } | CoreError::DuplicateUser { .. } => {
                ErrorCode::Duplicate
            }
            CoreError::ProductNotFound(_) | CoreError::UserNotFound(_) => ErrorCode::NotFound,
            CoreError::ZeroBalance => ErrorCode::ZeroBalance,
            CoreError::InsufficientFunds { .. } | CoreError::InsufficientBalance { .. } => {
                ErrorCode::InsufficientFunds
            }
            CoreError::OutOfStock { .. } => ErrorCode::OutOfStock,
            CoreError::PasswordHash(e) => {
                tracing::error!("Password hashing failed: {}", e);
                return ApiError::internal("Could not process password");
            }
        };

        ApiError::new(code, err.to_string())
    }
}

/// Converts database errors to API errors.
///
/// Storage details are logged, never returned.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Domain(e) => ApiError::from(e),
            DbError::NotFound { entity, id } => {
                ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", entity, id))
            }
            DbError::UniqueViolation { field, .. } => {
                ApiError::new(ErrorCode::Duplicate, format!("{} already exists", field))
            }
            DbError::ForeignKeyViolation { message } => {
                tracing::error!("Foreign key violation: {}", message);
                ApiError::validation("Invalid reference")
            }
            DbError::CheckViolation(e) => {
                tracing::error!("Check constraint failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::ConnectionFailed(e) => {
                tracing::error!("Database connection failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(e) => {
                tracing::error!("Database migration failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                tracing::error!("Database query failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::TransactionFailed(e) => {
                tracing::error!("Transaction failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database transaction failed")
            }
            DbError::PoolExhausted => {
                tracing::error!("Database pool exhausted");
                ApiError::new(ErrorCode::DatabaseError, "Database pool exhausted")
            }
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

impl From<vending_core::ValidationError> for ApiError {
    fn from(err: vending_core::ValidationError) -> Self {
        ApiError::from(CoreError::from(err))
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

/// Result type for service commands.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use vending_core::{Role, ValidationError};

    #[test]
    fn test_authentication_is_401() {
        let err = ApiError::from(CoreError::Authentication);
        assert_eq!(err.code, ErrorCode::Unauthorized);
        assert_eq!(err.status(), 401);
    }

    #[test]
    fn test_business_rules_are_400() {
        let errors = [
            CoreError::WrongRole {
                required: Role::Buyer,
                actual: Role::Seller,
            },
            CoreError::Forbidden("no".to_string()),
            CoreError::ZeroBalance,
            CoreError::InsufficientFunds { max_affordable: 1 },
            CoreError::OutOfStock { available: 0 },
            CoreError::ProductNotFound("7".to_string()),
            ValidationError::InvalidCoin { value: 3 }.into(),
        ];

        for err in errors {
            assert_eq!(ApiError::from(err).status(), 400);
        }
    }

    #[test]
    fn test_message_passes_through() {
        let err = ApiError::from(CoreError::InsufficientFunds { max_affordable: 1 });
        assert_eq!(err.message, "You can buy: 1 pcs!");
        assert_eq!(err.code, ErrorCode::InsufficientFunds);
    }

    #[test]
    fn test_storage_errors_are_500_and_opaque() {
        let err = ApiError::from(DbError::QueryFailed("near \"SELEC\": syntax error".to_string()));
        assert_eq!(err.status(), 500);
        assert!(!err.message.contains("SELEC"));
    }

    #[test]
    fn test_domain_error_unwraps() {
        let err = ApiError::from(DbError::Domain(CoreError::DuplicateProduct {
            name: "Cola".to_string(),
        }));
        assert_eq!(err.code, ErrorCode::Duplicate);
    }

    #[test]
    fn test_serialized_shape() {
        let err = ApiError::from(CoreError::ZeroBalance);
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "ZERO_BALANCE");
        assert_eq!(json["message"], "Your balance is 0. Please refill your account");
    }
}
