//! # User Commands
//!
//! Registration, profile reads and updates, removal, and the deposit
//! operations of a buyer's account.
//!
//! ## Deposit Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  PUT /deposit { "coinValue": 20 }                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  lock User(caller)                                                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  authenticate(creds, Buyer)        ── 401 / RoleError                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  validate_coin(20)                 ── not in [5,10,20,50,100] → 400     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ledger::add_deposit(&mut user)    ── new balance                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  UserRepository::set_deposit                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use tracing::info;
use vending_core::access::require_self;
use vending_core::coin::validate_coin;
use vending_core::password::hash_password;
use vending_core::validation::{validate_opening_deposit, validate_password, validate_username};
use vending_core::{ledger, CoreError, Credentials, NewUser, Role, User};
use vending_db::UserRepository;

use crate::access::authenticate;
use crate::error::ApiResult;
use crate::service::VendingService;

// =============================================================================
// DTOs
// =============================================================================

/// Registration payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUserRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub deposit: i64,
    pub role: Role,
}

/// Self-update payload. The deposit is not writable here.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub password: String,
    pub role: Role,
}

/// A coin inserted into the machine.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositRequest {
    pub coin_value: i64,
}

/// User as returned to callers: no password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub deposit: i64,
    pub role: Role,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        UserResponse {
            id: u.id,
            username: u.username,
            deposit: u.deposit,
            role: u.role,
        }
    }
}

// =============================================================================
// Commands
// =============================================================================

/// `POST /user`: public registration.
pub async fn register_user(svc: &VendingService, req: NewUserRequest) -> ApiResult<UserResponse> {
    let username = req.username.trim();

    validate_username(username)?;
    validate_password(&req.password)?;
    validate_opening_deposit(req.deposit)?;

    let new_user = NewUser {
        username: username.to_string(),
        password_hash: hash_password(&req.password)?,
        deposit: req.deposit,
        role: req.role,
    };

    let mut conn = svc.db().acquire().await?;
    let user = UserRepository::insert(&mut conn, &new_user).await?;

    info!(id = %user.id, username = %user.username, role = %user.role, "User registered");
    Ok(user.into())
}

/// `GET /user/{username}`: any authenticated caller.
pub async fn read_user(
    svc: &VendingService,
    creds: &Credentials,
    username: &str,
) -> ApiResult<UserResponse> {
    let mut conn = svc.db().acquire().await?;
    authenticate(&mut conn, creds, None).await?;

    let user = UserRepository::find_by_username(&mut conn, username)
        .await?
        .ok_or_else(|| CoreError::UserNotFound(username.to_string()))?;

    Ok(user.into())
}

/// `PUT /user/{username}`: the account owner changes password and role.
pub async fn update_user(
    svc: &VendingService,
    creds: &Credentials,
    username: &str,
    req: UpdateUserRequest,
) -> ApiResult<UserResponse> {
    let _guard = svc.locks().lock_user(username).await;
    let mut conn = svc.db().acquire().await?;

    let caller = authenticate(&mut conn, creds, None).await?;
    require_self(
        &caller,
        username,
        "Sorry but you can't change someone else account",
    )?;
    validate_password(&req.password)?;

    let password_hash = hash_password(&req.password)?;
    let user = UserRepository::update_profile(&mut conn, caller.id, &password_hash, req.role).await?;

    info!(username = %user.username, role = %user.role, "User updated");
    Ok(user.into())
}

/// `DELETE /user/{username}`: admin only. The user's products go too.
pub async fn remove_user(svc: &VendingService, creds: &Credentials, username: &str) -> ApiResult<()> {
    let mut conn = svc.db().acquire().await?;
    let admin = authenticate(&mut conn, creds, Some(Role::Admin)).await?;
    drop(conn);

    let _guard = svc.locks().lock_user(username).await;
    let mut conn = svc.db().acquire().await?;
    UserRepository::delete_by_username(&mut conn, username).await?;

    info!(username = %username, by = %admin.username, "User removed");
    Ok(())
}

/// `PUT /deposit`: a buyer inserts one coin.
pub async fn deposit(
    svc: &VendingService,
    creds: &Credentials,
    req: DepositRequest,
) -> ApiResult<UserResponse> {
    let _guard = svc.locks().lock_user(&creds.username).await;
    let mut conn = svc.db().acquire().await?;

    let mut buyer = authenticate(&mut conn, creds, Some(Role::Buyer)).await?;
    let coin = validate_coin(req.coin_value)?;

    let balance = ledger::add_deposit(&mut buyer, coin)?;
    UserRepository::set_deposit(&mut conn, buyer.id, balance.units()).await?;

    info!(username = %buyer.username, coin = %coin, balance = %balance, "Deposit added");
    Ok(buyer.into())
}

/// `PUT /reset?username=`: a buyer empties their own deposit.
pub async fn reset_deposit(
    svc: &VendingService,
    creds: &Credentials,
    username: &str,
) -> ApiResult<UserResponse> {
    let _guard = svc.locks().lock_user(username).await;
    let mut conn = svc.db().acquire().await?;

    let caller = authenticate(&mut conn, creds, None).await?;
    require_self(
        &caller,
        username,
        "Sorry but you can't reset someone else deposit",
    )?;
    let mut account = UserRepository::find_by_username(&mut conn, username)
        .await?
        .ok_or_else(|| CoreError::UserNotFound(username.to_string()))?;

    ledger::reset_deposit(&caller, &mut account)?;
    UserRepository::set_deposit(&mut conn, account.id, account.deposit).await?;

    info!(username = %account.username, "Deposit reset");
    Ok(account.into())
}

// =============================================================================
// Unit Tests
// =============================================================================
