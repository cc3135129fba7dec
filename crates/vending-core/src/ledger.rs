//! # Account Ledger
//!
//! Pure mutations of a buyer's deposit balance. Storage writes the
//! resulting balance back; nothing here touches a database.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Deposit Lifecycle                                 │
//! │                                                                         │
//! │   add_deposit(coin) ──► deposit += coin        (buyer only)            │
//! │                                                                         │
//! │   reset_deposit()   ──► deposit = 0            (buyer, own account)    │
//! │                                                                         │
//! │   debit(amount)     ──► deposit -= amount      (purchase engine only)  │
//! │                         returns the change                              │
//! │                                                                         │
//! │   deposit never goes below zero                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::access::{require_role, require_self};
use crate::coin::Coin;
use crate::credit::Credit;
use crate::error::{CoreError, CoreResult, ValidationError};
use crate::types::{Role, User};

/// Adds an already-validated coin to a buyer's deposit.
///
/// ## Returns
/// The new balance.
///
/// ## Errors
/// - `WrongRole` if the account is not a buyer
/// - `Validation(Overflow)` if the balance would overflow
pub fn add_deposit(account: &mut User, coin: Coin) -> CoreResult<Credit> {
    require_role(account, Role::Buyer)?;

    let balance = account
        .balance()
        .checked_add(Credit::from(coin))
        .ok_or_else(|| ValidationError::Overflow {
            field: "deposit".to_string(),
        })?;

    account.deposit = balance.units();
    Ok(balance)
}

/// Sets a buyer's deposit back to zero.
///
/// Only the account owner may reset it, and only if they are a buyer.
/// Ownership is checked first.
pub fn reset_deposit(caller: &User, account: &mut User) -> CoreResult<()> {
    require_self(
        caller,
        &account.username,
        "Sorry but you can't reset someone else deposit",
    )?;
    require_role(caller, Role::Buyer)?;

    account.deposit = 0;
    Ok(())
}

/// Takes `amount` out of the deposit and returns what is left (the change).
///
/// Callers check funds first; a debit beyond the balance is refused
/// rather than driving the deposit negative.
pub fn debit(account: &mut User, amount: Credit) -> CoreResult<Credit> {
    if amount.is_negative() || amount > account.balance() {
        return Err(CoreError::InsufficientBalance {
            balance: account.deposit,
            requested: amount.units(),
        });
    }

    let change = account
        .balance()
        .checked_sub(amount)
        .ok_or(CoreError::InsufficientBalance {
            balance: account.deposit,
            requested: amount.units(),
        })?;

    account.deposit = change.units();
    Ok(change)
}

// =============================================================================
// Unit Tests
// =============================================================================
