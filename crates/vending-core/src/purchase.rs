//! # Purchase Engine
//!
//! Computes the outcome of buying `quantity` units of a product with a
//! buyer's deposit. The result is a [`PurchaseQuote`]: the new stock level,
//! the buyer's change and the receipt. Applying it (debit + stock update +
//! history row, in one transaction) is the storage layer's job.
//!
//! ## Check Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    quote(buyer, product, quantity)                      │
//! │                                                                         │
//! │  1. quantity > 0?                      no → MustBePositive              │
//! │  2. total = quantity × cost            overflow → Overflow              │
//! │  3. FUNDS: deposit >= total?                                            │
//! │        deposit == 0                    → ZeroBalance                    │
//! │        deposit / cost > 0              → InsufficientFunds(n)           │
//! │        otherwise                       → InsufficientFunds(0)           │
//! │  4. STOCK: available >= quantity?                                       │
//! │        available == 0                  → OutOfStock(0)                  │
//! │        otherwise                       → OutOfStock(available)          │
//! │  5. new_stock = available - quantity                                    │
//! │     change    = deposit - total                                         │
//! │                                                                         │
//! │  Funds are always checked before stock: when both fail, the funds      │
//! │  error is the one reported.                                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::credit::Credit;
use crate::error::{CoreError, CoreResult, ValidationError};
use crate::types::{Product, PurchaseReceipt, User};
use crate::validation::validate_quantity;

/// The computed effect of a purchase, before it is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseQuote {
    pub product_id: i64,
    pub product_name: String,
    pub quantity: i64,
    pub unit_cost: Credit,
    pub total_cost: Credit,
    /// Buyer's deposit after the purchase.
    pub change: Credit,
    /// Product stock after the purchase.
    pub new_stock: i64,
}

impl PurchaseQuote {
    /// The receipt returned to the buyer.
    pub fn receipt(&self) -> PurchaseReceipt {
        PurchaseReceipt {
            total_spent: self.quantity,
            product_name: self.product_name.clone(),
            change: self.change.units(),
        }
    }
}

/// Computes the outcome of `buyer` buying `quantity` of `product`.
///
/// Pure: neither argument is modified.
pub fn quote(buyer: &User, product: &Product, quantity: i64) -> CoreResult<PurchaseQuote> {
    validate_quantity(quantity)?;

    let deposit = buyer.balance();
    let unit_cost = product.price();
    let total_cost = unit_cost
        .checked_times(quantity)
        .ok_or_else(|| ValidationError::Overflow {
            field: "amount".to_string(),
        })?;

    check_funds(deposit, unit_cost, total_cost)?;
    check_stock(product, quantity)?;

    let change = deposit
        .checked_sub(total_cost)
        .ok_or(CoreError::InsufficientBalance {
            balance: deposit.units(),
            requested: total_cost.units(),
        })?;

    Ok(PurchaseQuote {
        product_id: product.id,
        product_name: product.product_name.clone(),
        quantity,
        unit_cost,
        total_cost,
        change,
        new_stock: product.amount_available - quantity,
    })
}

fn check_funds(deposit: Credit, unit_cost: Credit, total_cost: Credit) -> CoreResult<()> {
    if deposit >= total_cost {
        return Ok(());
    }

    if deposit.is_zero() {
        return Err(CoreError::ZeroBalance);
    }

    Err(CoreError::InsufficientFunds {
        max_affordable: deposit.affordable_count(unit_cost),
    })
}

fn check_stock(product: &Product, quantity: i64) -> CoreResult<()> {
    if product.has_stock_for(quantity) {
        return Ok(());
    }

    Err(CoreError::OutOfStock {
        available: product.amount_available.max(0),
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
