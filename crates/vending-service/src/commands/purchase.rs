//! # Purchase Commands
//!
//! The buy operation and the buyer's purchase history.
//!
//! ## Buy Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  GET /buy?productId=7&amount=2                                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  lock User(caller) ──► lock Product(7)       (always in this order)     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  authenticate(creds, Buyer)                  ── 401 / RoleError         │
//! │  ProductRepository::find_by_id               ── ProductNotFound         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  purchase::quote(buyer, product, 2)          ── ZeroBalance              │
//! │       │                                         InsufficientFunds(n)    │
//! │       │                                         OutOfStock(k)           │
//! │       ▼                                                                 │
//! │  BEGIN                                                                  │
//! │    PurchaseRepository::apply                 deposit, stock, history    │
//! │  COMMIT                                                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  { totalSpent: 2, productName, change }                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Reads happen under the locks but before the transaction opens, so the
//! transaction's first statement is a write. Nothing else can change the
//! locked rows in between.

use serde::Deserialize;
use tracing::info;
use vending_core::{ledger, purchase, CoreError, Credentials, PurchaseReceipt, PurchaseRecord, Role};
use vending_db::{DbError, ProductRepository, PurchaseRepository};

use crate::access::authenticate;
use crate::error::{ApiError, ApiResult};
use crate::service::VendingService;

/// Default and maximum number of history rows returned.
pub const DEFAULT_HISTORY_LIMIT: u32 = 50;
pub const MAX_HISTORY_LIMIT: u32 = 500;

/// Query of `GET /buy`.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuyRequest {
    pub product_id: i64,
    pub amount: i64,
}

/// `GET /buy`: a buyer spends their deposit on `amount` units of a product.
pub async fn buy(
    svc: &VendingService,
    creds: &Credentials,
    req: BuyRequest,
) -> ApiResult<PurchaseReceipt> {
    let (_user_guard, _product_guard) = svc
        .locks()
        .lock_user_and_product(&creds.username, req.product_id)
        .await;

    let mut conn = svc.db().acquire().await?;
    let mut buyer = authenticate(&mut conn, creds, Some(Role::Buyer)).await?;

    let product = ProductRepository::find_by_id(&mut conn, req.product_id)
        .await?
        .ok_or_else(|| CoreError::ProductNotFound(req.product_id.to_string()))?;
    drop(conn);

    let quote = purchase::quote(&buyer, &product, req.amount)?;
    let change = ledger::debit(&mut buyer, quote.total_cost)?;
    if change != quote.change {
        return Err(ApiError::internal("Purchase change mismatch"));
    }

    let mut tx = svc.db().begin().await?;
    let record = PurchaseRepository::apply(&mut tx, buyer.id, &quote).await?;
    tx.commit()
        .await
        .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

    info!(
        purchase_id = %record.id,
        buyer = %buyer.username,
        product = %quote.product_name,
        quantity = quote.quantity,
        total = %quote.total_cost,
        change = %quote.change,
        "Purchase completed"
    );

    Ok(quote.receipt())
}

/// The caller's purchases, most recent first.
pub async fn purchase_history(
    svc: &VendingService,
    creds: &Credentials,
    limit: Option<u32>,
) -> ApiResult<Vec<PurchaseRecord>> {
    let limit = limit.unwrap_or(DEFAULT_HISTORY_LIMIT).clamp(1, MAX_HISTORY_LIMIT);

    let mut conn = svc.db().acquire().await?;
    let buyer = authenticate(&mut conn, creds, Some(Role::Buyer)).await?;

    Ok(PurchaseRepository::list_by_buyer(&mut conn, buyer.id, limit).await?)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::product::{create_product, find_products, ProductRequest};
    use crate::commands::test_support::{creds, register, service};
    use crate::commands::user::read_user;
    use crate::error::ErrorCode;

    /// Seller "sam" lists Cola; buyer "bob" has `deposit`. Returns the product id.
    async fn setup(svc: &VendingService, deposit: i64, cost: i64, stock: i64) -> i64 {
        register(svc, "sam", Role::Seller, 0).await;
        register(svc, "bob", Role::Buyer, deposit).await;

        create_product(
            svc,
            &creds("sam"),
            ProductRequest {
                product_name: "Cola".to_string(),
                cost,
                amount_available: stock,
            },
        )
        .await
        .unwrap()
        .id
    }

    async fn buy_two(svc: &VendingService, product_id: i64) -> ApiResult<PurchaseReceipt> {
        buy(
            svc,
            &creds("bob"),
            BuyRequest {
                product_id,
                amount: 2,
            },
        )
        .await
    }

    #[tokio::test]
    async fn test_successful_purchase() {
        let svc = service().await;
        let id = setup(&svc, 150, 50, 5).await;

        let receipt = buy_two(&svc, id).await.unwrap();
        assert_eq!(
            receipt,
            PurchaseReceipt {
                total_spent: 2,
                product_name: "Cola".to_string(),
                change: 50,
            }
        );

        let stock = find_products(&svc, "Cola").await.unwrap()[0].amount_available;
        assert_eq!(stock, 3);
        let bob = read_user(&svc, &creds("bob"), "bob").await.unwrap();
        assert_eq!(bob.deposit, 50);

        let history = purchase_history(&svc, &creds("bob"), None).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].total_cost, 100);
    }

    #[tokio::test]
    async fn test_zero_balance() {
        let svc = service().await;
        let id = setup(&svc, 0, 55, 1).await;

        let err = buy_two(&svc, id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ZeroBalance);
        assert_eq!(err.message, "Your balance is 0. Please refill your account");
    }

    #[tokio::test]
    async fn test_insufficient_funds_reports_affordable_count() {
        let svc = service().await;
        let id = setup(&svc, 60, 55, 1).await;

        let err = buy_two(&svc, id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InsufficientFunds);
        assert_eq!(err.message, "You can buy: 1 pcs!");
    }

    #[tokio::test]
    async fn test_deposit_below_cost() {
        let svc = service().await;
        let id = setup(&svc, 50, 55, 5).await;

        let err = buy_two(&svc, id).await.unwrap_err();
        assert_eq!(
            err.message,
            "You can buy no pcs. Try deposit or choose another product!"
        );
    }

    #[tokio::test]
    async fn test_out_of_stock() {
        let svc = service().await;
        let id = setup(&svc, 150, 55, 1).await;

        let err = buy_two(&svc, id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::OutOfStock);
        assert_eq!(err.message, "Only 1 pcs available");

        // Nothing was charged.
        let bob = read_user(&svc, &creds("bob"), "bob").await.unwrap();
        assert_eq!(bob.deposit, 150);
    }

    #[tokio::test]
    async fn test_sold_out() {
        let svc = service().await;
        let id = setup(&svc, 150, 55, 0).await;

        let err = buy_two(&svc, id).await.unwrap_err();
        assert_eq!(
            err.message,
            "No product amount available. Please try another product"
        );
    }

    #[tokio::test]
    async fn test_seller_cannot_buy() {
        let svc = service().await;
        let id = setup(&svc, 150, 50, 5).await;

        let err = buy(
            &svc,
            &creds("sam"),
            BuyRequest {
                product_id: id,
                amount: 1,
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::RoleError);
    }

    #[tokio::test]
    async fn test_unknown_product_and_bad_amount() {
        let svc = service().await;
        let id = setup(&svc, 150, 50, 5).await;

        let err = buy_two(&svc, id + 100).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);

        let err = buy(
            &svc,
            &creds("bob"),
            BuyRequest {
                product_id: id,
                amount: 0,
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_purchases_never_oversell() {
        let svc = service().await;
        let id = setup(&svc, 150, 50, 3).await;
        register(&svc, "bea", Role::Buyer, 150).await;

        let mut handles = Vec::new();
        for buyer in ["bob", "bea"] {
            let svc = svc.clone();
            handles.push(tokio::spawn(async move {
                buy(
                    &svc,
                    &creds(buyer),
                    BuyRequest {
                        product_id: id,
                        amount: 2,
                    },
                )
                .await
            }));
        }

        let mut successes = 0;
        let mut failures = Vec::new();
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => successes += 1,
                Err(err) => failures.push(err),
            }
        }

        assert_eq!(successes, 1);
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].code, ErrorCode::OutOfStock);
        assert_eq!(failures[0].message, "Only 1 pcs available");

        let stock = find_products(&svc, "Cola").await.unwrap()[0].amount_available;
        assert_eq!(stock, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_purchases_by_one_buyer_never_overdraw() {
        let svc = service().await;
        // 150 covers one purchase of two at 50, not two.
        let id = setup(&svc, 150, 50, 10).await;

        let handles: Vec<_> = (0..2)
            .map(|_| {
                let svc = svc.clone();
                tokio::spawn(async move { buy_two(&svc, id).await })
            })
            .collect();

        let mut outcomes = Vec::new();
        for handle in handles {
            outcomes.push(handle.await.unwrap());
        }

        assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
        let bob = read_user(&svc, &creds("bob"), "bob").await.unwrap();
        assert_eq!(bob.deposit, 50);
        let stock = find_products(&svc, "Cola").await.unwrap()[0].amount_available;
        assert_eq!(stock, 8);
    }
}
