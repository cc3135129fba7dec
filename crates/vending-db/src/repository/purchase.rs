//! # Purchase Repository
//!
//! Append-only purchase history, plus the write-back of a purchase quote.
//!
//! ## Applying a Quote
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  tx = db.begin()                                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  PurchaseRepository::apply(&mut tx, buyer_id, &quote)                   │
//! │       ├── users.deposit            = quote.change                       │
//! │       ├── products.amount_available = quote.new_stock                   │
//! │       └── INSERT INTO purchases (...)                                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  tx.commit()   ← all three rows change, or none do                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqliteConnection;
use tracing::debug;
use uuid::Uuid;
use vending_core::{PurchaseQuote, PurchaseRecord};

use crate::error::DbResult;
use crate::repository::product::ProductRepository;
use crate::repository::user::UserRepository;

const PURCHASE_COLUMNS: &str = "id, buyer_id, product_id, product_name, quantity, \
                                unit_cost, total_cost, change, created_at";

/// Repository for purchase history.
#[derive(Debug, Clone, Copy)]
pub struct PurchaseRepository;

impl PurchaseRepository {
    /// Writes the buyer's change, the product's new stock and the history
    /// row. Run it inside a transaction.
    pub async fn apply(
        conn: &mut SqliteConnection,
        buyer_id: i64,
        quote: &PurchaseQuote,
    ) -> DbResult<PurchaseRecord> {
        UserRepository::set_deposit(conn, buyer_id, quote.change.units()).await?;
        ProductRepository::update_stock(conn, quote.product_id, quote.new_stock).await?;
        Self::record(conn, buyer_id, quote).await
    }

    /// Inserts the history row for a quote.
    pub async fn record(
        conn: &mut SqliteConnection,
        buyer_id: i64,
        quote: &PurchaseQuote,
    ) -> DbResult<PurchaseRecord> {
        let record = PurchaseRecord {
            id: generate_purchase_id(),
            buyer_id,
            product_id: quote.product_id,
            product_name: quote.product_name.clone(),
            quantity: quote.quantity,
            unit_cost: quote.unit_cost.units(),
            total_cost: quote.total_cost.units(),
            change: quote.change.units(),
            created_at: Utc::now(),
        };

        debug!(
            id = %record.id,
            buyer_id = %buyer_id,
            product_id = %record.product_id,
            quantity = %record.quantity,
            "Recording purchase"
        );

        let sql = format!("INSERT INTO purchases ({PURCHASE_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)");

        sqlx::query(&sql)
            .bind(&record.id)
            .bind(record.buyer_id)
            .bind(record.product_id)
            .bind(&record.product_name)
            .bind(record.quantity)
            .bind(record.unit_cost)
            .bind(record.total_cost)
            .bind(record.change)
            .bind(record.created_at)
            .execute(&mut *conn)
            .await?;

        Ok(record)
    }

    /// Lists a buyer's purchases, most recent first.
    pub async fn list_by_buyer(
        conn: &mut SqliteConnection,
        buyer_id: i64,
        limit: u32,
    ) -> DbResult<Vec<PurchaseRecord>> {
        let sql = format!(
            "SELECT {PURCHASE_COLUMNS} FROM purchases \
             WHERE buyer_id = ?1 \
             ORDER BY created_at DESC, rowid DESC \
             LIMIT ?2"
        );

        let records = sqlx::query_as::<_, PurchaseRecord>(&sql)
            .bind(buyer_id)
            .bind(limit)
            .fetch_all(&mut *conn)
            .await?;

        Ok(records)
    }
}

/// Generates a new purchase ID.
pub fn generate_purchase_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::pool::{Database, DbConfig};
    use vending_core::{purchase, CoreError, NewUser, ProductDetails, Role};

    async fn setup() -> (Database, i64, i64) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut conn = db.acquire().await.unwrap();

        let seller = UserRepository::insert(
            &mut conn,
            &NewUser {
                username: "sam".to_string(),
                password_hash: "hash".to_string(),
                deposit: 0,
                role: Role::Seller,
            },
        )
        .await
        .unwrap();
        let buyer = UserRepository::insert(
            &mut conn,
            &NewUser {
                username: "bob".to_string(),
                password_hash: "hash".to_string(),
                deposit: 150,
                role: Role::Buyer,
            },
        )
        .await
        .unwrap();
        let cola = ProductRepository::insert(
            &mut conn,
            seller.id,
            &ProductDetails {
                product_name: "Cola".to_string(),
                cost: 50,
                amount_available: 5,
            },
        )
        .await
        .unwrap();
        drop(conn);

        (db, buyer.id, cola.id)
    }

    async fn quote_for(db: &Database, buyer_id: i64, product_id: i64, qty: i64) -> PurchaseQuote {
        let mut conn = db.acquire().await.unwrap();
        let buyer = UserRepository::find_by_id(&mut conn, buyer_id)
            .await
            .unwrap()
            .unwrap();
        let product = ProductRepository::find_by_id(&mut conn, product_id)
            .await
            .unwrap()
            .unwrap();
        purchase::quote(&buyer, &product, qty).unwrap()
    }

    #[tokio::test]
    async fn test_apply_writes_all_three_rows() {
        let (db, buyer_id, cola_id) = setup().await;
        let quote = quote_for(&db, buyer_id, cola_id, 2).await;

        let mut tx = db.begin().await.unwrap();
        let record = PurchaseRepository::apply(&mut tx, buyer_id, &quote)
            .await
            .unwrap();
        tx.commit().await.unwrap();

        assert_eq!(record.total_cost, 100);
        assert_eq!(record.change, 50);

        let mut conn = db.acquire().await.unwrap();
        let buyer = UserRepository::find_by_id(&mut conn, buyer_id)
            .await
            .unwrap()
            .unwrap();
        let cola = ProductRepository::find_by_id(&mut conn, cola_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(buyer.deposit, 50);
        assert_eq!(cola.amount_available, 3);

        let history = PurchaseRepository::list_by_buyer(&mut conn, buyer_id, 10)
            .await
            .unwrap();
        assert_eq!(history, vec![record]);
    }

    #[tokio::test]
    async fn test_failed_apply_rolls_back() {
        let (db, buyer_id, cola_id) = setup().await;
        let mut quote = quote_for(&db, buyer_id, cola_id, 2).await;
        // Point the stock write at a product that doesn't exist.
        quote.product_id = 999;

        {
            let mut tx = db.begin().await.unwrap();
            let err = PurchaseRepository::apply(&mut tx, buyer_id, &quote)
                .await
                .unwrap_err();
            assert!(matches!(err, DbError::Domain(CoreError::ProductNotFound(_))));
        }

        let mut conn = db.acquire().await.unwrap();
        let buyer = UserRepository::find_by_id(&mut conn, buyer_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(buyer.deposit, 150);
        assert!(PurchaseRepository::list_by_buyer(&mut conn, buyer_id, 10)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_history_most_recent_first() {
        let (db, buyer_id, cola_id) = setup().await;

        let mut ids = Vec::new();
        for _ in 0..2 {
            let quote = quote_for(&db, buyer_id, cola_id, 1).await;
            let mut tx = db.begin().await.unwrap();
            ids.push(
                PurchaseRepository::apply(&mut tx, buyer_id, &quote)
                    .await
                    .unwrap()
                    .id,
            );
            tx.commit().await.unwrap();
        }

        let mut conn = db.acquire().await.unwrap();
        let history = PurchaseRepository::list_by_buyer(&mut conn, buyer_id, 10)
            .await
            .unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].id, ids[1]);
        assert_eq!(history[0].change, 50);

        let limited = PurchaseRepository::list_by_buyer(&mut conn, buyer_id, 1)
            .await
            .unwrap();
        assert_eq!(limited.len(), 1);
    }
}
