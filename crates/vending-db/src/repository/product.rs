//! # Product Repository
//!
//! The catalog: products keyed by id and by `(seller_id, product_name)`.
//!
//! ## Key Operations
//! - Create / update / remove, owned by one seller
//! - Public lookup by name across all sellers
//! - Stock writes from completed purchases
//!
//! ## Catalog Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  insert(seller, details)                                                │
//! │       │                                                                 │
//! │       ├── validate_product_details   → Validation(InvalidCost, ...)     │
//! │       ├── same seller, same name?    → DuplicateProduct                 │
//! │       └── INSERT                                                        │
//! │                                                                         │
//! │  update(product, details)                                               │
//! │       │                                                                 │
//! │       ├── validate_product_details   → Validation(...)                  │
//! │       ├── new name taken by ANOTHER product of this seller?             │
//! │       │                              → DuplicateProduct                 │
//! │       └── UPDATE                                                        │
//! │                                                                         │
//! │  UNIQUE(seller_id, product_name) backs both checks in the schema.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::SqliteConnection;
use tracing::debug;
use vending_core::validation::{validate_product_details, validate_stock};
use vending_core::{CoreError, Product, ProductDetails};

use crate::error::{DbError, DbResult};

const PRODUCT_COLUMNS: &str = "id, product_name, amount_available, cost, seller_id";

/// Repository for product database operations.
#[derive(Debug, Clone, Copy)]
pub struct ProductRepository;

impl ProductRepository {
    /// Gets a product by its id.
    pub async fn find_by_id(conn: &mut SqliteConnection, id: i64) -> DbResult<Option<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1");

        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;

        Ok(product)
    }

    /// Gets one seller's product by name.
    pub async fn find_by_seller_and_name(
        conn: &mut SqliteConnection,
        seller_id: i64,
        product_name: &str,
    ) -> DbResult<Option<Product>> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE seller_id = ?1 AND product_name = ?2"
        );

        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(seller_id)
            .bind(product_name.trim())
            .fetch_optional(&mut *conn)
            .await?;

        Ok(product)
    }

    /// Lists every seller's product with this name, oldest first.
    pub async fn list_by_name(
        conn: &mut SqliteConnection,
        product_name: &str,
    ) -> DbResult<Vec<Product>> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE product_name = ?1 \
             ORDER BY id"
        );

        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(product_name.trim())
            .fetch_all(&mut *conn)
            .await?;

        debug!(name = %product_name, count = products.len(), "Listed products by name");
        Ok(products)
    }

    /// Inserts a new product for `seller_id`.
    ///
    /// ## Returns
    /// * `Ok(Product)` - Stored product with its generated id
    /// * `Err(DbError::Domain(Validation(..)))` - Bad name, cost or stock
    /// * `Err(DbError::Domain(DuplicateProduct))` - Seller already lists this name
    pub async fn insert(
        conn: &mut SqliteConnection,
        seller_id: i64,
        details: &ProductDetails,
    ) -> DbResult<Product> {
        validate_product_details(details).map_err(CoreError::from)?;
        let name = details.product_name.trim();

        debug!(seller_id = %seller_id, name = %name, "Inserting product");

        if Self::find_by_seller_and_name(conn, seller_id, name)
            .await?
            .is_some()
        {
            return Err(duplicate(name));
        }

        let sql = format!(
            "INSERT INTO products (product_name, amount_available, cost, seller_id) \
             VALUES (?1, ?2, ?3, ?4) \
             RETURNING {PRODUCT_COLUMNS}"
        );

        sqlx::query_as::<_, Product>(&sql)
            .bind(name)
            .bind(details.amount_available)
            .bind(details.cost)
            .bind(seller_id)
            .fetch_one(&mut *conn)
            .await
            .map_err(|e| unique_as_duplicate(e.into(), name))
    }

    /// Replaces the seller-supplied fields of product `id`.
    ///
    /// Renaming onto the product's own name is not a collision.
    pub async fn update(
        conn: &mut SqliteConnection,
        id: i64,
        details: &ProductDetails,
    ) -> DbResult<Product> {
        validate_product_details(details).map_err(CoreError::from)?;
        let name = details.product_name.trim();

        let current = Self::find_by_id(conn, id)
            .await?
            .ok_or_else(|| CoreError::ProductNotFound(id.to_string()))?;

        debug!(id = %id, name = %name, "Updating product");

        if let Some(other) = Self::find_by_seller_and_name(conn, current.seller_id, name).await? {
            if other.id != id {
                return Err(duplicate(name));
            }
        }

        let sql = format!(
            "UPDATE products SET product_name = ?2, amount_available = ?3, cost = ?4 \
             WHERE id = ?1 \
             RETURNING {PRODUCT_COLUMNS}"
        );

        sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .bind(name)
            .bind(details.amount_available)
            .bind(details.cost)
            .fetch_optional(&mut *conn)
            .await
            .map_err(|e| unique_as_duplicate(e.into(), name))?
            .ok_or_else(|| CoreError::ProductNotFound(id.to_string()).into())
    }

    /// Writes a new stock level.
    ///
    /// ## Arguments
    /// * `id` - Product id
    /// * `amount_available` - New stock, must be >= 0
    pub async fn update_stock(
        conn: &mut SqliteConnection,
        id: i64,
        amount_available: i64,
    ) -> DbResult<()> {
        validate_stock(amount_available).map_err(CoreError::from)?;

        debug!(id = %id, amount_available = %amount_available, "Updating stock");

        let result = sqlx::query("UPDATE products SET amount_available = ?2 WHERE id = ?1")
            .bind(id)
            .bind(amount_available)
            .execute(&mut *conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::ProductNotFound(id.to_string()).into());
        }

        Ok(())
    }

    /// Deletes product `id`.
    pub async fn delete(conn: &mut SqliteConnection, id: i64) -> DbResult<()> {
        debug!(id = %id, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::ProductNotFound(id.to_string()).into());
        }

        Ok(())
    }

    /// Counts products (for diagnostics and seeding).
    pub async fn count(conn: &mut SqliteConnection) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&mut *conn)
            .await?;

        Ok(count)
    }
}

fn duplicate(name: &str) -> DbError {
    CoreError::DuplicateProduct {
        name: name.to_string(),
    }
    .into()
}

fn unique_as_duplicate(err: DbError, name: &str) -> DbError {
    if err.is_unique_violation() {
        duplicate(name)
    } else {
        err
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::repository::user::UserRepository;
    use vending_core::{NewUser, Role, ValidationError};

    fn details(name: &str, cost: i64, amount_available: i64) -> ProductDetails {
        ProductDetails {
            product_name: name.to_string(),
            cost,
            amount_available,
        }
    }

    /// In-memory database with two sellers; returns their ids.
    async fn setup() -> (Database, i64, i64) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut conn = db.acquire().await.unwrap();

        let mut ids = Vec::new();
        for name in ["sam", "sue"] {
            let seller = UserRepository::insert(
                &mut conn,
                &NewUser {
                    username: name.to_string(),
                    password_hash: "hash".to_string(),
                    deposit: 0,
                    role: Role::Seller,
                },
            )
            .await
            .unwrap();
            ids.push(seller.id);
        }
        drop(conn);

        (db, ids[0], ids[1])
    }

    #[tokio::test]
    async fn test_insert_and_lookup() {
        let (db, sam, _) = setup().await;
        let mut conn = db.acquire().await.unwrap();

        let cola = ProductRepository::insert(&mut conn, sam, &details("Cola", 55, 4))
            .await
            .unwrap();
        assert_eq!(cola.seller_id, sam);
        assert_eq!(cola.cost, 55);

        let by_id = ProductRepository::find_by_id(&mut conn, cola.id).await.unwrap();
        assert_eq!(by_id.as_ref(), Some(&cola));

        let by_name = ProductRepository::find_by_seller_and_name(&mut conn, sam, "Cola")
            .await
            .unwrap();
        assert_eq!(by_name, Some(cola));
    }

    #[tokio::test]
    async fn test_cost_must_be_multiple_of_five() {
        let (db, sam, _) = setup().await;
        let mut conn = db.acquire().await.unwrap();

        let err = ProductRepository::insert(&mut conn, sam, &details("Cola", 52, 4))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::Validation(ValidationError::InvalidCost { cost: 52 }))
        ));

        let cola = ProductRepository::insert(&mut conn, sam, &details("Cola", 55, 4))
            .await
            .unwrap();
        let err = ProductRepository::update(&mut conn, cola.id, &details("Cola", 0, 4))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::Validation(ValidationError::InvalidCost { cost: 0 }))
        ));
    }

    #[tokio::test]
    async fn test_duplicate_name_per_seller() {
        let (db, sam, sue) = setup().await;
        let mut conn = db.acquire().await.unwrap();

        ProductRepository::insert(&mut conn, sam, &details("Cola", 55, 4))
            .await
            .unwrap();

        let err = ProductRepository::insert(&mut conn, sam, &details("Cola", 60, 1))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::DuplicateProduct { .. })));

        // Another seller may use the same name.
        ProductRepository::insert(&mut conn, sue, &details("Cola", 60, 1))
            .await
            .unwrap();

        let listed = ProductRepository::list_by_name(&mut conn, "Cola").await.unwrap();
        assert_eq!(listed.len(), 2);
    }

    #[tokio::test]
    async fn test_update_rename_collision() {
        let (db, sam, _) = setup().await;
        let mut conn = db.acquire().await.unwrap();

        let cola = ProductRepository::insert(&mut conn, sam, &details("Cola", 55, 4))
            .await
            .unwrap();
        ProductRepository::insert(&mut conn, sam, &details("Fanta", 40, 2))
            .await
            .unwrap();

        // Keeping its own name is fine.
        let updated = ProductRepository::update(&mut conn, cola.id, &details("Cola", 65, 9))
            .await
            .unwrap();
        assert_eq!(updated.cost, 65);
        assert_eq!(updated.amount_available, 9);

        let err = ProductRepository::update(&mut conn, cola.id, &details("Fanta", 65, 9))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::DuplicateProduct { .. })));
    }

    #[tokio::test]
    async fn test_update_stock_and_delete() {
        let (db, sam, _) = setup().await;
        let mut conn = db.acquire().await.unwrap();

        let cola = ProductRepository::insert(&mut conn, sam, &details("Cola", 55, 4))
            .await
            .unwrap();

        ProductRepository::update_stock(&mut conn, cola.id, 1).await.unwrap();
        let reloaded = ProductRepository::find_by_id(&mut conn, cola.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(reloaded.amount_available, 1);

        assert!(ProductRepository::update_stock(&mut conn, cola.id, -1)
            .await
            .is_err());

        ProductRepository::delete(&mut conn, cola.id).await.unwrap();
        assert!(matches!(
            ProductRepository::delete(&mut conn, cola.id).await,
            Err(DbError::Domain(CoreError::ProductNotFound(_)))
        ));
    }

    #[tokio::test]
    async fn test_products_removed_with_seller() {
        let (db, sam, _) = setup().await;
        let mut conn = db.acquire().await.unwrap();

        ProductRepository::insert(&mut conn, sam, &details("Cola", 55, 4))
            .await
            .unwrap();
        UserRepository::delete_by_username(&mut conn, "sam")
            .await
            .unwrap();

        assert_eq!(ProductRepository::count(&mut conn).await.unwrap(), 0);
        assert!(ProductRepository::list_by_name(&mut conn, "Cola")
            .await
            .unwrap()
            .is_empty());
    }
}
