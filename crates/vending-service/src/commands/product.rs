//! # Product Commands
//!
//! Catalog management for sellers and the public product lookup.
//!
//! ## Ownership
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  PUT /product/Cola   (caller: seller "sam")                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  sam lists "Cola"? ── yes ──► lock Product(id) ──► recheck ──► update   │
//! │       │                                                                 │
//! │       no                                                                │
//! │       │                                                                 │
//! │  another seller lists "Cola"? ── yes ──► Forbidden                      │
//! │       │                                                                 │
//! │       no ──► ProductNotFound                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Deserialize;
use tracing::info;
use vending_core::access::require_product_owner;
use vending_core::{CoreError, Credentials, Product, ProductDetails, Role, User};
use vending_db::{ProductRepository, SqliteConnection};

use crate::access::authenticate;
use crate::error::ApiResult;
use crate::service::VendingService;

/// Product payload for create and update.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRequest {
    pub product_name: String,
    pub cost: i64,
    pub amount_available: i64,
}

impl From<ProductRequest> for ProductDetails {
    fn from(req: ProductRequest) -> Self {
        ProductDetails {
            product_name: req.product_name,
            cost: req.cost,
            amount_available: req.amount_available,
        }
    }
}

/// `POST /product`: a seller lists a new product.
pub async fn create_product(
    svc: &VendingService,
    creds: &Credentials,
    req: ProductRequest,
) -> ApiResult<Product> {
    let mut conn = svc.db().acquire().await?;
    let seller = authenticate(&mut conn, creds, Some(Role::Seller)).await?;

    let product = ProductRepository::insert(&mut conn, seller.id, &req.into()).await?;

    info!(
        id = %product.id,
        name = %product.product_name,
        seller = %seller.username,
        "Product created"
    );
    Ok(product)
}

/// `GET /product/{name}`: public lookup across all sellers. No match is an
/// empty list.
pub async fn find_products(svc: &VendingService, name: &str) -> ApiResult<Vec<Product>> {
    let mut conn = svc.db().acquire().await?;
    Ok(ProductRepository::list_by_name(&mut conn, name).await?)
}

/// `PUT /product/{name}`: the owning seller replaces the product's fields.
pub async fn update_product(
    svc: &VendingService,
    creds: &Credentials,
    name: &str,
    req: ProductRequest,
) -> ApiResult<Product> {
    let mut conn = svc.db().acquire().await?;
    let seller = authenticate(&mut conn, creds, Some(Role::Seller)).await?;
    let product = owned_product(&mut conn, &seller, name).await?;
    drop(conn);

    let _guard = svc.locks().lock_product(product.id).await;
    let mut conn = svc.db().acquire().await?;
    let product = still_named(&mut conn, seller.id, product.id, name).await?;
    let updated = ProductRepository::update(&mut conn, product.id, &req.into()).await?;

    info!(id = %updated.id, name = %updated.product_name, "Product updated");
    Ok(updated)
}

/// `DELETE /product/{name}`: the owning seller removes the product.
/// Returns the removed product.
pub async fn delete_product(
    svc: &VendingService,
    creds: &Credentials,
    name: &str,
) -> ApiResult<Product> {
    let mut conn = svc.db().acquire().await?;
    let seller = authenticate(&mut conn, creds, Some(Role::Seller)).await?;
    let product = owned_product(&mut conn, &seller, name).await?;
    drop(conn);

    let _guard = svc.locks().lock_product(product.id).await;
    let mut conn = svc.db().acquire().await?;
    let product = still_named(&mut conn, seller.id, product.id, name).await?;
    ProductRepository::delete(&mut conn, product.id).await?;

    info!(id = %product.id, name = %product.product_name, "Product deleted");
    Ok(product)
}

/// Finds `seller`'s product called `name`.
///
/// If only other sellers list that name the caller is refused rather than
/// told it doesn't exist.
async fn owned_product(
    conn: &mut SqliteConnection,
    seller: &User,
    name: &str,
) -> ApiResult<Product> {
    if let Some(product) = ProductRepository::find_by_seller_and_name(conn, seller.id, name).await? {
        return Ok(product);
    }

    if let Some(other) = ProductRepository::list_by_name(conn, name).await?.first() {
        require_product_owner(seller, other)?;
    }

    Err(CoreError::ProductNotFound(name.to_string()).into())
}

/// Re-reads product `id` once its lock is held. A rename or removal that
/// landed before the lock means `name` no longer refers to it.
async fn still_named(
    conn: &mut SqliteConnection,
    seller_id: i64,
    id: i64,
    name: &str,
) -> ApiResult<Product> {
    match ProductRepository::find_by_id(conn, id).await? {
        Some(product) if product.seller_id == seller_id && product.product_name == name.trim() => {
            Ok(product)
        }
        _ => Err(CoreError::ProductNotFound(name.to_string()).into()),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
