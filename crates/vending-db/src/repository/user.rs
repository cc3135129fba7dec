//! # User Repository
//!
//! Storage for accounts: credential lookup, registration, deposit writes
//! and removal.
//!
//! ## Deposit Writes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  The ledger rules live in vending_core::ledger. This repository only    │
//! │  persists the balance the ledger computed:                              │
//! │                                                                         │
//! │     ledger::add_deposit(&mut user, coin)?      (pure, checked)          │
//! │     UserRepository::set_deposit(conn, user.id, user.deposit)            │
//! │                                                                         │
//! │  The caller holds the user's entity lock across read → compute →        │
//! │  write, so the absolute write never loses a concurrent update.          │
//! │  The table's CHECK (deposit >= 0) is the last line of defence.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::SqliteConnection;
use tracing::debug;
use vending_core::{CoreError, NewUser, Role, User};

use crate::error::{DbError, DbResult};

const USER_COLUMNS: &str = "id, username, password_hash, deposit, role";

/// Repository for user database operations.
///
/// Every function takes a connection, so it works the same on a pooled
/// connection and inside a transaction.
#[derive(Debug, Clone, Copy)]
pub struct UserRepository;

impl UserRepository {
    /// Looks up a user by username (the credential store lookup).
    pub async fn find_by_username(
        conn: &mut SqliteConnection,
        username: &str,
    ) -> DbResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?1");

        let user = sqlx::query_as::<_, User>(&sql)
            .bind(username)
            .fetch_optional(&mut *conn)
            .await?;

        Ok(user)
    }

    /// Looks up a user by id.
    pub async fn find_by_id(conn: &mut SqliteConnection, id: i64) -> DbResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1");

        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;

        Ok(user)
    }

    /// Inserts a new user.
    ///
    /// ## Returns
    /// * `Ok(User)` - Stored user with its generated id
    /// * `Err(DbError::Domain(DuplicateUser))` - Username taken
    pub async fn insert(conn: &mut SqliteConnection, user: &NewUser) -> DbResult<User> {
        debug!(username = %user.username, role = %user.role, "Inserting user");

        let sql = format!(
            "INSERT INTO users (username, password_hash, deposit, role) \
             VALUES (?1, ?2, ?3, ?4) \
             RETURNING {USER_COLUMNS}"
        );

        let result = sqlx::query_as::<_, User>(&sql)
            .bind(&user.username)
            .bind(&user.password_hash)
            .bind(user.deposit)
            .bind(user.role)
            .fetch_one(&mut *conn)
            .await;

        match result {
            Ok(stored) => Ok(stored),
            Err(err) => match DbError::from(err) {
                e if e.is_unique_violation() => Err(CoreError::DuplicateUser {
                    username: user.username.clone(),
                }
                .into()),
                e => Err(e),
            },
        }
    }

    /// Replaces the password hash and role of a user.
    pub async fn update_profile(
        conn: &mut SqliteConnection,
        id: i64,
        password_hash: &str,
        role: Role,
    ) -> DbResult<User> {
        debug!(id = %id, role = %role, "Updating user profile");

        let sql = format!(
            "UPDATE users SET password_hash = ?2, role = ?3 \
             WHERE id = ?1 \
             RETURNING {USER_COLUMNS}"
        );

        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(password_hash)
            .bind(role)
            .fetch_optional(&mut *conn)
            .await?
            .ok_or_else(|| DbError::not_found("User", id))
    }

    /// Writes a new deposit balance.
    ///
    /// ## Arguments
    /// * `id` - User id
    /// * `deposit` - New balance in base coin units, already checked by the ledger
    pub async fn set_deposit(conn: &mut SqliteConnection, id: i64, deposit: i64) -> DbResult<()> {
        debug!(id = %id, deposit = %deposit, "Setting deposit");

        let result = sqlx::query("UPDATE users SET deposit = ?2 WHERE id = ?1")
            .bind(id)
            .bind(deposit)
            .execute(&mut *conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("User", id));
        }

        Ok(())
    }

    /// Deletes a user by username. Their products go with them.
    pub async fn delete_by_username(conn: &mut SqliteConnection, username: &str) -> DbResult<()> {
        debug!(username = %username, "Deleting user");

        let result = sqlx::query("DELETE FROM users WHERE username = ?1")
            .bind(username)
            .execute(&mut *conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::UserNotFound(username.to_string()).into());
        }

        Ok(())
    }

    /// Counts users (for diagnostics and seeding).
    pub async fn count(conn: &mut SqliteConnection) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&mut *conn)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    fn new_user(username: &str, role: Role, deposit: i64) -> NewUser {
        NewUser {
            username: username.to_string(),
            password_hash: "$argon2id$placeholder".to_string(),
            deposit,
            role,
        }
    }

    async fn setup() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let db = setup().await;
        let mut conn = db.acquire().await.unwrap();

        let stored = UserRepository::insert(&mut conn, &new_user("bob", Role::Buyer, 15))
            .await
            .unwrap();
        assert!(stored.id > 0);
        assert_eq!(stored.deposit, 15);
        assert_eq!(stored.role, Role::Buyer);

        let found = UserRepository::find_by_username(&mut conn, "bob")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found, stored);

        let by_id = UserRepository::find_by_id(&mut conn, stored.id).await.unwrap();
        assert_eq!(by_id, Some(stored));

        assert!(UserRepository::find_by_username(&mut conn, "nobody")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_duplicate_username_is_domain_error() {
        let db = setup().await;
        let mut conn = db.acquire().await.unwrap();

        UserRepository::insert(&mut conn, &new_user("bob", Role::Buyer, 0))
            .await
            .unwrap();
        let err = UserRepository::insert(&mut conn, &new_user("bob", Role::Seller, 0))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DbError::Domain(CoreError::DuplicateUser { ref username }) if username == "bob"
        ));
    }

    #[tokio::test]
    async fn test_set_deposit() {
        let db = setup().await;
        let mut conn = db.acquire().await.unwrap();

        let user = UserRepository::insert(&mut conn, &new_user("bob", Role::Buyer, 0))
            .await
            .unwrap();
        UserRepository::set_deposit(&mut conn, user.id, 120).await.unwrap();

        let reloaded = UserRepository::find_by_id(&mut conn, user.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(reloaded.deposit, 120);

        assert!(matches!(
            UserRepository::set_deposit(&mut conn, 999, 5).await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_negative_deposit_rejected_by_schema() {
        let db = setup().await;
        let mut conn = db.acquire().await.unwrap();

        let user = UserRepository::insert(&mut conn, &new_user("bob", Role::Buyer, 0))
            .await
            .unwrap();
        let err = UserRepository::set_deposit(&mut conn, user.id, -5)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::CheckViolation(_)));
    }

    #[tokio::test]
    async fn test_update_profile() {
        let db = setup().await;
        let mut conn = db.acquire().await.unwrap();

        let user = UserRepository::insert(&mut conn, &new_user("sam", Role::Buyer, 10))
            .await
            .unwrap();
        let updated = UserRepository::update_profile(&mut conn, user.id, "new-hash", Role::Seller)
            .await
            .unwrap();

        assert_eq!(updated.role, Role::Seller);
        assert_eq!(updated.password_hash, "new-hash");
        assert_eq!(updated.deposit, 10);
    }

    #[tokio::test]
    async fn test_delete_by_username() {
        let db = setup().await;
        let mut conn = db.acquire().await.unwrap();

        UserRepository::insert(&mut conn, &new_user("bob", Role::Buyer, 0))
            .await
            .unwrap();
        UserRepository::delete_by_username(&mut conn, "bob").await.unwrap();
        assert_eq!(UserRepository::count(&mut conn).await.unwrap(), 0);

        assert!(matches!(
            UserRepository::delete_by_username(&mut conn, "bob").await,
            Err(DbError::Domain(CoreError::UserNotFound(_)))
        ));
    }

    #[tokio::test]
    async fn test_writes_roll_back_with_transaction() {
        let db = setup().await;
        let user = {
            let mut conn = db.acquire().await.unwrap();
            UserRepository::insert(&mut conn, &new_user("bob", Role::Buyer, 50))
                .await
                .unwrap()
        };

        {
            let mut tx = db.begin().await.unwrap();
            UserRepository::set_deposit(&mut tx, user.id, 0).await.unwrap();
            // dropped without commit
        }

        let mut conn = db.acquire().await.unwrap();
        let reloaded = UserRepository::find_by_id(&mut conn, user.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(reloaded.deposit, 50);
    }
}
