//! # Service Commands
//!
//! One async function per endpoint of the vending API.
//!
//! ## Endpoint Map
//! ```text
//! ┌────────────────────────────────┬────────────────────────────┬─────────────┐
//! │ Endpoint                       │ Command                    │ Gate        │
//! ├────────────────────────────────┼────────────────────────────┼─────────────┤
//! │ POST   /user                   │ user::register_user        │ public      │
//! │ GET    /user/{username}        │ user::read_user            │ any user    │
//! │ PUT    /user/{username}        │ user::update_user          │ self        │
//! │ DELETE /user/{username}        │ user::remove_user          │ admin       │
//! │ PUT    /deposit                │ user::deposit              │ buyer       │
//! │ PUT    /reset?username=        │ user::reset_deposit        │ buyer, self │
//! │ POST   /product                │ product::create_product    │ seller      │
//! │ GET    /product/{name}         │ product::find_products     │ public      │
//! │ PUT    /product/{name}         │ product::update_product    │ owner       │
//! │ DELETE /product/{name}         │ product::delete_product    │ owner       │
//! │ GET    /buy?productId=&amount= │ purchase::buy              │ buyer       │
//! │ GET    /purchases              │ purchase::purchase_history │ buyer       │
//! └────────────────────────────────┴────────────────────────────┴─────────────┘
//! ```

pub mod product;
pub mod purchase;
pub mod user;

#[cfg(test)]
pub(crate) mod test_support {
    use vending_core::{Credentials, Role};

    use super::user::{register_user, NewUserRequest, UserResponse};
    use crate::service::VendingService;

    pub const PASSWORD: &str = "password";

    pub async fn service() -> VendingService {
        VendingService::in_memory().await.unwrap()
    }

    pub fn creds(username: &str) -> Credentials {
        Credentials::new(username, PASSWORD)
    }

    pub async fn register(
        svc: &VendingService,
        username: &str,
        role: Role,
        deposit: i64,
    ) -> UserResponse {
        register_user(
            svc,
            NewUserRequest {
                username: username.to_string(),
                password: PASSWORD.to_string(),
                deposit,
                role,
            },
        )
        .await
        .unwrap()
    }
}
