//! # vendingctl
//!
//! Drives the vending service from the command line.
//!
//! ## Usage
//! ```bash
//! vendingctl register bob s3cret buyer
//! vendingctl -u bob -p s3cret deposit 50
//! vendingctl -u sam -p s3cret add-product Cola 55 10
//! vendingctl find Cola
//! vendingctl -u bob -p s3cret buy 1 2
//! ```
//!
//! Results are printed as JSON on stdout. Failures print the API error as
//! JSON on stderr and exit with status 1.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::debug;
use vending_core::{Credentials, Role};
use vending_service::commands::product::{self, ProductRequest};
use vending_service::commands::purchase::{self, BuyRequest};
use vending_service::commands::user::{self, DepositRequest, NewUserRequest, UpdateUserRequest};
use vending_service::telemetry::init_tracing;
use vending_service::{ApiError, ApiResult, ServiceConfig, VendingService};

/// Vending machine account service, from the command line
#[derive(Parser, Debug)]
#[command(name = "vendingctl")]
#[command(about = "Register users, manage products and buy from the vending service")]
struct Cli {
    /// Database file (default: $VENDING_DB_PATH or ./vending.db)
    #[arg(short, long, global = true)]
    db: Option<PathBuf>,

    /// Username for authenticated commands
    #[arg(short, long, global = true, default_value = "")]
    user: String,

    /// Password for authenticated commands
    #[arg(short, long, global = true, default_value = "")]
    password: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Command {
    /// Register a new account
    Register {
        username: String,
        password: String,
        role: Role,
        /// Opening deposit, a multiple of 5
        #[arg(default_value_t = 0)]
        deposit: i64,
    },
    /// Show an account
    Show { username: String },
    /// Change your own password and role
    Update {
        username: String,
        new_password: String,
        role: Role,
    },
    /// Remove an account (admin)
    Remove { username: String },
    /// Insert one coin (buyer)
    Deposit { coin: i64 },
    /// Empty your own deposit (buyer)
    Reset { username: String },
    /// List a new product (seller)
    AddProduct { name: String, cost: i64, amount: i64 },
    /// Look up products by name
    Find { name: String },
    /// Replace one of your products (seller)
    UpdateProduct {
        name: String,
        new_name: String,
        cost: i64,
        amount: i64,
    },
    /// Remove one of your products (seller)
    DeleteProduct { name: String },
    /// Buy `amount` units of a product (buyer)
    Buy { product_id: i64, amount: i64 },
    /// Your purchases, most recent first (buyer)
    History { limit: Option<u32> },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut config = match ServiceConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    if let Some(path) = cli.db {
        config.database_path = path;
    }

    init_tracing(config.log_filter.as_deref());

    let svc = match VendingService::open(&config).await {
        Ok(svc) => svc,
        Err(e) => {
            eprintln!("Could not open database: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let creds = Credentials::new(cli.user, cli.password);
    let outcome = run(&svc, &creds, cli.command).await;
    svc.shutdown().await;

    match outcome {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(err) => {
            debug!(status = err.status(), "Command failed");
            eprintln!("{}", to_json(&ErrorOutput::from(&err)));
            ExitCode::FAILURE
        }
    }
}

/// Error as printed: the API error plus the status a transport would send.
#[derive(Serialize)]
struct ErrorOutput<'a> {
    status: u16,
    #[serde(flatten)]
    error: &'a ApiError,
}

impl<'a> From<&'a ApiError> for ErrorOutput<'a> {
    fn from(error: &'a ApiError) -> Self {
        ErrorOutput {
            status: error.status(),
            error,
        }
    }
}

async fn run(svc: &VendingService, creds: &Credentials, command: Command) -> ApiResult<String> {
    let output = match command {
        Command::Register {
            username,
            password,
            role,
            deposit,
        } => to_json(
            &user::register_user(
                svc,
                NewUserRequest {
                    username,
                    password,
                    deposit,
                    role,
                },
            )
            .await?,
        ),
        Command::Show { username } => to_json(&user::read_user(svc, creds, &username).await?),
        Command::Update {
            username,
            new_password,
            role,
        } => to_json(
            &user::update_user(
                svc,
                creds,
                &username,
                UpdateUserRequest {
                    password: new_password,
                    role,
                },
            )
            .await?,
        ),
        Command::Remove { username } => {
            user::remove_user(svc, creds, &username).await?;
            to_json(&serde_json::json!({ "removed": username }))
        }
        Command::Deposit { coin } => to_json(
            &user::deposit(svc, creds, DepositRequest { coin_value: coin }).await?,
        ),
        Command::Reset { username } => to_json(&user::reset_deposit(svc, creds, &username).await?),
        Command::AddProduct { name, cost, amount } => to_json(
            &product::create_product(
                svc,
                creds,
                ProductRequest {
                    product_name: name,
                    cost,
                    amount_available: amount,
                },
            )
            .await?,
        ),
        Command::Find { name } => to_json(&product::find_products(svc, &name).await?),
        Command::UpdateProduct {
            name,
            new_name,
            cost,
            amount,
        } => to_json(
            &product::update_product(
                svc,
                creds,
                &name,
                ProductRequest {
                    product_name: new_name,
                    cost,
                    amount_available: amount,
                },
            )
            .await?,
        ),
        Command::DeleteProduct { name } => {
            to_json(&product::delete_product(svc, creds, &name).await?)
        }
        Command::Buy { product_id, amount } => to_json(
            &purchase::buy(svc, creds, BuyRequest { product_id, amount }).await?,
        ),
        Command::History { limit } => {
            to_json(&purchase::purchase_history(svc, creds, limit).await?)
        }
    };

    Ok(output)
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("{{\"error\":\"{}\"}}", e))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_credentials_and_subcommand() {
        let cli = Cli::try_parse_from(["vendingctl", "-u", "bob", "-p", "s3cret", "buy", "7", "2"])
            .unwrap();

        assert_eq!(cli.user, "bob");
        assert_eq!(cli.password, "s3cret");
        assert_eq!(
            cli.command,
            Command::Buy {
                product_id: 7,
                amount: 2
            }
        );
    }

    #[test]
    fn test_register_parses_role_and_defaults_deposit() {
        let cli = Cli::try_parse_from(["vendingctl", "register", "sam", "s3cret", "Seller"]).unwrap();

        assert_eq!(
            cli.command,
            Command::Register {
                username: "sam".to_string(),
                password: "s3cret".to_string(),
                role: Role::Seller,
                deposit: 0,
            }
        );
        assert!(cli.db.is_none());
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(Cli::try_parse_from(["vendingctl", "register", "sam", "s3cret", "cashier"]).is_err());
        assert!(Cli::try_parse_from(["vendingctl", "deposit", "ten"]).is_err());
        assert!(Cli::try_parse_from(["vendingctl", "teleport"]).is_err());
    }

    #[test]
    fn test_kebab_case_subcommands() {
        let cli = Cli::try_parse_from([
            "vendingctl",
            "update-product",
            "Cola",
            "Cola Zero",
            "60",
            "10",
            "--db",
            "/tmp/v.db",
        ])
        .unwrap();

        assert_eq!(cli.db, Some(PathBuf::from("/tmp/v.db")));
        assert!(matches!(cli.command, Command::UpdateProduct { cost: 60, .. }));
        assert_eq!(
            Cli::try_parse_from(["vendingctl", "history"]).unwrap().command,
            Command::History { limit: None }
        );
    }
}
