//! # Seed Data Generator
//!
//! Populates the database with demo accounts and products for development.
//!
//! ## Usage
//! ```bash
//! # Seed ./vending_dev.db
//! cargo run -p vending-db --bin seed
//!
//! # Specify database path and the password every demo account gets
//! cargo run -p vending-db --bin seed -- --db ./data/vending.db --password hunter22
//! ```
//!
//! ## Generated Data
//! - One admin (`admin`)
//! - Two sellers (`sam`, `sue`), each listing a handful of products
//! - Two buyers (`bob`, `bea`) with an opening deposit
//!
//! All costs are multiples of 5 so every product is payable in coins.

use std::env;
use vending_core::password::hash_password;
use vending_core::{NewUser, ProductDetails, Role};
use vending_db::{Database, DbConfig, ProductRepository, UserRepository};

/// (username, role, opening deposit)
const ACCOUNTS: &[(&str, Role, i64)] = &[
    ("admin", Role::Admin, 0),
    ("sam", Role::Seller, 0),
    ("sue", Role::Seller, 0),
    ("bob", Role::Buyer, 150),
    ("bea", Role::Buyer, 60),
];

/// (seller, product name, cost, stock)
const PRODUCTS: &[(&str, &str, i64, i64)] = &[
    ("sam", "Cola", 55, 10),
    ("sam", "Fanta", 50, 8),
    ("sam", "Water", 20, 25),
    ("sam", "Chips", 35, 0),
    ("sue", "Cola", 60, 4),
    ("sue", "Snickers", 45, 12),
    ("sue", "Coffee", 100, 3),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./vending_dev.db");
    let mut password = String::from("password");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--password" | "-p" => {
                if i + 1 < args.len() {
                    password = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Vending Service Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>          Database file path (default: ./vending_dev.db)");
                println!("  -p, --password <PASS>    Password for every demo account (default: password)");
                println!("  -h, --help               Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Vending Service Seed Data Generator");
    println!("======================================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    let mut conn = db.acquire().await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = UserRepository::count(&mut conn).await?;
    if existing > 0 {
        println!("⚠ Database already has {} users", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Creating accounts...");

    for (username, role, deposit) in ACCOUNTS {
        let user = NewUser {
            username: username.to_string(),
            password_hash: hash_password(&password)?,
            deposit: *deposit,
            role: *role,
        };
        let stored = UserRepository::insert(&mut conn, &user).await?;
        println!("  {:<6} {:<7} deposit {}", stored.username, stored.role.as_str(), stored.deposit);
    }

    println!();
    println!("Listing products...");

    let mut listed = 0;
    for (seller, name, cost, stock) in PRODUCTS {
        let Some(owner) = UserRepository::find_by_username(&mut conn, seller).await? else {
            eprintln!("Seller {} missing, skipping {}", seller, name);
            continue;
        };

        let details = ProductDetails {
            product_name: name.to_string(),
            cost: *cost,
            amount_available: *stock,
        };

        if let Err(e) = ProductRepository::insert(&mut conn, owner.id, &details).await {
            eprintln!("Failed to insert {}: {}", name, e);
            continue;
        }

        listed += 1;
    }

    println!("✓ Listed {} products", listed);
    println!();
    println!("✓ Seed complete!");

    Ok(())
}
