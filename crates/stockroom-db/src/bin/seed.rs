//! # Seed Data Generator
//!
//! Populates a database with a demo catalog for development.
//!
//! ## Usage
//! ```bash
//! # Generate 60 products (default) plus suppliers and an admin account
//! cargo run -p stockroom-db --bin seed
//!
//! # Generate a custom amount
//! cargo run -p stockroom-db --bin seed -- --count 200
//!
//! # Specify database path and admin password
//! cargo run -p stockroom-db --bin seed -- --db ./data/stockroom.db --admin-password s3cret-pass
//! ```
//!
//! ## Generated Data
//! - Products across Beverages, Snacks, Dairy and Grocery, each with a
//!   unique barcode `200{seed:010}`, a price between $0.99 and $8.98 and an
//!   opening stock between 0 and 40 (some start under the low-stock threshold)
//! - A few suppliers
//! - An `admin` account
//! - Some sales and deliveries, recorded through the ledger so stock and
//!   history agree

use anyhow::Context;
use std::env;
use tracing_subscriber::EnvFilter;

use stockroom_core::validation::validate_new_user;
use stockroom_db::migrations::migration_status;
use stockroom_core::{NewProduct, NewSupplier, StockPolicy};
use stockroom_db::{Database, DbConfig, DbError};

const CATEGORIES: &[(&str, &[&str])] = &[
    (
        "Beverages",
        &[
            "Cola", "Lemon Soda", "Sparkling Water", "Still Water", "Orange Juice",
            "Apple Juice", "Iced Tea", "Energy Drink",
        ],
    ),
    (
        "Snacks",
        &[
            "Salted Crisps", "Paprika Crisps", "Pretzels", "Chocolate Bar",
            "Peanuts", "Oat Cookies", "Gummy Bears",
        ],
    ),
    (
        "Dairy",
        &["Whole Milk", "Skim Milk", "Butter", "Greek Yogurt", "Cheddar", "Eggs"],
    ),
    (
        "Grocery",
        &[
            "White Bread", "Spaghetti", "Basmati Rice", "Canned Tomatoes", "Peanut Butter",
            "Honey", "Flour", "Sugar",
        ],
    ),
];

const SIZES: &[&str] = &["Small", "Regular", "Large"];

const SUPPLIERS: &[(&str, &str, &str)] = &[
    ("Northwind Traders", "orders@northwind.example", "12 Harbour Rd"),
    ("Acme Wholesale", "+1 555 0100", "400 Industrial Way"),
    ("Green Valley Dairy", "dairy@greenvalley.example", "Farm Lane 3"),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let args: Vec<String> = env::args().collect();

    let mut count: usize = 60;
    let mut db_path = String::from("./stockroom.db");
    let mut admin_password = String::from("change-me-now");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1]
                        .parse()
                        .with_context(|| format!("invalid --count value: {}", args[i + 1]))?;
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--admin-password" => {
                if i + 1 < args.len() {
                    admin_password = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Stockroom Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>            Number of products to generate (default: 60)");
                println!("  -d, --db <PATH>            Database file path (default: ./stockroom.db)");
                println!("      --admin-password <PW>  Password for the 'admin' account (default: change-me-now)");
                println!("  -h, --help                 Show this help message");
                return Ok(());
            }
            other => {
                eprintln!("Ignoring unknown argument: {other}");
            }
        }
        i += 1;
    }

    println!("Stockroom Seed Data Generator");
    println!("=============================");
    println!("Database: {}", db_path);
    println!("Products: {}", count);
    println!();

    let db = Database::new(DbConfig::new(&db_path))
        .await
        .with_context(|| format!("failed to open {db_path}"))?;

    println!("✓ Connected to database");

    let (total, applied) = migration_status(db.pool()).await?;
    println!("✓ Migrations applied ({applied}/{total})");

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    // Products
    println!();
    println!("Generating products...");

    let mut product_ids = Vec::with_capacity(count);
    'outer: for (category, names) in CATEGORIES {
        for name in names.iter() {
            for size in SIZES {
                if product_ids.len() >= count {
                    break 'outer;
                }

                let product = generate_product(category, name, size, product_ids.len());
                match db.products().insert(&product).await {
                    Ok(inserted) => product_ids.push(inserted.id),
                    Err(e) => eprintln!("Failed to insert {}: {}", product.barcode, e),
                }
            }
        }
    }
    println!("✓ Generated {} products", product_ids.len());

    // Suppliers
    for (name, contact, address) in SUPPLIERS {
        db.suppliers()
            .insert(&NewSupplier {
                name: name.to_string(),
                contact: contact.to_string(),
                address: address.to_string(),
            })
            .await?;
    }
    println!("✓ Added {} suppliers", SUPPLIERS.len());

    // Admin account
    let admin = validate_new_user("Administrator", "admin", "admin", &admin_password)
        .context("invalid admin password")?;
    match db.users().insert(&admin).await {
        Ok(_) => println!("✓ Created user 'admin'"),
        Err(DbError::UniqueViolation { .. }) => println!("⚠ User 'admin' already exists"),
        Err(e) => return Err(e.into()),
    }

    // Ledger history
    let ledger = db.ledger();
    let mut sales = 0;
    let mut deliveries = 0;
    for (idx, id) in product_ids.iter().enumerate() {
        if idx % 4 == 0 {
            ledger.record_stock_in(id, 12).await?;
            deliveries += 1;
        }

        let qty = (idx % 5) as i64 + 1;
        match ledger.record_sale(id, qty, StockPolicy::Strict).await {
            Ok(_) => sales += 1,
            // Products seeded with little stock simply skip the demo sale
            Err(DbError::Domain(_)) => {}
            Err(e) => return Err(e.into()),
        }
    }
    println!("✓ Recorded {} sales and {} deliveries", sales, deliveries);

    let stats = db.dashboard_stats().await?;
    println!();
    println!("Dashboard:");
    println!("  Total products:   {}", stats.total_products);
    println!("  Units sold:       {}", stats.total_sold);
    println!("  Low-stock alerts: {}", stats.low_stock_alerts);

    println!();
    println!("✓ Seed complete!");

    db.close().await;
    Ok(())
}

/// Generates a single product with deterministic, realistic data.
fn generate_product(category: &str, name: &str, size: &str, seed: usize) -> NewProduct {
    // Barcode: 13 digits, internal "200" prefix
    let barcode = format!("200{:010}", seed);

    // $0.99 - $8.98
    let price_cents = 99 + ((seed * 37) % 800) as i64;

    // 0 - 40 units
    let stock_quantity = ((seed * 7) % 41) as i64;

    NewProduct {
        name: format!("{} {}", name, size),
        barcode,
        category: category.to_string(),
        price_cents,
        stock_quantity,
    }
}
