//! # Catalog Seeder
//!
//! Writes the default bakery catalog into a fresh database.
//!
//! ## Usage
//! ```bash
//! # Seed ./hearth_dev.db (default)
//! cargo run -p hearth-db --bin seed
//!
//! # Specify database path
//! cargo run -p hearth-db --bin seed -- --db ./data/hearth.db
//!
//! # Overwrite an existing catalog with the defaults
//! cargo run -p hearth-db --bin seed -- --force
//! ```
//!
//! The seed list is the one `hearth_core::default_catalog` returns: breads,
//! then beverages, each with cost and price in cents.

use std::env;

use hearth_core::{default_catalog, Money};
use hearth_db::{Database, DbConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./hearth_dev.db");
    let mut force = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--force" | "-f" => force = true,
            "--help" | "-h" => {
                println!("Hearth Catalog Seeder");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./hearth_dev.db)");
                println!("  -f, --force        Replace an existing catalog");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Hearth Catalog Seeder");
    println!("=====================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    if db.catalog().is_initialized().await? && !force {
        let existing = db.catalog().count().await?;
        println!("⚠ Database already has a catalog ({} items)", existing);
        println!("  Skipping seed. Pass --force to replace it.");
        return Ok(());
    }

    let items = default_catalog();
    db.catalog().save(&items).await?;

    println!();
    for item in &items {
        println!(
            "  {:<4} {:<28} {:<9} cost {:>8}  price {:>8}",
            item.id,
            item.name,
            item.category,
            Money::from_cents(item.cost_cents),
            Money::from_cents(item.price_cents),
        );
    }

    println!();
    println!("✓ Seeded {} catalog items", items.len());

    db.close().await;
    Ok(())
}
