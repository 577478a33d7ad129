//! # Seed Data Generator
//!
//! Populates the local store with demo products for development.
//!
//! ## Usage
//! ```bash
//! # Generate 50 products (default)
//! cargo run -p stockpile-db --bin seed
//!
//! # Generate custom amount
//! cargo run -p stockpile-db --bin seed -- --count 200
//!
//! # Specify database path
//! cargo run -p stockpile-db --bin seed -- --db ./data/stockpile.db
//! ```

use std::env;
use std::time::Instant;

use stockpile_core::Product;
use stockpile_db::{Database, DbConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_COUNT: usize = 50;
const DEFAULT_DB_PATH: &str = "./stockpile.db";

/// Office supplies used to build product names.
const ITEMS: &[&str] = &[
    "Pen", "Pencil", "Ink", "Eraser", "Stapler", "Staples", "Tape", "Scissors", "Ruler",
    "Notebook", "Folder", "Binder", "Marker", "Highlighter", "Glue", "Clip",
];

const VARIANTS: &[&str] = &["Black", "Blue", "Red", "Green", "Large", "Small"];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn")),
        )
        .init();

    let (count, db_path) = parse_args()?;

    info!(count, db = %db_path, "Seeding local store");

    let db = Database::new(DbConfig::new(&db_path)).await?;
    let products = db.products();

    let start = Instant::now();
    let batch: Vec<Product> = (0..count).map(generate_product).collect();
    products.upsert_many(&batch).await?;

    println!(
        "✓ Generated {} products in {:?} ({} total in store)",
        batch.len(),
        start.elapsed(),
        products.count().await?
    );

    db.close().await;
    Ok(())
}

/// Parses `--count <n>` and `--db <path>`.
fn parse_args() -> Result<(usize, String), Box<dyn std::error::Error>> {
    let mut count = DEFAULT_COUNT;
    let mut db_path = DEFAULT_DB_PATH.to_string();

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--count" => {
                count = args.next().ok_or("--count requires a value")?.parse()?;
            }
            "--db" => {
                db_path = args.next().ok_or("--db requires a value")?;
            }
            other => return Err(format!("Unknown argument: {other}").into()),
        }
    }

    Ok((count, db_path))
}

/// Builds one demo product. Ids are left for the store to assign.
fn generate_product(seed: usize) -> Product {
    let item = ITEMS[seed % ITEMS.len()];
    let variant = VARIANTS[(seed / ITEMS.len()) % VARIANTS.len()];

    // $0.49 - $9.99
    let price_cents = 49 + ((seed * 37) % 951) as i64;
    let quantity = (seed % 101) as i64;

    Product::new(format!("{item} {variant}"), price_cents, quantity)
}
