//! # Seed Data Generator
//!
//! Populates the relational store with users, products and stock for
//! development.
//!
//! ## Usage
//! ```bash
//! # Default: 3 users, every catalog product in one size
//! cargo run -p store-api --bin seed
//!
//! # Custom amount and path
//! cargo run -p store-api --bin seed -- --count 200 --db ./data/store.db
//! ```
//!
//! Every seeded user has the password `store-dev-123`.

use std::env;

use anyhow::Context;
use store_api::password::hash_password;
use store_db::{Database, DbConfig, NewProduct, NewUser};

const SEED_PASSWORD: &str = "store-dev-123";

const USERS: &[(&str, &str)] = &[
    ("Store Admin", "admin@store.dev"),
    ("Sam Seller", "seller@store.dev"),
    ("Cleo Client", "client@store.dev"),
];

/// Catalog groups with their base price in cents.
const CATALOG: &[(&str, i64, &[&str])] = &[
    ("Coffee", 1800, &["Espresso Beans", "Ground Arabica", "Decaf Blend", "Cold Brew Pack"]),
    ("Tea", 900, &["Green Tea", "Black Tea", "Chamomile", "Earl Grey", "Mint Tea"]),
    ("Bakery", 450, &["Croissant", "Baguette", "Cheese Bread", "Cinnamon Roll"]),
    ("Snacks", 600, &["Granola Bar", "Trail Mix", "Brownie", "Oat Cookies"]),
];

const SIZES: &[(&str, i64)] = &[("Small", 0), ("Medium", 250), ("Large", 500)];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 17;
    let mut db_path = String::from("./data/store.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().context("--count expects a number")?;
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Store Manager Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of products to generate (default: 17)");
                println!("  -d, --db <PATH>    Relational store path (default: ./data/store.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Store Manager Seed Data Generator");
    println!("=================================");
    println!("Database: {}", db_path);
    println!("Products: {}", count);
    println!();

    if let Some(parent) = std::path::Path::new(&db_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let db = Database::new(DbConfig::new(&db_path))
        .await
        .context("opening relational store")?;
    println!("✓ Connected, migrations applied");

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        return Ok(());
    }

    let password_hash = hash_password(SEED_PASSWORD)?;
    let mut owner_id = None;
    for (name, email) in USERS {
        let user = match db.users().get_by_email(email).await? {
            Some(user) => user,
            None => {
                db.users()
                    .insert(&NewUser {
                        name: name.to_string(),
                        email: email.to_string(),
                        password_hash: password_hash.clone(),
                    })
                    .await?
            }
        };
        owner_id.get_or_insert(user.id);
        println!("  user #{} {}", user.id, user.email);
    }
    let owner_id = owner_id.context("no seed users")?;

    let start = std::time::Instant::now();
    let mut generated = 0;

    'outer: for (size_idx, (size, addon)) in SIZES.iter().enumerate() {
        for (group_idx, (group, base_price, names)) in CATALOG.iter().enumerate() {
            for (name_idx, name) in names.iter().enumerate() {
                if generated >= count {
                    break 'outer;
                }
                let seed = size_idx * 100 + group_idx * 10 + name_idx;
                let product_name = if size_idx == 0 {
                    name.to_string()
                } else {
                    format!("{name} {size}")
                };

                let product = NewProduct {
                    name: product_name,
                    description: format!("{group}: {name} ({size})"),
                    price_cents: base_price + addon + ((seed * 37) % 300) as i64,
                    user_id: owner_id,
                };
                // 0 to 60 units, so some products start out of stock
                let quantity = ((seed * 13) % 61) as i64;

                if let Err(e) = db.products().insert_with_inventory(&product, quantity).await {
                    eprintln!("Failed to insert {}: {}", product.name, e);
                    continue;
                }
                generated += 1;
            }
        }
    }

    println!();
    println!("✓ Generated {} products in {:?}", generated, start.elapsed());
    println!("✓ Seed complete! Password for all users: {}", SEED_PASSWORD);

    db.close().await;
    Ok(())
}
