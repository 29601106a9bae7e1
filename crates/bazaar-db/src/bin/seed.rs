//! # Seed Data Generator
//!
//! Populates a database with demo addresses and products, then settles one
//! demo order so the history endpoints have something to show.
//!
//! ## Usage
//! ```bash
//! # 50 products in ./bazaar_dev.db (defaults)
//! cargo run -p bazaar-db --bin seed
//!
//! # Custom path and amount
//! cargo run -p bazaar-db --bin seed -- --db ./data/bazaar.db --products 500
//!
//! # More logging
//! RUST_LOG=bazaar_db=debug cargo run -p bazaar-db --bin seed
//! ```
//!
//! Each product gets a slug `{category}-{name}-{index}`, a consumer price of
//! Rp 5.000 to Rp 150.000 (stored in cents), a reseller price at 80% of that,
//! and stock between 0 and 40.

use std::env;
use std::time::Instant;

use bazaar_core::{CartLine, NewAddress, NewProduct, Product, SettlementRequest};
use bazaar_db::{Database, DbConfig};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const DEMO_BUYER: i64 = 1;
const OTHER_USER: i64 = 2;

/// (category id, slug prefix, product names)
const CATEGORIES: &[(i64, &str, &[&str])] = &[
    (
        1,
        "kain",
        &[
            "Batik Tulis",
            "Batik Cap",
            "Tenun Ikat",
            "Songket",
            "Ulos",
            "Lurik",
        ],
    ),
    (
        2,
        "kopi",
        &[
            "Kopi Gayo",
            "Kopi Toraja",
            "Kopi Kintamani",
            "Kopi Flores",
            "Kopi Luwak",
        ],
    ),
    (
        3,
        "kriya",
        &[
            "Anyaman Rotan",
            "Gerabah Kasongan",
            "Ukiran Jepara",
            "Wayang Kulit",
            "Noken",
        ],
    ),
    (
        4,
        "camilan",
        &["Keripik Tempe", "Rengginang", "Dodol Garut", "Bakpia", "Kerupuk Udang"],
    ),
];

const STORES: i64 = 3;

struct Args {
    db_path: String,
    products: usize,
}

fn parse_args() -> Option<Args> {
    let args: Vec<String> = env::args().collect();
    let mut parsed = Args {
        db_path: String::from("./bazaar_dev.db"),
        products: 50,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--products" | "-n" => {
                if let Some(value) = args.get(i + 1) {
                    parsed.products = value.parse().unwrap_or(parsed.products);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if let Some(value) = args.get(i + 1) {
                    parsed.db_path = value.clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Bazaar Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -n, --products <N>  Number of products to generate (default: 50)");
                println!("  -d, --db <PATH>     Database file path (default: ./bazaar_dev.db)");
                println!("  -h, --help          Show this help message");
                return None;
            }
            other => warn!(argument = %other, "Ignoring unknown argument"),
        }
        i += 1;
    }

    Some(parsed)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let Some(args) = parse_args() else {
        return Ok(());
    };

    info!(db = %args.db_path, products = args.products, "Seeding database");

    let db = Database::new(DbConfig::new(&args.db_path)).await?;

    let existing = db.products().count().await?;
    if existing > 0 {
        warn!(
            existing,
            "Database already has products, skipping seed (delete the file to regenerate)"
        );
        return Ok(());
    }

    let home = db.addresses().insert(&demo_address(DEMO_BUYER, "Home")).await?;
    db.addresses().insert(&demo_address(DEMO_BUYER, "Office")).await?;
    db.addresses()
        .insert(&demo_address(OTHER_USER, "Warehouse"))
        .await?;
    info!("Created demo addresses");

    let start = Instant::now();
    let mut inserted: Vec<Product> = Vec::with_capacity(args.products);

    for seed in 0..args.products {
        let product = generate_product(seed);
        if let Err(err) = product.validate() {
            warn!(slug = %product.slug, error = %err, "Skipping invalid product");
            continue;
        }
        match db.products().insert(&product).await {
            Ok(p) => inserted.push(p),
            Err(err) => warn!(slug = %product.slug, error = %err, "Failed to insert product"),
        }
    }

    info!(
        generated = inserted.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Generated products"
    );

    // Demo settlement: up to three products that have stock
    let lines: Vec<CartLine> = inserted
        .iter()
        .filter(|p| p.stock >= 2)
        .take(3)
        .map(|p| CartLine::new(p.id, 2))
        .collect();

    if lines.is_empty() {
        warn!("No product has enough stock for the demo order");
        return Ok(());
    }

    let receipt = db
        .settlement()
        .settle(SettlementRequest {
            buyer_id: DEMO_BUYER,
            shipping_address_id: home.id,
            payment_method: "COD".to_string(),
            lines,
        })
        .await?;

    info!(receipt = %serde_json::to_string(&receipt)?, "Demo order settled");

    let history = db.settlement().list_orders_for_user(DEMO_BUYER).await?;
    info!(orders = history.len(), "Seed complete");

    db.close().await;
    Ok(())
}

fn demo_address(user_id: i64, label: &str) -> NewAddress {
    NewAddress {
        user_id,
        label: label.to_string(),
        recipient_name: format!("Demo User {user_id}"),
        phone: format!("08120000000{user_id}"),
        detail: format!("Jl. Braga No. {user_id}, Bandung"),
    }
}

/// Deterministic demo product for index `seed`.
fn generate_product(seed: usize) -> NewProduct {
    let (category_id, prefix, names) = CATEGORIES[seed % CATEGORIES.len()];
    let name = names[(seed / CATEGORIES.len()) % names.len()];

    let slug = format!(
        "{}-{}-{}",
        prefix,
        name.to_lowercase().replace(' ', "-"),
        seed
    );

    // Rp 5.000 - Rp 150.000, in cents
    let consumer_price_cents = (5_000 + ((seed * 7_919) % 145_001) as i64) * 100;
    let reseller_price_cents = consumer_price_cents * 80 / 100;

    NewProduct {
        store_id: (seed as i64 % STORES) + 1,
        category_id,
        name: name.to_string(),
        slug,
        reseller_price_cents,
        consumer_price_cents,
        stock: (seed % 41) as i64,
        description: format!("{name} pilihan dari toko {}", (seed as i64 % STORES) + 1),
    }
}
