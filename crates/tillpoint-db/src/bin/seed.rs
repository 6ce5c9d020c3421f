//! # Seed Data Generator
//!
//! Fills the catalog with sample products for development.
//!
//! ## Usage
//! ```bash
//! # 200 products into $TILLPOINT_DB_PATH (or ./tillpoint.db)
//! cargo run -p tillpoint-db --bin seed
//!
//! cargo run -p tillpoint-db --bin seed -- --count 1000 --db ./data/dev.db
//!
//! RUST_LOG=debug cargo run -p tillpoint-db --bin seed
//! ```
//!
//! Each product gets a barcode `899{category}{index}`, a price between
//! 10.00 and 320.00, and a stock level that puts one product in ten at
//! or under its reorder threshold.

use std::env;
use std::process::ExitCode;

use tillpoint_core::Money;
use tillpoint_db::{Database, DbConfig, DbError, NewProduct};
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_COUNT: usize = 200;

/// Sample catalog: (category, base names).
const CATEGORIES: &[(&str, &[&str])] = &[
    (
        "Beverages",
        &[
            "Teh Botol",
            "Aqua",
            "Pocari Sweat",
            "Kopi Kapal Api",
            "Susu UHT",
            "Sprite",
            "Coca-Cola",
            "Fanta",
        ],
    ),
    (
        "Snacks",
        &[
            "Chitato",
            "Qtela",
            "Taro",
            "Oreo",
            "Beng-Beng",
            "SilverQueen",
            "Roma Kelapa",
            "Tango Wafer",
        ],
    ),
    (
        "Groceries",
        &[
            "Beras",
            "Gula Pasir",
            "Minyak Goreng",
            "Tepung Terigu",
            "Kecap Manis",
            "Indomie Goreng",
            "Telur",
            "Garam",
        ],
    ),
    (
        "Toiletries",
        &[
            "Sabun Lifebuoy",
            "Pepsodent",
            "Sunsilk",
            "Rinso",
            "Sunlight",
            "Tissue Paseo",
            "Shampo Clear",
            "Deterjen Daia",
        ],
    ),
];

/// Pack sizes with a price multiplier in percent.
const SIZES: &[(&str, i64)] = &[("Small", 100), ("Medium", 180), ("Large", 320)];

struct Args {
    count: usize,
    db_path: Option<String>,
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tillpoint=debug,sqlx=warn")),
        )
        .init();
}

/// `None` means help was printed.
fn parse_args() -> Result<Option<Args>, String> {
    let mut args = Args {
        count: DEFAULT_COUNT,
        db_path: None,
    };

    let mut iter = env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--count" | "-c" => {
                let raw = iter.next().ok_or("--count needs a value")?;
                args.count = raw
                    .parse()
                    .map_err(|_| format!("--count expects a number, got '{}'", raw))?;
            }
            "--db" | "-d" => {
                args.db_path = Some(iter.next().ok_or("--db needs a path")?);
            }
            "--help" | "-h" => {
                println!("Tillpoint seed data generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of products (default: {})", DEFAULT_COUNT);
                println!("  -d, --db <PATH>    Database file (default: $TILLPOINT_DB_PATH or tillpoint.db)");
                println!("  -h, --help         Show this help message");
                return Ok(None);
            }
            other => return Err(format!("unknown argument '{}'", other)),
        }
    }

    Ok(Some(args))
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let args = match parse_args() {
        Ok(Some(args)) => args,
        Ok(None) => return ExitCode::SUCCESS,
        Err(msg) => {
            error!("{}", msg);
            return ExitCode::FAILURE;
        }
    };

    match seed(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Seed failed");
            ExitCode::FAILURE
        }
    }
}

async fn seed(args: Args) -> Result<(), DbError> {
    let mut config = DbConfig::from_env()?;
    if let Some(path) = args.db_path {
        config.database_path = path.into();
    }

    let db = Database::new(config.clone()).await?;

    let existing = db.products().count().await?;
    if existing > 0 {
        warn!(
            existing = existing,
            path = %config.database_path.display(),
            "Catalog already has products, skipping seed"
        );
        return Ok(());
    }

    info!(count = args.count, "Generating products");
    let start = std::time::Instant::now();

    let mut generated = 0;
    for new in sample_products().take(args.count) {
        let name = new.name.clone();
        match db.products().insert(new).await {
            Ok(product) => {
                debug!(id = %product.id, name = %product.name, "Inserted product");
                generated += 1;
            }
            Err(e) => warn!(name = %name, error = %e, "Skipping product"),
        }
    }

    let low_stock = db.products().list_low_stock().await?.len();
    let categories = db.products().categories().await?;

    info!(
        generated = generated,
        low_stock = low_stock,
        categories = categories.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Seed complete"
    );

    db.close().await;
    Ok(())
}

/// Endless, deterministic stream of sample products.
///
/// After the base catalog is exhausted, names get a batch suffix so
/// barcodes stay unique.
fn sample_products() -> impl Iterator<Item = NewProduct> {
    (0usize..).map(|seed| {
        let per_batch: usize = CATEGORIES.iter().map(|(_, names)| names.len()).sum::<usize>()
            * SIZES.len();
        let batch = seed / per_batch;
        let mut slot = seed % per_batch;

        let size_idx = slot % SIZES.len();
        slot /= SIZES.len();

        let mut category_idx = 0;
        while slot >= CATEGORIES[category_idx].1.len() {
            slot -= CATEGORIES[category_idx].1.len();
            category_idx += 1;
        }

        let (category, names) = CATEGORIES[category_idx];
        let (size, multiplier) = SIZES[size_idx];

        let base_price = 1_000 + ((seed * 37) % 900) as i64 * 10;
        let price = Money::from_cents(base_price * multiplier / 100);

        let name = if batch == 0 {
            format!("{} {}", names[slot], size)
        } else {
            format!("{} {} #{}", names[slot], size, batch + 1)
        };

        // every tenth product starts at or under its threshold
        let min_stock = 5;
        let stock = if seed % 10 == 0 { (seed / 10 % 6) as i64 } else { 10 + (seed % 90) as i64 };

        NewProduct::new(name, price)
            .barcode(format!("899{}{:09}", category_idx, seed))
            .category(category)
            .stock(stock)
            .min_stock(min_stock)
    })
}
