//! # Seed Data Generator
//!
//! Populates the database with a demo shop for development.
//!
//! ## Usage
//! ```bash
//! # Seed the demo shop with 90 days of receipts (default)
//! cargo run -p shopdesk-db --bin seed
//!
//! # Custom history length and shop
//! cargo run -p shopdesk-db --bin seed -- --days 400 --shop corner-store
//!
//! # Specify database path
//! cargo run -p shopdesk-db --bin seed -- --db ./data/shopdesk.db
//! ```
//!
//! ## Generated Data
//! - Shop profile with phone numbers and cashier/manager pick lists
//! - Stock across a few categories; some items have no cost price so the
//!   sales report exercises its assumed-margin fallback
//! - Employees, plus today's attendance marks
//! - Receipts spread over the last `--days` days, with stock decremented

use chrono::{Duration, Utc};
use std::env;
use uuid::Uuid;

use shopdesk_core::{
    transaction_id, AttendanceStatus, PaymentMethod, Receipt, ReceiptItem, ShopProfile,
    StockItemInput, DEFAULT_SHOP_ID,
};
use shopdesk_db::repository::attendance::AttendanceMark;
use shopdesk_db::repository::employee::NewEmployee;
use shopdesk_db::{Database, DbConfig};

/// (category, name, price cents, cost cents, opening quantity)
const STOCK: &[(&str, &str, i64, Option<i64>, i64)] = &[
    ("Drinks", "Green Tea", 1500, Some(1000), 400),
    ("Drinks", "Cola 330ml", 120, Some(80), 900),
    ("Drinks", "Mineral Water", 90, None, 1200),
    ("Snacks", "Salted Chips", 250, Some(150), 600),
    ("Snacks", "Chocolate Bar", 180, None, 500),
    ("Bakery", "Sourdough Loaf", 450, Some(200), 150),
    ("Household", "Dish Soap", 399, Some(250), 200),
];

/// (name, position, contact, salary cents)
const EMPLOYEES: &[(&str, &str, &str, i64)] = &[
    ("Asha Patel", "Cashier", "555-0101", 210_000),
    ("Ravi Kumar", "Manager", "555-0102", 340_000),
    ("Lena Ortiz", "Stock Clerk", "555-0103", 190_000),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut days: i64 = 90;
    let mut shop_id = String::from(DEFAULT_SHOP_ID);
    let mut db_path = String::from("./shopdesk_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--days" | "-n" => {
                if i + 1 < args.len() {
                    days = args[i + 1].parse().unwrap_or(90);
                    i += 1;
                }
            }
            "--shop" | "-s" => {
                if i + 1 < args.len() {
                    shop_id = args[i + 1].clone();
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
                println!("Shopdesk Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -n, --days <N>     Days of receipt history (default: 90)");
                println!("  -s, --shop <ID>    Shop identifier (default: {})", DEFAULT_SHOP_ID);
                println!("  -d, --db <PATH>    Database file path (default: ./shopdesk_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Shopdesk Seed Data Generator");
    println!("===============================");
    println!("Database: {}", db_path);
    println!("Shop:     {}", shop_id);
    println!("Days:     {}", days);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.receipts().count_by_shop(&shop_id).await?;
    if existing > 0 {
        println!("⚠ Shop already has {} receipts", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    // Shop profile
    let profile = db
        .shops()
        .upsert_profile(&ShopProfile {
            shop_id: shop_id.clone(),
            shop_name: "Demo Corner Store".to_string(),
            address: "12 Market Road".to_string(),
            phone_numbers: vec!["555-0100".to_string(), "555-0199".to_string()],
            cashier_names: vec!["Asha Patel".to_string(), "Lena Ortiz".to_string()],
            manager_names: vec!["Ravi Kumar".to_string()],
            updated_at: Utc::now(),
        })
        .await?;
    println!("✓ Shop profile saved");

    // Stock
    for (idx, (category, name, price_cents, cost_cents, quantity)) in STOCK.iter().enumerate() {
        let input = StockItemInput {
            name: name.to_string(),
            description: None,
            price_cents: *price_cents,
            cost_price_cents: *cost_cents,
            quantity: *quantity,
            category: Some(category.to_string()),
            sku: Some(format!("{}-{:03}", &category[..3].to_uppercase(), idx + 1)),
            supplier: None,
        };
        db.stock().insert(&shop_id, &input).await?;
    }
    println!("✓ Added {} stock items", STOCK.len());

    // Employees and today's attendance
    let today = Utc::now().date_naive();
    for (idx, (name, position, contact, salary_cents)) in EMPLOYEES.iter().enumerate() {
        let employee = db
            .employees()
            .insert(
                &shop_id,
                &NewEmployee {
                    name: name.to_string(),
                    position: position.to_string(),
                    contact: contact.to_string(),
                    email: None,
                    address: None,
                    salary_cents: *salary_cents,
                    joining_date: today - Duration::days(365),
                },
            )
            .await?;

        let status = if idx == 2 {
            AttendanceStatus::HalfDay
        } else {
            AttendanceStatus::Present
        };
        db.attendance()
            .upsert(&shop_id, &AttendanceMark::new(employee.id, today, status))
            .await?;
    }
    println!("✓ Added {} employees", EMPLOYEES.len());

    // Receipts
    println!();
    println!("Generating receipts...");

    let start = std::time::Instant::now();
    let now = Utc::now();
    let mut generated = 0usize;

    for day in 0..days.max(0) {
        let per_day = 1 + (day % 4) as usize;
        for n in 0..per_day {
            let seed = day as usize * 7 + n;
            let timestamp = now - Duration::days(day) - Duration::minutes((n as i64) * 47);

            let items: Vec<ReceiptItem> = (0..1 + seed % 3)
                .map(|k| {
                    let (_, name, price_cents, cost_cents, _) = STOCK[(seed + k * 3) % STOCK.len()];
                    ReceiptItem {
                        name: name.to_string(),
                        price_cents,
                        quantity: 1 + ((seed + k) % 4) as i64,
                        cost_price_cents: cost_cents,
                    }
                })
                .collect();

            let receipt = Receipt {
                id: Uuid::new_v4().to_string(),
                shop_id: shop_id.clone(),
                shop_details: profile.receipt_details(),
                cashier_name: profile.cashier_names[seed % profile.cashier_names.len()].clone(),
                manager_name: profile.manager_names.first().cloned(),
                total_amount_cents: items.iter().map(|i| i.line_total().cents()).sum(),
                payment_method: PaymentMethod::ALL[seed % PaymentMethod::ALL.len()],
                transaction_id: transaction_id(timestamp.naive_utc(), Uuid::new_v4()),
                items,
                timestamp,
            };

            if let Err(e) = db.receipts().insert(&receipt).await {
                eprintln!("Failed to insert {}: {}", receipt.transaction_id, e);
                continue;
            }
            db.stock().decrement_for_sale(&shop_id, &receipt.items).await?;
            generated += 1;
        }

        if day > 0 && day % 30 == 0 {
            println!("  {} days done ({} receipts)...", day, generated);
        }
    }

    let elapsed = start.elapsed();
    println!();
    println!("✓ Generated {} receipts in {:?}", generated, elapsed);

    // Verify
    println!();
    println!("Verifying...");
    println!("  Receipts: {}", db.receipts().count_by_shop(&shop_id).await?);
    println!("  Employees: {}", db.employees().count_by_shop(&shop_id).await?);
    println!("  Categories: {:?}", db.stock().categories(&shop_id).await?);

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
