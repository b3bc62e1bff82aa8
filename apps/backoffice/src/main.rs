//! # `shopdesk` CLI
//!
//! ```text
//! shopdesk report --granularity month --date 2025-03
//! shopdesk dashboard
//! shopdesk stock --search tea --category Drinks
//! shopdesk receipts --search TXN-2503
//! shopdesk sell --cashier Asha --item "Green Tea=2" --scan TEA-001
//! shopdesk attendance --date 2025-03-14
//! shopdesk settings
//! ```
//!
//! Every command prints JSON on stdout. Failures print the `ApiError` JSON
//! on stderr and exit non-zero.

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;

use shopdesk_backoffice::commands::receipt::{ReceiptQuery, ReceiptSort, SaleLine, SaleRequest};
use shopdesk_backoffice::commands::stock::{StockQuery, StockSort};
use shopdesk_backoffice::commands::{
    analytics, attendance, dashboard, employee, receipt, settings, stock, SortDirection,
};
use shopdesk_backoffice::{init_tracing, ApiError, AppConfig, AppState};
use shopdesk_core::{Granularity, PaymentMethod};

#[derive(Debug, Parser)]
#[command(name = "shopdesk", version, about = "Shop back office: sales reports, stock, receipts and staff")]
struct Cli {
    /// Config file (defaults to $SHOPDESK_CONFIG or the platform config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Shop to act on (overrides the configured shop)
    #[arg(long, global = true)]
    shop: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Sales and profit for a day, month or year
    Report {
        /// day, month or year
        #[arg(long, short = 'g', default_value = "day")]
        granularity: Granularity,

        /// Reference date (YYYY-MM-DD, YYYY-MM or YYYY); defaults to today
        #[arg(long, short = 'd')]
        date: Option<String>,
    },

    /// Receipt and employee counts, recent receipts, today's attendance
    Dashboard,

    /// List stock
    Stock {
        #[arg(long, short = 's')]
        search: Option<String>,

        #[arg(long, short = 'c')]
        category: Option<String>,

        /// name, price, quantity or updated-at
        #[arg(long, default_value = "name")]
        sort: StockSort,

        /// asc or desc
        #[arg(long, default_value = "asc")]
        direction: SortDirection,
    },

    /// List receipts, or show one
    Receipts {
        #[arg(long, short = 's')]
        search: Option<String>,

        /// Only receipts from this day (YYYY-MM-DD)
        #[arg(long, short = 'd')]
        date: Option<String>,

        /// timestamp or total
        #[arg(long, default_value = "timestamp")]
        sort: ReceiptSort,

        /// asc or desc
        #[arg(long, default_value = "desc")]
        direction: SortDirection,

        /// Show a single receipt by id
        #[arg(long, conflicts_with_all = ["search", "date"])]
        id: Option<String>,
    },

    /// Record a sale
    Sell {
        #[arg(long)]
        cashier: String,

        #[arg(long)]
        manager: Option<String>,

        /// Cash, "Credit Card", debit_card, ...
        #[arg(long, default_value = "cash")]
        payment: PaymentMethod,

        /// NAME=QTY or NAME=QTY@PRICE (price in cents); repeatable
        #[arg(long = "item")]
        items: Vec<String>,

        /// Scanned barcode; repeatable
        #[arg(long = "scan")]
        scans: Vec<String>,
    },

    /// List attendance for a day
    Attendance {
        /// YYYY-MM-DD; defaults to today
        #[arg(long, short = 'd')]
        date: Option<String>,

        #[arg(long)]
        employee: Option<String>,
    },

    /// List employees
    Employees,

    /// Show the shop profile
    Settings,
}

/// Parses `NAME=QTY` or `NAME=QTY@PRICE`.
fn parse_sale_line(raw: &str) -> Result<SaleLine> {
    let (name, rest) = raw
        .rsplit_once('=')
        .ok_or_else(|| anyhow!("expected NAME=QTY, got '{}'", raw))?;
    let (quantity, price) = match rest.split_once('@') {
        Some((qty, price)) => (qty, Some(price)),
        None => (rest, None),
    };

    Ok(SaleLine {
        name: name.trim().to_string(),
        quantity: quantity
            .trim()
            .parse()
            .with_context(|| format!("invalid quantity in '{}'", raw))?,
        price_cents: price
            .map(|p| p.trim().parse())
            .transpose()
            .with_context(|| format!("invalid price in '{}'", raw))?,
    })
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run(cli: Cli) -> Result<Result<(), ApiError>> {
    let mut config = AppConfig::load(cli.config).context("failed to load configuration")?;
    if let Some(shop) = cli.shop {
        config.shop.id = shop;
        config.validate()?;
    }

    let state = match AppState::open(config).await {
        Ok(state) => state,
        Err(e) => return Ok(Err(e)),
    };
    info!(shop_id = %state.shop_id(), "Shopdesk back office ready");

    let outcome = match cli.command {
        Command::Report { granularity, date } => {
            analytics::sales_report(&state, granularity, date.as_deref())
                .await
                .map(|r| print_json(&r))
        }
        Command::Dashboard => dashboard::dashboard(&state).await.map(|d| print_json(&d)),
        Command::Stock {
            search,
            category,
            sort,
            direction,
        } => stock::list_stock(
            &state,
            StockQuery {
                search,
                category,
                sort,
                direction,
            },
        )
        .await
        .map(|items| print_json(&items)),
        Command::Receipts {
            id: Some(id), ..
        } => receipt::get_receipt(&state, &id).await.map(|r| print_json(&r)),
        Command::Receipts {
            search,
            date,
            sort,
            direction,
            id: None,
        } => receipt::list_receipts(
            &state,
            ReceiptQuery {
                search,
                date,
                sort,
                direction,
            },
        )
        .await
        .map(|r| print_json(&r)),
        Command::Sell {
            cashier,
            manager,
            payment,
            items,
            scans,
        } => {
            let lines = items
                .iter()
                .map(|raw| parse_sale_line(raw))
                .collect::<Result<Vec<_>>>()?;
            receipt::sell(
                &state,
                SaleRequest {
                    cashier_name: cashier,
                    manager_name: manager,
                    payment_method: payment,
                    lines,
                    scanned_skus: scans,
                },
            )
            .await
            .map(|r| print_json(&r))
        }
        Command::Attendance { date, employee } => {
            attendance::list_attendance(&state, date.as_deref(), employee.as_deref())
                .await
                .map(|a| print_json(&a))
        }
        Command::Employees => employee::list_employees(&state).await.map(|e| print_json(&e)),
        Command::Settings => settings::get_settings(&state).await.map(|s| print_json(&s)),
    };

    state.db().close().await;

    match outcome {
        Ok(printed) => printed.map(Ok),
        Err(e) => Ok(Err(e)),
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    init_tracing();
    let cli = Cli::parse();

    match run(cli).await? {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(api_error) => {
            eprintln!("{}", serde_json::to_string_pretty(&api_error)?);
            Ok(ExitCode::FAILURE)
        }
    }
}
