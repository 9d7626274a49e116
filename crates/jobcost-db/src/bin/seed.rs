//! # Demo Data Loader
//!
//! Loads the demo data set into a database file for development.
//!
//! ## Usage
//! ```bash
//! # Seed ./jobcost_dev.db with jobs dated up to today
//! cargo run -p jobcost-db --bin seed
//!
//! # Specify database path and the date the demo jobs end on
//! cargo run -p jobcost-db --bin seed -- --db ./data/jobcost.db --today 2025-01-25
//! ```
//!
//! Seeding is skipped when the database is already marked as seeded.

use chrono::{Local, NaiveDate};
use jobcost_core::money::format_inr;
use jobcost_core::{JobFilter, Money};
use jobcost_db::{Database, DbConfig};
use std::env;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./jobcost_dev.db");
    let mut today: NaiveDate = Local::now().date_naive();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--today" | "-t" => {
                if i + 1 < args.len() {
                    today = args[i + 1].parse()?;
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("JobCost Pro Demo Data Loader");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>      Database file path (default: ./jobcost_dev.db)");
                println!("  -t, --today <DATE>   Last demo job date, YYYY-MM-DD (default: today)");
                println!("  -h, --help           Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("JobCost Pro Demo Data Loader");
    println!("============================");
    println!("Database: {}", db_path);
    println!("Today:    {}", today);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let start = std::time::Instant::now();
    if !db.seed_if_empty(today).await? {
        println!("⚠ Database is already seeded");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let jobs = db.jobs().list(&JobFilter::default()).await?;
    let total: i64 = jobs.iter().map(|j| j.job.total_amount_paise).sum();

    println!("✓ Seeded in {:?}", start.elapsed());
    println!("  Customers:     {}", db.customers().list().await?.len());
    println!("  Items:         {}", db.items().list().await?.len());
    println!("  Machine types: {}", db.machine_types().list().await?.len());
    println!("  Employees:     {}", db.employees().list().await?.len());
    println!("  Jobs:          {}", jobs.len());
    println!(
        "  Job value:     {}",
        format_inr(Money::from_paise(total), "Rs.")
    );

    Ok(())
}
