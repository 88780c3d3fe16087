use anyhow::Result;
use rusqlite::Connection;
use std::env;
use std::path::PathBuf;

// Use library instead of local modules
use bank_directory::{bank_count, branch_count, config, seed_from_csv, setup_database};

fn main() -> Result<()> {
    println!("🏦 Bank Directory - Seed Load (CSV → SQLite)");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    // CSV path from the first argument, BANK_CSV otherwise
    let csv_path: PathBuf = env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(config::csv_path);
    let db_path = config::database_path();

    println!("\n🔧 Setting up database at {:?}...", db_path);
    let mut conn = Connection::open(&db_path)?;
    setup_database(&conn)?;
    println!("✓ Schema initialized");

    println!("\n📂 Loading {:?}...", csv_path);
    seed_from_csv(&mut conn, &csv_path)?;

    println!("\n🔍 Verifying database...");
    println!(
        "✓ Database contains {} banks, {} branches",
        bank_count(&conn)?,
        branch_count(&conn)?
    );

    Ok(())
}
