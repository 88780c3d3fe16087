// Bank Directory API - Web Server
// Startup is strictly sequential: schema init → seed load → listener start

use anyhow::{Context, Result};
use rusqlite::Connection;

use bank_directory::api::{build_router, AppState};
use bank_directory::{config, seed_from_csv, setup_database};

#[tokio::main]
async fn main() -> Result<()> {
    println!("🏦 Bank Directory API - Web Server");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    // Open database
    let db_path = config::database_path();
    let mut conn =
        Connection::open(&db_path).with_context(|| format!("Failed to open database {:?}", db_path))?;
    setup_database(&conn)?;
    println!("✓ Database opened: {:?}", db_path);

    // Seed once per deployment; a populated store makes this a no-op
    seed_from_csv(&mut conn, &config::csv_path())?;

    // Create shared state and routes; no writes happen past this point
    let state = AppState::new(conn);
    let app = build_router(state);

    // Start server
    let addr = config::bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    println!("\n🚀 Server running on http://{}", addr);
    println!("   Banks:    GET /api/banks");
    println!("   Branches: GET /api/branches/:ifsc");
    println!("\n   Press Ctrl+C to stop\n");

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
