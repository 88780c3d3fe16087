// Bank Directory API - Core Library
// Exposes the schema, loader, and query modules for the seed tool,
// the API server, and tests

pub mod config;
pub mod db;
pub mod loader;

// Only compiled for the API server binary and its tests
#[cfg(feature = "server")]
pub mod api;

// Re-export commonly used types
pub use db::{
    bank_count, branch_count, get_all_banks, get_bank, get_branch, get_branches_for_bank,
    setup_database, Bank, Branch,
};
pub use loader::{
    normalize_bank_name, read_records, seed_from_csv, BranchRecord, LoadReport, UNKNOWN_BANK,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
