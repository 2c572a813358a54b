//! Database module
//!
//! Connection handling and migration bookkeeping:
//!
//! - **core::connection**: SQLite `DatabaseConn` wrapper
//! - **core::ledger**: applied-version ledger (`sqlshift_migrations` table)
//!
//! The ledger lives in the same database file the migrations operate on, so
//! a DDL statement and its bookkeeping update commit in one transaction.

pub mod core;

pub use core::{DatabaseConn, LedgerEntry, SqliteLedger, LEDGER_TABLE};

/// Ensure the data directory exists
pub fn ensure_data_dir(data_dir: &str) -> anyhow::Result<()> {
    std::fs::create_dir_all(data_dir)
        .map_err(|e| anyhow::anyhow!("Failed to create data directory '{}': {}", data_dir, e))
}
