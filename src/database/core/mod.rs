//! Core database infrastructure
//!
//! This module provides the foundational database components used by the
//! migration runner:
//! - `DatabaseConn`: Core SQLite connection wrapper with configuration
//! - `SqliteLedger`: Bookkeeping of applied migration versions

mod connection;
mod ledger;

pub use connection::DatabaseConn;
pub use ledger::{LedgerEntry, SqliteLedger, LEDGER_TABLE};
