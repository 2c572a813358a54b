#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

//! sqlshift - versioned SQLite schema migrations
//!
//! sqlshift manages ordered schema changes against a SQLite database. Each
//! migration is a named, versioned unit with an explicit forward (`up`) and
//! an explicit, symmetric reverse (`down`) operation. Applied versions are
//! tracked in a bookkeeping table in the migrated database itself, and the
//! runner uses that ledger to determine pending work and enforce ordering.
//!
//! # Architecture
//!
//! - **[`database`]**: connection wrapper and the version ledger
//! - **[`migrate`]**: the `Migration` trait, ordered `MigrationSet`, and the
//!   `Runner` (apply-pending, apply-one, revert-one, revert-to, status)
//! - **[`migrations`]**: the built-in migration catalog
//! - **[`error`]**: the `ShiftError` taxonomy (schema conflict, connection,
//!   permission, ledger)
//! - **[`config`]**: configuration management
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use sqlshift::{DatabaseConn, Runner};
//!
//! let db = DatabaseConn::open_path("app.sqlite3")?;
//! let runner = Runner::new(db, sqlshift::migrations::builtin()?)?;
//!
//! // Apply everything pending, in version order
//! let applied = runner.apply_pending()?;
//!
//! // Roll the latest migration back
//! runner.revert_one()?;
//! ```
//!
//! # Failure model
//!
//! A migration either fully succeeds (and is recorded in the ledger) or
//! fails (and the ledger is untouched). On failure the runner halts and
//! reports the error; the database stays in the last successfully-applied
//! state. There is no retry and no partial application.

pub mod config;
pub mod database;
pub mod error;
pub mod migrate;
pub mod migrations;

pub use config::SqlshiftConfig;
pub use database::{DatabaseConn, LedgerEntry, SqliteLedger, LEDGER_TABLE};
pub use error::ShiftError;
pub use migrate::{Migration, MigrationSet, MigrationState, MigrationStatus, Runner};
