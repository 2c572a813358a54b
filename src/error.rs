//! Error taxonomy for schema migrations
//!
//! DDL against SQLite either fully succeeds or fails; there is no retry and
//! no partial-success state. Every failure is classified into one of the
//! variants below and surfaced to the caller unchanged.

use rusqlite::ErrorCode;

/// Errors produced while applying or reverting migrations
#[derive(Debug, thiserror::Error)]
pub enum ShiftError {
    /// The target schema object already exists on apply, or is already
    /// absent on revert
    #[error("schema conflict: {detail}")]
    SchemaConflict { detail: String },

    /// The database file cannot be opened or is not a database
    #[error("connection error: {detail}")]
    Connection { detail: String },

    /// Insufficient privilege to alter the schema
    #[error("permission error: {detail}")]
    Permission { detail: String },

    /// The bookkeeping table could not be read or written
    #[error("ledger error: {detail}")]
    Ledger { detail: String },

    /// apply-one was requested but every migration is already applied
    #[error("nothing to apply: all migrations are applied")]
    NothingToApply,

    /// revert-one was requested but the ledger is empty
    #[error("nothing to revert: no migration is applied")]
    NothingToRevert,

    /// revert-to targeted a version that is not a known migration
    #[error("unknown migration version: {0}")]
    UnknownVersion(u64),

    /// Two registered migrations share a version
    #[error("duplicate migration version: {0}")]
    DuplicateVersion(u64),

    /// Any other database failure, surfaced unchanged
    #[error("database error: {0}")]
    Database(rusqlite::Error),
}

impl ShiftError {
    /// Classify a rusqlite error into the migration error taxonomy.
    ///
    /// SQLite reports "already exists" and "no such table/trigger" as plain
    /// SQLITE_ERROR, so those are recognized by message; open and privilege
    /// failures carry dedicated result codes. Prepare-time failures reach us
    /// as `SqlInputError` rather than `SqliteFailure` and carry the same
    /// messages.
    pub fn from_sqlite(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqlInputError { ref msg, .. } => {
                if let Some(classified) = Self::classify_message(msg) {
                    return classified;
                }
            }
            rusqlite::Error::SqliteFailure(ref ffi_err, ref msg) => {
                let detail = msg.clone().unwrap_or_else(|| ffi_err.to_string());
                match ffi_err.code {
                    ErrorCode::CannotOpen | ErrorCode::NotADatabase => {
                        return ShiftError::Connection { detail };
                    }
                    ErrorCode::PermissionDenied
                    | ErrorCode::ReadOnly
                    | ErrorCode::AuthorizationForStatementDenied => {
                        return ShiftError::Permission { detail };
                    }
                    _ => {
                        if let Some(classified) = Self::classify_message(&detail) {
                            return classified;
                        }
                    }
                }
            }
            _ => {}
        }
        ShiftError::Database(err)
    }

    /// Recognize schema conflicts by message
    fn classify_message(detail: &str) -> Option<Self> {
        let lower = detail.to_lowercase();
        if lower.contains("already exists")
            || lower.contains("no such table")
            || lower.contains("no such trigger")
            || lower.contains("no such view")
            || lower.contains("no such index")
        {
            return Some(ShiftError::SchemaConflict {
                detail: detail.to_string(),
            });
        }
        None
    }
}

impl From<rusqlite::Error> for ShiftError {
    fn from(err: rusqlite::Error) -> Self {
        ShiftError::from_sqlite(err)
    }
}
