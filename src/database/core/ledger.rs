//! Migration version ledger
//!
//! The ledger is the bookkeeping side of the runner: a dedicated table
//! recording which migration versions have been applied, used to determine
//! pending work and enforce ordering. The ledger table is infrastructure
//! and never appears in migration listings itself.

use rusqlite::Connection;
use tracing::debug;

use crate::error::ShiftError;

/// Name of the bookkeeping table
pub const LEDGER_TABLE: &str = "sqlshift_migrations";

/// SQL for creating the bookkeeping table
const LEDGER_TABLE_SQL: &str = r#"
    CREATE TABLE IF NOT EXISTS sqlshift_migrations (
        version INTEGER PRIMARY KEY,
        name TEXT NOT NULL,
        applied_at INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
    );
"#;

/// A row in the ledger
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    pub version: u64,
    pub name: String,
    /// Unix timestamp of when the migration was recorded as applied
    pub applied_at: i64,
}

/// Version ledger backed by a table in the migrated database
///
/// All writes go through the caller's connection so the runner can commit
/// a DDL statement and its ledger update in one transaction.
pub struct SqliteLedger<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteLedger<'a> {
    /// Create a ledger over the given connection, creating the bookkeeping
    /// table if it does not exist yet
    pub fn open(conn: &'a Connection) -> Result<Self, ShiftError> {
        conn.execute(LEDGER_TABLE_SQL, [])
            .map_err(|e| ShiftError::Ledger {
                detail: format!("failed to create ledger table: {}", e),
            })?;
        Ok(Self { conn })
    }

    /// Check whether a migration version is recorded as applied
    pub fn has_applied(&self, version: u64) -> Result<bool, ShiftError> {
        let count: i64 = self
            .conn
            .query_row(
                "SELECT COUNT(*) FROM sqlshift_migrations WHERE version = ?1",
                [version as i64],
                |row| row.get(0),
            )
            .map_err(|e| ShiftError::Ledger {
                detail: format!("failed to read ledger: {}", e),
            })?;
        Ok(count > 0)
    }

    /// Record a migration version as applied
    pub fn record_applied(&self, version: u64, name: &str) -> Result<(), ShiftError> {
        self.conn
            .execute(
                "INSERT INTO sqlshift_migrations (version, name) VALUES (?1, ?2)",
                rusqlite::params![version as i64, name],
            )
            .map_err(|e| ShiftError::Ledger {
                detail: format!("failed to record version {} as applied: {}", version, e),
            })?;
        debug!("recorded version {} ({}) as applied", version, name);
        Ok(())
    }

    /// Remove a migration version from the ledger
    pub fn record_reverted(&self, version: u64) -> Result<(), ShiftError> {
        let removed = self
            .conn
            .execute(
                "DELETE FROM sqlshift_migrations WHERE version = ?1",
                [version as i64],
            )
            .map_err(|e| ShiftError::Ledger {
                detail: format!("failed to record version {} as reverted: {}", version, e),
            })?;
        if removed == 0 {
            return Err(ShiftError::Ledger {
                detail: format!("version {} was not recorded as applied", version),
            });
        }
        debug!("recorded version {} as reverted", version);
        Ok(())
    }

    /// All applied versions, ascending
    pub fn applied_versions(&self) -> Result<Vec<u64>, ShiftError> {
        let mut stmt = self
            .conn
            .prepare("SELECT version FROM sqlshift_migrations ORDER BY version ASC")
            .map_err(|e| ShiftError::Ledger {
                detail: format!("failed to read ledger: {}", e),
            })?;
        let versions = stmt
            .query_map([], |row| row.get::<_, i64>(0))
            .and_then(|rows| rows.collect::<Result<Vec<_>, _>>())
            .map_err(|e| ShiftError::Ledger {
                detail: format!("failed to read ledger: {}", e),
            })?;
        Ok(versions.into_iter().map(|v| v as u64).collect())
    }

    /// The highest applied version, if any
    pub fn latest_applied(&self) -> Result<Option<u64>, ShiftError> {
        Ok(self.applied_versions()?.last().copied())
    }

    /// All ledger rows, ascending by version
    pub fn entries(&self) -> Result<Vec<LedgerEntry>, ShiftError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT version, name, applied_at FROM sqlshift_migrations ORDER BY version ASC",
            )
            .map_err(|e| ShiftError::Ledger {
                detail: format!("failed to read ledger: {}", e),
            })?;
        let entries = stmt
            .query_map([], |row| {
                Ok(LedgerEntry {
                    version: row.get::<_, i64>(0)? as u64,
                    name: row.get(1)?,
                    applied_at: row.get(2)?,
                })
            })
            .and_then(|rows| rows.collect::<Result<Vec<_>, _>>())
            .map_err(|e| ShiftError::Ledger {
                detail: format!("failed to read ledger: {}", e),
            })?;
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_db() -> Connection {
        Connection::open_in_memory().unwrap()
    }

    #[test]
    fn test_open_creates_ledger_table() {
        let conn = create_test_db();
        SqliteLedger::open(&conn).unwrap();

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
                [LEDGER_TABLE],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_open_is_idempotent() {
        let conn = create_test_db();
        SqliteLedger::open(&conn).unwrap();
        SqliteLedger::open(&conn).unwrap();
    }

    #[test]
    fn test_record_and_query() {
        let conn = create_test_db();
        let ledger = SqliteLedger::open(&conn).unwrap();

        assert!(!ledger.has_applied(20170616211742).unwrap());

        ledger
            .record_applied(20170616211742, "create_products")
            .unwrap();
        assert!(ledger.has_applied(20170616211742).unwrap());
        assert_eq!(ledger.latest_applied().unwrap(), Some(20170616211742));

        ledger.record_reverted(20170616211742).unwrap();
        assert!(!ledger.has_applied(20170616211742).unwrap());
        assert_eq!(ledger.latest_applied().unwrap(), None);
    }

    #[test]
    fn test_applied_versions_ascending() {
        let conn = create_test_db();
        let ledger = SqliteLedger::open(&conn).unwrap();

        ledger.record_applied(30, "third").unwrap();
        ledger.record_applied(10, "first").unwrap();
        ledger.record_applied(20, "second").unwrap();

        assert_eq!(ledger.applied_versions().unwrap(), vec![10, 20, 30]);
    }

    #[test]
    fn test_revert_unapplied_is_ledger_error() {
        let conn = create_test_db();
        let ledger = SqliteLedger::open(&conn).unwrap();

        let result = ledger.record_reverted(42);
        assert!(matches!(result, Err(ShiftError::Ledger { .. })));
    }

    #[test]
    fn test_entries_carry_name_and_timestamp() {
        let conn = create_test_db();
        let ledger = SqliteLedger::open(&conn).unwrap();

        ledger.record_applied(10, "first").unwrap();
        let entries = ledger.entries().unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].version, 10);
        assert_eq!(entries[0].name, "first");
        assert!(entries[0].applied_at > 0);
    }
}
