//! Database connection management
//!
//! Thin wrapper around SQLite connections, handling both file-based and
//! in-memory databases with consistent configuration.

use rusqlite::Connection;

use crate::error::ShiftError;

/// Core database connection wrapper
///
/// `DatabaseConn` owns the connection the migration runner operates on.
/// Open failures surface as [`ShiftError::Connection`].
pub struct DatabaseConn {
    pub conn: Connection,
}

impl DatabaseConn {
    /// Open a database at the specified path
    ///
    /// If the path is `None`, an in-memory database is created.
    pub fn open(path: Option<&str>) -> Result<Self, ShiftError> {
        let conn = match path {
            Some(p) => Connection::open(p).map_err(|e| ShiftError::Connection {
                detail: format!("failed to open database at '{}': {}", p, e),
            })?,
            None => Connection::open_in_memory().map_err(|e| ShiftError::Connection {
                detail: format!("failed to create in-memory database: {}", e),
            })?,
        };

        let db = DatabaseConn { conn };
        db.configure()?;
        Ok(db)
    }

    /// Open a database at the specified path (convenience method)
    pub fn open_path(path: &str) -> Result<Self, ShiftError> {
        Self::open(Some(path))
    }

    /// Create an in-memory database
    pub fn open_in_memory() -> Result<Self, ShiftError> {
        Self::open(None)
    }

    /// Configure the connection
    fn configure(&self) -> Result<(), ShiftError> {
        // WAL keeps readers usable while a migration holds the write lock
        let _: String = self
            .conn
            .query_row("PRAGMA journal_mode=WAL", [], |row| row.get(0))?;

        self.conn.execute("PRAGMA synchronous=NORMAL", [])?;

        self.conn.execute("PRAGMA foreign_keys=ON", [])?;

        Ok(())
    }

    /// Execute a SQL statement
    pub fn execute(&self, sql: &str) -> Result<usize, ShiftError> {
        Ok(self.conn.execute(sql, [])?)
    }

    /// Begin an unchecked transaction
    ///
    /// Used by the runner to commit a DDL statement and its ledger update
    /// atomically.
    pub fn transaction(&self) -> Result<rusqlite::Transaction<'_>, ShiftError> {
        Ok(self.conn.unchecked_transaction()?)
    }

    /// Check if a table exists in the database
    pub fn table_exists(&self, table_name: &str) -> Result<bool, ShiftError> {
        let count: i32 = self.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
            [table_name],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Get the column names of a table, in declaration order
    pub fn table_columns(&self, table_name: &str) -> Result<Vec<String>, ShiftError> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM pragma_table_info(?1) ORDER BY cid")?;
        let columns = stmt
            .query_map([table_name], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(columns)
    }

    /// Get the row count for a table
    pub fn table_count(&self, table_name: &str) -> Result<u64, ShiftError> {
        let query = format!("SELECT COUNT(*) FROM {}", table_name);
        let count: u64 = self.conn.query_row(&query, [], |row| row.get(0))?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_in_memory() {
        let db = DatabaseConn::open_in_memory();
        assert!(db.is_ok());
    }

    #[test]
    fn test_open_bad_path_is_connection_error() {
        let result = DatabaseConn::open_path("/no/such/directory/db.sqlite3");
        assert!(matches!(result, Err(ShiftError::Connection { .. })));
    }

    #[test]
    fn test_execute() {
        let db = DatabaseConn::open_in_memory().unwrap();
        let result = db.execute("CREATE TABLE test (id INTEGER PRIMARY KEY)");
        assert!(result.is_ok());
    }

    #[test]
    fn test_table_exists() {
        let db = DatabaseConn::open_in_memory().unwrap();
        db.execute("CREATE TABLE test_table (id INTEGER PRIMARY KEY)")
            .unwrap();

        assert!(db.table_exists("test_table").unwrap());
        assert!(!db.table_exists("nonexistent_table").unwrap());
    }

    #[test]
    fn test_table_columns() {
        let db = DatabaseConn::open_in_memory().unwrap();
        db.execute("CREATE TABLE test_table (id INTEGER PRIMARY KEY, label TEXT)")
            .unwrap();

        assert_eq!(
            db.table_columns("test_table").unwrap(),
            vec!["id".to_string(), "label".to_string()]
        );
    }

    #[test]
    fn test_table_count() {
        let db = DatabaseConn::open_in_memory().unwrap();
        db.execute("CREATE TABLE test_table (id INTEGER PRIMARY KEY)")
            .unwrap();
        db.execute("INSERT INTO test_table (id) VALUES (1), (2), (3)")
            .unwrap();

        assert_eq!(db.table_count("test_table").unwrap(), 3);
    }
}
