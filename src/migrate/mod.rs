//! Migration contract
//!
//! A migration is a versioned, ordered unit of schema change with an
//! explicit forward and an explicit reverse operation. The reverse is
//! spelled out per migration rather than inferred from the forward
//! operation, so there is never ambiguity about what a revert does.

mod runner;

pub use runner::{MigrationState, MigrationStatus, Runner};

use rusqlite::Connection;

use crate::error::ShiftError;

/// A versioned unit of schema change
///
/// Versions order migrations: the runner applies strictly ascending and
/// reverts strictly descending. A migration takes no parameters; it operates
/// against whatever connection the runner supplies.
pub trait Migration {
    /// Version identifier, unique across the set
    fn version(&self) -> u64;

    /// Human-readable migration name
    fn name(&self) -> &'static str;

    /// Forward operation. Must fail with [`ShiftError::SchemaConflict`] if
    /// the target schema object already exists.
    fn up(&self, conn: &Connection) -> Result<(), ShiftError>;

    /// Reverse operation, symmetric to [`Migration::up`]. Must fail with
    /// [`ShiftError::SchemaConflict`] if the target is already absent.
    fn down(&self, conn: &Connection) -> Result<(), ShiftError>;
}

/// An ordered set of migrations
///
/// Owns the registered migrations sorted by ascending version. Duplicate
/// versions are rejected at construction.
pub struct MigrationSet {
    migrations: Vec<Box<dyn Migration>>,
}

impl MigrationSet {
    /// Build a set from the given migrations, sorting by version
    pub fn new(mut migrations: Vec<Box<dyn Migration>>) -> Result<Self, ShiftError> {
        migrations.sort_by_key(|m| m.version());
        for pair in migrations.windows(2) {
            if pair[0].version() == pair[1].version() {
                return Err(ShiftError::DuplicateVersion(pair[0].version()));
            }
        }
        Ok(Self { migrations })
    }

    /// Iterate migrations in ascending version order
    pub fn iter(&self) -> impl Iterator<Item = &dyn Migration> {
        self.migrations.iter().map(|m| m.as_ref())
    }

    /// Look up a migration by version
    pub fn get(&self, version: u64) -> Option<&dyn Migration> {
        self.migrations
            .iter()
            .find(|m| m.version() == version)
            .map(|m| m.as_ref())
    }

    /// Whether the set contains the given version
    pub fn contains(&self, version: u64) -> bool {
        self.get(version).is_some()
    }

    /// Number of registered migrations
    pub fn len(&self) -> usize {
        self.migrations.len()
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.migrations.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Minimal migration creating and dropping a single named table
    pub struct TableMigration {
        pub version: u64,
        pub name: &'static str,
        pub table: &'static str,
    }

    impl Migration for TableMigration {
        fn version(&self) -> u64 {
            self.version
        }

        fn name(&self) -> &'static str {
            self.name
        }

        fn up(&self, conn: &Connection) -> Result<(), ShiftError> {
            conn.execute(
                &format!("CREATE TABLE {} (id INTEGER PRIMARY KEY)", self.table),
                [],
            )?;
            Ok(())
        }

        fn down(&self, conn: &Connection) -> Result<(), ShiftError> {
            conn.execute(&format!("DROP TABLE {}", self.table), [])?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::TableMigration;
    use super::*;

    #[test]
    fn test_set_sorts_by_version() {
        let set = MigrationSet::new(vec![
            Box::new(TableMigration {
                version: 20,
                name: "second",
                table: "b",
            }),
            Box::new(TableMigration {
                version: 10,
                name: "first",
                table: "a",
            }),
        ])
        .unwrap();

        let versions: Vec<u64> = set.iter().map(|m| m.version()).collect();
        assert_eq!(versions, vec![10, 20]);
    }

    #[test]
    fn test_set_rejects_duplicate_versions() {
        let result = MigrationSet::new(vec![
            Box::new(TableMigration {
                version: 10,
                name: "first",
                table: "a",
            }),
            Box::new(TableMigration {
                version: 10,
                name: "other",
                table: "b",
            }),
        ]);

        assert!(matches!(result, Err(ShiftError::DuplicateVersion(10))));
    }

    #[test]
    fn test_set_lookup() {
        let set = MigrationSet::new(vec![Box::new(TableMigration {
            version: 10,
            name: "first",
            table: "a",
        })])
        .unwrap();

        assert!(set.contains(10));
        assert!(!set.contains(11));
        assert_eq!(set.get(10).map(|m| m.name()), Some("first"));
    }
}
