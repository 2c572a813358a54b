//! Migration runner
//!
//! The runner walks the registered migration set against the ledger:
//! pending migrations are applied in ascending version order, applied ones
//! are reverted in descending order. Each apply or revert commits the DDL
//! and the ledger update in a single transaction, so a failed migration
//! leaves the ledger untouched and halts the run.

use serde::Serialize;
use tracing::info;

use crate::database::{DatabaseConn, SqliteLedger};
use crate::error::ShiftError;
use crate::migrate::{Migration, MigrationSet};

/// Whether a migration has been applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MigrationState {
    Applied,
    Pending,
}

impl std::fmt::Display for MigrationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MigrationState::Applied => write!(f, "applied"),
            MigrationState::Pending => write!(f, "pending"),
        }
    }
}

/// Per-migration status report
#[derive(Debug, Clone, Serialize)]
pub struct MigrationStatus {
    pub version: u64,
    pub name: String,
    pub state: MigrationState,
    /// Unix timestamp of when the migration was applied
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applied_at: Option<i64>,
}

/// Migration runner over a single database connection
///
/// Execution is single and synchronous: no two migrations run concurrently,
/// and ordering is strict in both directions.
pub struct Runner {
    db: DatabaseConn,
    set: MigrationSet,
}

impl Runner {
    /// Create a runner, ensuring the ledger table exists
    pub fn new(db: DatabaseConn, set: MigrationSet) -> Result<Self, ShiftError> {
        SqliteLedger::open(&db.conn)?;
        Ok(Self { db, set })
    }

    /// Access the underlying connection wrapper
    pub fn database(&self) -> &DatabaseConn {
        &self.db
    }

    /// Apply every pending migration in ascending version order
    ///
    /// Stops at the first failure; migrations applied before the failure
    /// stay applied. Returns the versions applied by this run.
    pub fn apply_pending(&self) -> Result<Vec<u64>, ShiftError> {
        let ledger = SqliteLedger::open(&self.db.conn)?;
        let mut applied = Vec::new();
        for migration in self.set.iter() {
            if ledger.has_applied(migration.version())? {
                continue;
            }
            self.apply(&ledger, migration)?;
            applied.push(migration.version());
        }
        Ok(applied)
    }

    /// Apply exactly the next pending migration
    pub fn apply_one(&self) -> Result<u64, ShiftError> {
        let ledger = SqliteLedger::open(&self.db.conn)?;
        for migration in self.set.iter() {
            if ledger.has_applied(migration.version())? {
                continue;
            }
            self.apply(&ledger, migration)?;
            return Ok(migration.version());
        }
        Err(ShiftError::NothingToApply)
    }

    /// Revert exactly the latest applied migration
    pub fn revert_one(&self) -> Result<u64, ShiftError> {
        let ledger = SqliteLedger::open(&self.db.conn)?;
        let version = ledger
            .latest_applied()?
            .ok_or(ShiftError::NothingToRevert)?;
        let migration = self.set.get(version).ok_or_else(|| ShiftError::Ledger {
            detail: format!(
                "ledger records version {} but no such migration is registered",
                version
            ),
        })?;
        self.revert(&ledger, migration)?;
        Ok(version)
    }

    /// Revert applied migrations, descending, until the latest applied
    /// version is at or below `target`
    ///
    /// A target of 0 reverts everything. Returns the versions reverted by
    /// this run.
    pub fn revert_to(&self, target: u64) -> Result<Vec<u64>, ShiftError> {
        if target != 0 && !self.set.contains(target) {
            return Err(ShiftError::UnknownVersion(target));
        }

        let ledger = SqliteLedger::open(&self.db.conn)?;
        let mut reverted = Vec::new();
        while let Some(version) = ledger.latest_applied()? {
            if version <= target {
                break;
            }
            let migration = self.set.get(version).ok_or_else(|| ShiftError::Ledger {
                detail: format!(
                    "ledger records version {} but no such migration is registered",
                    version
                ),
            })?;
            self.revert(&ledger, migration)?;
            reverted.push(version);
        }
        Ok(reverted)
    }

    /// Report the state of every registered migration, ascending
    pub fn status(&self) -> Result<Vec<MigrationStatus>, ShiftError> {
        let ledger = SqliteLedger::open(&self.db.conn)?;
        let entries = ledger.entries()?;

        let statuses = self
            .set
            .iter()
            .map(|m| {
                let entry = entries.iter().find(|e| e.version == m.version());
                MigrationStatus {
                    version: m.version(),
                    name: m.name().to_string(),
                    state: if entry.is_some() {
                        MigrationState::Applied
                    } else {
                        MigrationState::Pending
                    },
                    applied_at: entry.map(|e| e.applied_at),
                }
            })
            .collect();
        Ok(statuses)
    }

    /// Run one migration forward and record it, atomically
    fn apply(&self, ledger: &SqliteLedger, migration: &dyn Migration) -> Result<(), ShiftError> {
        let tx = self.db.transaction()?;
        migration.up(&self.db.conn)?;
        ledger.record_applied(migration.version(), migration.name())?;
        tx.commit()?;
        info!("applied {} ({})", migration.version(), migration.name());
        Ok(())
    }

    /// Run one migration backward and unrecord it, atomically
    fn revert(&self, ledger: &SqliteLedger, migration: &dyn Migration) -> Result<(), ShiftError> {
        let tx = self.db.transaction()?;
        migration.down(&self.db.conn)?;
        ledger.record_reverted(migration.version())?;
        tx.commit()?;
        info!("reverted {} ({})", migration.version(), migration.name());
        Ok(())
    }
}
