//! Built-in migration catalog
//!
//! Migrations live here, one module per migration, named after what they
//! change. `builtin()` assembles the full ordered set for the runner.

mod create_products;

pub use create_products::CreateProducts;

use crate::error::ShiftError;
use crate::migrate::{Migration, MigrationSet};

/// The full catalog of known migrations, ordered by version
pub fn builtin() -> Result<MigrationSet, ShiftError> {
    let migrations: Vec<Box<dyn Migration>> = vec![Box::new(CreateProducts)];
    MigrationSet::new(migrations)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_is_ordered_and_unique() {
        let set = builtin().unwrap();
        assert_eq!(set.len(), 1);

        let versions: Vec<u64> = set.iter().map(|m| m.version()).collect();
        let mut sorted = versions.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(versions, sorted);
    }

    #[test]
    fn test_builtin_contains_create_products() {
        let set = builtin().unwrap();
        let m = set.get(20170616211742).unwrap();
        assert_eq!(m.name(), "create_products");
    }

    #[test]
    fn test_catalog_roundtrip_through_runner() {
        use crate::database::DatabaseConn;
        use crate::migrate::{MigrationState, Runner};

        let db = DatabaseConn::open_in_memory().unwrap();
        let runner = Runner::new(db, builtin().unwrap()).unwrap();

        let applied = runner.apply_pending().unwrap();
        assert_eq!(applied, vec![20170616211742]);
        assert!(runner.database().table_exists("products").unwrap());

        let status = runner.status().unwrap();
        assert!(status.iter().all(|s| s.state == MigrationState::Applied));

        let reverted = runner.revert_to(0).unwrap();
        assert_eq!(reverted, vec![20170616211742]);
        assert!(!runner.database().table_exists("products").unwrap());
    }
}
